pub mod condition;
pub mod error;
pub mod evaluator;
pub mod operator;
pub mod schema;
pub mod types;

pub use condition::{Condition, ConditionGroup, ConditionSet, DeleteOutcome};
pub use error::{ConditionError, FetchError, OperatorError};
pub use evaluator::{filter, matching_indices, FilterPlan};
pub use operator::{Operator, OperatorKind};
pub use types::*;

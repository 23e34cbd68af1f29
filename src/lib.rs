pub mod action;
pub mod config;
pub mod core;
pub mod logging;
pub mod services;

// Re-export commonly used types
pub use action::{EditAction, EditOutcome};
pub use core::{Condition, ConditionGroup, ConditionSet, FieldDescriptor, Operator, OperatorKind, Record};
pub use services::{DataView, FilterSession, HttpSource, RecordSource};

use thiserror::Error;

use crate::core::types::{ConditionId, GroupId};

/// Rejected structural edit against a condition set.
///
/// These indicate the caller addressed something that no longer exists
/// (stale positions or handles); the set is left untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConditionError {
    #[error("group index {index} out of range (set has {len} groups)")]
    GroupIndexOutOfRange { index: usize, len: usize },
    #[error("condition index {index} out of range (group has {len} conditions)")]
    ConditionIndexOutOfRange { index: usize, len: usize },
    #[error("no group with id {0}")]
    UnknownGroup(GroupId),
    #[error("no condition with id {condition} in group {group}")]
    UnknownCondition { group: GroupId, condition: ConditionId },
    #[error("condition {0} is a preview marker and cannot be edited")]
    PreviewCondition(ConditionId),
    #[error("the preview marker cannot be assigned as an operator")]
    PreviewOperator,
}

/// Failure evaluating a single operator
#[derive(Debug, Error)]
pub enum OperatorError {
    #[error("invalid regex pattern '{pattern}': {source}")]
    RegexCompile {
        pattern: String,
        #[source]
        source: fancy_regex::Error,
    },
}

/// Failure fetching the remote record source
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("response body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

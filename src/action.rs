use serde::{Deserialize, Serialize};
use strum::Display;

use crate::core::operator::Operator;
use crate::core::types::{ConditionId, GroupId};

/// Edits the condition editing surface can issue against a `ConditionSet`.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum EditAction {
    /// Change the field a condition tests
    SetField { group: GroupId, condition: ConditionId, field: String },
    /// Change the operator of a condition
    SetOperator { group: GroupId, condition: ConditionId, operator: Operator },
    /// Change the literal a condition compares against
    SetValue { group: GroupId, condition: ConditionId, value: String },
    /// Append a blank OR condition to a group
    AddCondition { group: GroupId },
    /// Remove a condition (and its group, if that empties it)
    DeleteCondition { group: GroupId, condition: ConditionId },
    /// Append an AND group holding one blank condition
    AddGroup,
    /// Pointer entered a group's add affordance
    BeginPreview { group: GroupId },
    /// Pointer left a group's add affordance
    EndPreview { group: GroupId },
    /// Discard everything and start from one blank condition
    Reset,
}

/// What an applied `EditAction` changed
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum EditOutcome {
    Updated,
    ConditionAdded(ConditionId),
    ConditionRemoved,
    GroupRemoved(GroupId),
    GroupAdded(GroupId),
    /// Whether a new preview marker was appended
    PreviewShown(bool),
    /// Number of preview markers removed
    PreviewCleared(usize),
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_display() {
        let a1 = EditAction::AddGroup;
        let a2 = EditAction::AddCondition { group: GroupId::new() };
        assert_eq!(a1.to_string(), "AddGroup");
        assert_eq!(a2.to_string(), "AddCondition");
    }

    #[test]
    fn test_action_serialization() {
        let group = GroupId::new();
        let action = EditAction::SetOperator {
            group,
            condition: ConditionId::new(),
            operator: "lessThan".into(),
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["SetOperator"]["operator"], "lessThan");
        let restored: EditAction = serde_json::from_value(json).unwrap();
        assert_eq!(restored, action);
    }
}

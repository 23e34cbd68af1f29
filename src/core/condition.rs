//! Condition model: an AND of OR-groups, edited through stable handles.
//!
//! Groups and conditions keep the order the user created them in. Every
//! structural edit addresses its target by `GroupId`/`ConditionId`; callers
//! that only know positions resolve them first with [`ConditionSet::locate`].
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::action::{EditAction, EditOutcome};
use crate::core::error::ConditionError;
use crate::core::operator::Operator;
use crate::core::types::{ConditionId, GroupId};

/// A single `field / operator / literal` predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(skip)]
    pub id: ConditionId,
    #[serde(default)]
    pub left: String,
    #[serde(default)]
    pub operator: Operator,
    #[serde(default)]
    pub value: String,
}

impl Condition {
    pub fn new(left: impl Into<String>, operator: impl Into<Operator>, value: impl Into<String>) -> Self {
        Self {
            id: ConditionId::new(),
            left: left.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// Unset field, `equals`, empty literal
    pub fn blank() -> Self {
        Self::new("", Operator::default(), "")
    }

    /// Ghost row shown while hovering the add affordance
    pub fn preview() -> Self {
        Self::new("", Operator::Preview, "")
    }

    pub fn is_preview(&self) -> bool {
        self.operator.is_preview()
    }

    /// Field, operator and literal are all set and the operator is not the
    /// preview marker.
    pub fn is_complete(&self) -> bool {
        !self.left.is_empty() && !self.value.is_empty() && !self.operator.is_unset() && !self.is_preview()
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::blank()
    }
}

/// Conditions combined with OR
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Condition>", into = "Vec<Condition>")]
pub struct ConditionGroup {
    id: GroupId,
    conditions: Vec<Condition>,
}

impl ConditionGroup {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self {
            id: GroupId::new(),
            conditions,
        }
    }

    /// A group holding one blank condition
    pub fn with_blank() -> Self {
        Self::new(vec![Condition::blank()])
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn has_preview(&self) -> bool {
        self.conditions.iter().any(Condition::is_preview)
    }

    /// True when at least one condition can actually filter
    pub fn is_actionable(&self) -> bool {
        self.conditions.iter().any(Condition::is_complete)
    }

    fn has_real_conditions(&self) -> bool {
        self.conditions.iter().any(|c| !c.is_preview())
    }

    fn position(&self, condition: ConditionId) -> Option<usize> {
        self.conditions.iter().position(|c| c.id == condition)
    }
}

impl From<Vec<Condition>> for ConditionGroup {
    fn from(conditions: Vec<Condition>) -> Self {
        Self::new(conditions)
    }
}

impl From<ConditionGroup> for Vec<Condition> {
    fn from(group: ConditionGroup) -> Self {
        group.conditions
    }
}

/// Removal performed by [`ConditionSet::delete_condition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    ConditionRemoved,
    /// The group had no other conditions and was removed with it
    GroupRemoved,
}

/// Groups combined with AND
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ConditionGroup>", into = "Vec<ConditionGroup>")]
pub struct ConditionSet {
    groups: Vec<ConditionGroup>,
}

impl From<Vec<ConditionGroup>> for ConditionSet {
    fn from(groups: Vec<ConditionGroup>) -> Self {
        Self::from_groups(groups)
    }
}

impl From<ConditionSet> for Vec<ConditionGroup> {
    fn from(set: ConditionSet) -> Self {
        set.groups
    }
}

impl Default for ConditionSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionSet {
    /// Initial state for a newly adopted source: one group, one blank condition
    pub fn new() -> Self {
        Self {
            groups: vec![ConditionGroup::with_blank()],
        }
    }

    /// A set with no groups (no filtering)
    pub fn empty() -> Self {
        Self { groups: Vec::new() }
    }

    /// Build a set from groups, dropping any group without a real condition
    pub fn from_groups(groups: Vec<ConditionGroup>) -> Self {
        let mut set = Self { groups };
        set.groups.retain(ConditionGroup::has_real_conditions);
        set
    }

    pub fn groups(&self) -> &[ConditionGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, group: GroupId) -> Option<&ConditionGroup> {
        self.groups.iter().find(|g| g.id == group)
    }

    /// Handle of the group at a display position
    pub fn group_id_at(&self, index: usize) -> Result<GroupId, ConditionError> {
        self.groups
            .get(index)
            .map(ConditionGroup::id)
            .ok_or(ConditionError::GroupIndexOutOfRange {
                index,
                len: self.groups.len(),
            })
    }

    /// Resolve a (group, condition) display position into handles
    pub fn locate(&self, group_index: usize, condition_index: usize) -> Result<(GroupId, ConditionId), ConditionError> {
        let group = self.groups.get(group_index).ok_or(ConditionError::GroupIndexOutOfRange {
            index: group_index,
            len: self.groups.len(),
        })?;
        let condition = group
            .conditions
            .get(condition_index)
            .ok_or(ConditionError::ConditionIndexOutOfRange {
                index: condition_index,
                len: group.conditions.len(),
            })?;
        Ok((group.id, condition.id))
    }

    pub fn condition(&self, group: GroupId, condition: ConditionId) -> Result<&Condition, ConditionError> {
        let g = self.group(group).ok_or(ConditionError::UnknownGroup(group))?;
        g.conditions
            .iter()
            .find(|c| c.id == condition)
            .ok_or(ConditionError::UnknownCondition { group, condition })
    }

    fn group_index(&self, group: GroupId) -> Result<usize, ConditionError> {
        self.groups
            .iter()
            .position(|g| g.id == group)
            .ok_or(ConditionError::UnknownGroup(group))
    }

    fn group_mut(&mut self, group: GroupId) -> Result<&mut ConditionGroup, ConditionError> {
        self.groups
            .iter_mut()
            .find(|g| g.id == group)
            .ok_or(ConditionError::UnknownGroup(group))
    }

    /// Editable (non-preview) condition
    fn condition_mut(&mut self, group: GroupId, condition: ConditionId) -> Result<&mut Condition, ConditionError> {
        let g = self.group_mut(group)?;
        match g.conditions.iter_mut().find(|c| c.id == condition) {
            Some(c) if c.is_preview() => Err(ConditionError::PreviewCondition(condition)),
            Some(c) => Ok(c),
            None => Err(ConditionError::UnknownCondition { group, condition }),
        }
    }

    pub fn set_field(&mut self, group: GroupId, condition: ConditionId, field: impl Into<String>) -> Result<(), ConditionError> {
        let c = self.condition_mut(group, condition)?;
        c.left = field.into();
        debug!("condition {} field set to '{}'", condition, c.left);
        Ok(())
    }

    pub fn set_operator(&mut self, group: GroupId, condition: ConditionId, operator: impl Into<Operator>) -> Result<(), ConditionError> {
        let operator = operator.into();
        if operator.is_preview() {
            return Err(ConditionError::PreviewOperator);
        }
        let c = self.condition_mut(group, condition)?;
        c.operator = operator;
        debug!("condition {} operator set to '{}'", condition, c.operator);
        Ok(())
    }

    pub fn set_value(&mut self, group: GroupId, condition: ConditionId, value: impl Into<String>) -> Result<(), ConditionError> {
        let c = self.condition_mut(group, condition)?;
        c.value = value.into();
        debug!("condition {} value set to '{}'", condition, c.value);
        Ok(())
    }

    /// Add a blank condition to a group.
    ///
    /// The new condition lands after every real condition but before a
    /// preview marker, which always stays last.
    pub fn add_condition(&mut self, group: GroupId) -> Result<ConditionId, ConditionError> {
        let g = self.group_mut(group)?;
        let condition = Condition::blank();
        let id = condition.id;
        let at = g.conditions.iter().position(Condition::is_preview).unwrap_or(g.conditions.len());
        g.conditions.insert(at, condition);
        debug!("added condition {} to group {}", id, group);
        Ok(id)
    }

    /// Remove a condition; a group left without real conditions is removed too.
    pub fn delete_condition(&mut self, group: GroupId, condition: ConditionId) -> Result<DeleteOutcome, ConditionError> {
        let gi = self.group_index(group)?;
        let g = &mut self.groups[gi];
        let ci = g.position(condition).ok_or(ConditionError::UnknownCondition { group, condition })?;
        g.conditions.remove(ci);
        if g.has_real_conditions() {
            debug!("removed condition {} from group {}", condition, group);
            Ok(DeleteOutcome::ConditionRemoved)
        } else {
            self.groups.remove(gi);
            debug!("removed condition {} and its now empty group {}", condition, group);
            Ok(DeleteOutcome::GroupRemoved)
        }
    }

    /// Append a group with one blank condition
    pub fn add_group(&mut self) -> GroupId {
        let group = ConditionGroup::with_blank();
        let id = group.id;
        self.groups.push(group);
        debug!("added group {}", id);
        id
    }

    /// Append a preview marker to a group unless it already has one.
    ///
    /// Returns whether a marker was added.
    pub fn begin_preview(&mut self, group: GroupId) -> Result<bool, ConditionError> {
        let g = self.group_mut(group)?;
        if g.has_preview() {
            return Ok(false);
        }
        g.conditions.push(Condition::preview());
        Ok(true)
    }

    /// Drop every preview marker from a group, returning how many were removed
    pub fn end_preview(&mut self, group: GroupId) -> Result<usize, ConditionError> {
        let gi = self.group_index(group)?;
        let g = &mut self.groups[gi];
        let before = g.conditions.len();
        g.conditions.retain(|c| !c.is_preview());
        let removed = before - g.conditions.len();
        if g.conditions.is_empty() {
            self.groups.remove(gi);
        }
        Ok(removed)
    }

    /// Back to the initial state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Apply an edit issued by the editing surface
    pub fn apply(&mut self, action: EditAction) -> Result<EditOutcome, ConditionError> {
        match action {
            EditAction::SetField { group, condition, field } => {
                self.set_field(group, condition, field)?;
                Ok(EditOutcome::Updated)
            }
            EditAction::SetOperator { group, condition, operator } => {
                self.set_operator(group, condition, operator)?;
                Ok(EditOutcome::Updated)
            }
            EditAction::SetValue { group, condition, value } => {
                self.set_value(group, condition, value)?;
                Ok(EditOutcome::Updated)
            }
            EditAction::AddCondition { group } => Ok(EditOutcome::ConditionAdded(self.add_condition(group)?)),
            EditAction::DeleteCondition { group, condition } => match self.delete_condition(group, condition)? {
                DeleteOutcome::ConditionRemoved => Ok(EditOutcome::ConditionRemoved),
                DeleteOutcome::GroupRemoved => Ok(EditOutcome::GroupRemoved(group)),
            },
            EditAction::AddGroup => Ok(EditOutcome::GroupAdded(self.add_group())),
            EditAction::BeginPreview { group } => Ok(EditOutcome::PreviewShown(self.begin_preview(group)?)),
            EditAction::EndPreview { group } => Ok(EditOutcome::PreviewCleared(self.end_preview(group)?)),
            EditAction::Reset => {
                self.reset();
                Ok(EditOutcome::Reset)
            }
        }
    }
}

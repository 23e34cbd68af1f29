use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A single fetched row: field name to scalar (or array-of-scalars) value.
///
/// Rows are homogeneous in practice but nothing enforces it; a missing key is
/// simply an absent value at evaluation time.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Stable handle for a condition group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(Uuid);

impl GroupId {
    /// Create a new unique group handle
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GroupId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s).map_err(|e| e.to_string())?))
    }
}

/// Stable handle for a single condition inside a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConditionId(Uuid);

impl ConditionId {
    /// Create a new unique condition handle
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConditionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConditionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s).map_err(|e| e.to_string())?))
    }
}

/// Column metadata inferred from a sample record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub field: String,
    pub label: String,
    pub sortable: bool,
}

impl FieldDescriptor {
    /// Descriptor whose label mirrors the field name
    pub fn new(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            label: field.clone(),
            field,
            sortable: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_creation() {
        let g1 = GroupId::new();
        let g2 = GroupId::new();
        assert_ne!(g1, g2, "handles should be unique");

        let c1 = ConditionId::new();
        let c2 = ConditionId::default();
        assert_ne!(c1, c2);
    }

    #[test]
    fn test_handle_round_trip_through_string() {
        let id = GroupId::from_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
        assert!(ConditionId::from_str("not-a-uuid").is_err());
    }

    #[test]
    fn test_field_descriptor_label_mirrors_field() {
        let fd = FieldDescriptor::new("name");
        assert_eq!(fd.field, "name");
        assert_eq!(fd.label, "name");
        assert!(fd.sortable);
    }
}

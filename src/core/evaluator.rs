//! Filter evaluator: keeps the rows that satisfy every actionable group.
use fancy_regex::Regex;
use tracing::{trace, warn};

use crate::core::condition::{Condition, ConditionSet};
use crate::core::operator::{self, OperatorKind, Operator};
use crate::core::types::Record;

/// How a single condition takes part in evaluation
#[derive(Debug)]
enum Check<'a> {
    /// Not fully entered yet; never excludes a row
    Incomplete,
    /// Operator outside the known set; passes every row
    PassThrough,
    /// `regex` literal that failed to compile; matches nothing
    InvalidPattern,
    Compare {
        field: &'a str,
        kind: OperatorKind,
        literal: &'a str,
    },
    Pattern {
        field: &'a str,
        regex: Regex,
    },
}

impl<'a> Check<'a> {
    fn from_condition(condition: &'a Condition) -> Self {
        if !condition.is_complete() {
            return Check::Incomplete;
        }
        match &condition.operator {
            Operator::Kind(OperatorKind::Regex) => match operator::compile_pattern(&condition.value) {
                Ok(regex) => Check::Pattern {
                    field: &condition.left,
                    regex,
                },
                Err(e) => {
                    warn!("regex condition on '{}' never matches: {}", condition.left, e);
                    Check::InvalidPattern
                }
            },
            Operator::Kind(kind) => Check::Compare {
                field: &condition.left,
                kind: *kind,
                literal: &condition.value,
            },
            Operator::Unknown(raw) => {
                trace!("unknown operator '{}' passes every row", raw);
                Check::PassThrough
            }
            // Complete conditions never carry the marker
            Operator::Preview => Check::Incomplete,
        }
    }

    fn passes(&self, row: &Record) -> bool {
        match self {
            Check::Incomplete | Check::PassThrough => true,
            Check::InvalidPattern => false,
            Check::Compare { field, kind, literal } => operator::compare(*kind, row.get(*field), literal),
            Check::Pattern { field, regex } => operator::pattern_matches(regex, &operator::coerce_string(row.get(*field))),
        }
    }
}

/// A condition set prepared for evaluation.
///
/// Groups without a complete condition are dropped, preview markers are
/// left out entirely, and regex literals are compiled once per plan.
#[derive(Debug)]
pub struct FilterPlan<'a> {
    groups: Vec<Vec<Check<'a>>>,
}

impl<'a> FilterPlan<'a> {
    pub fn compile(set: &'a ConditionSet) -> Self {
        let groups = set
            .groups()
            .iter()
            .filter(|group| group.is_actionable())
            .map(|group| {
                group
                    .conditions()
                    .iter()
                    .filter(|c| !c.is_preview())
                    .map(Check::from_condition)
                    .collect()
            })
            .collect();
        Self { groups }
    }

    /// True when no group can exclude anything
    pub fn is_noop(&self) -> bool {
        self.groups.is_empty()
    }

    /// Every group must have at least one passing condition
    pub fn matches(&self, row: &Record) -> bool {
        self.groups
            .iter()
            .all(|group| group.iter().any(|check| check.passes(row)))
    }

    /// Kept rows, in input order
    pub fn select<'r>(&'r self, rows: &'r [Record]) -> impl Iterator<Item = &'r Record> + 'r {
        rows.iter().filter(move |row| self.matches(row))
    }
}

/// Rows satisfying the condition set, in input order.
///
/// An empty set, or one with no complete condition, returns every row.
pub fn filter(rows: &[Record], set: &ConditionSet) -> Vec<Record> {
    let plan = FilterPlan::compile(set);
    if plan.is_noop() {
        return rows.to_vec();
    }
    plan.select(rows).cloned().collect()
}

/// Positions of the rows satisfying the condition set
pub fn matching_indices(rows: &[Record], set: &ConditionSet) -> Vec<usize> {
    let plan = FilterPlan::compile(set);
    rows.iter()
        .enumerate()
        .filter(|(_, row)| plan.matches(row))
        .map(|(i, _)| i)
        .collect()
}

//! Join planning over the triple table.
//!
//! Every where-clause `i` reads from its own alias `t{i}` of the triple table.
//! A variable occurring in several slots is resolved to its first occurrence
//! (the anchor), and every other occurrence is equated with the anchor. The
//! resulting conditions form a star per variable, which also covers chains
//! and cycles between clauses.

use std::fmt;

use super::types::{Pattern, Variable};
use crate::types::Position;

/// A column of the triple table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Subject,
    Predicate,
    Object,
    Context,
}

impl Column {
    /// The column name in the triple table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Subject => "s",
            Self::Predicate => "p",
            Self::Object => "o",
            Self::Context => "c",
        }
    }
}

impl From<Position> for Column {
    fn from(position: Position) -> Self {
        match position {
            Position::Subject => Self::Subject,
            Position::Predicate => Self::Predicate,
            Position::Object => Self::Object,
            Position::Context => Self::Context,
        }
    }
}

/// A column of one clause's alias, e.g. `t1.o`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRef {
    pub clause: usize,
    pub column: Column,
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}.{}", self.clause, self.column.as_str())
    }
}

/// `anchor = other`, where `other` never precedes `anchor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinCondition {
    pub anchor: SlotRef,
    pub other: SlotRef,
}

impl fmt::Display for JoinCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.anchor, self.other)
    }
}

/// Variable occurrences and the join conditions they imply.
///
/// Built fresh for every translation.
#[derive(Debug)]
pub struct JoinPlan {
    /// Variables in order of first occurrence, with every slot they occupy.
    occurrences: Vec<(String, Vec<SlotRef>)>,
    conditions: Vec<JoinCondition>,
    clauses: usize,
}

impl JoinPlan {
    #[must_use]
    pub fn new(patterns: &[Pattern]) -> Self {
        let mut occurrences: Vec<(String, Vec<SlotRef>)> = Vec::new();
        for (clause, pattern) in patterns.iter().enumerate() {
            for (position, slot) in pattern.slots() {
                let Some(var) = slot.as_variable() else {
                    continue;
                };
                let slot_ref = SlotRef {
                    clause,
                    column: position.into(),
                };
                match occurrences.iter_mut().find(|(name, _)| *name == var.name) {
                    Some((_, refs)) => refs.push(slot_ref),
                    None => occurrences.push((var.name.as_str().to_owned(), vec![slot_ref])),
                }
            }
        }

        let mut conditions = Vec::new();
        for (_, refs) in &occurrences {
            if let Some((anchor, rest)) = refs.split_first() {
                conditions.extend(rest.iter().map(|other| JoinCondition {
                    anchor: *anchor,
                    other: *other,
                }));
            }
        }

        Self {
            occurrences,
            conditions,
            clauses: patterns.len(),
        }
    }

    /// The anchor slot of `var`, or `None` if no clause binds it.
    #[must_use]
    pub fn resolve(&self, var: &Variable) -> Option<SlotRef> {
        self.occurrences
            .iter()
            .find(|(name, _)| *name == var.name)
            .and_then(|(_, refs)| refs.first().copied())
    }

    /// Every slot `var` occupies.
    #[must_use]
    pub fn occurrences(&self, var: &Variable) -> &[SlotRef] {
        self.occurrences
            .iter()
            .find(|(name, _)| *name == var.name)
            .map(|(_, refs)| refs.as_slice())
            .unwrap_or_default()
    }

    /// All join conditions.
    #[must_use]
    pub fn conditions(&self) -> &[JoinCondition] {
        &self.conditions
    }

    /// Conditions that become checkable once `clause` is joined, i.e. whose
    /// later side lies in `clause`.
    pub fn conditions_for(&self, clause: usize) -> impl Iterator<Item = &JoinCondition> {
        self.conditions
            .iter()
            .filter(move |c| c.other.clause == clause)
    }

    /// Number of clauses (and aliases) in the plan.
    #[must_use]
    pub const fn clauses(&self) -> usize {
        self.clauses
    }
}

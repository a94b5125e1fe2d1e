//! Reference model of the triple store.
//!
//! Holds statements as lexical quads in a plain vector and answers queries
//! with a nested-loop matcher. Slow, but obviously correct, which makes it a
//! yardstick for the SQL translation.

use super::bindings::Bindings;
use crate::query::{Pattern, Query, Slot};
use crate::storage::DEFAULT_CONTEXT;
use crate::types::Position;

/// A statement in lexical form. `c` is empty for the default graph.
#[derive(Debug, PartialEq, Eq)]
pub struct Quad {
    pub s: String,
    pub p: String,
    pub o: String,
    pub c: String,
}

impl Quad {
    fn column(&self, position: Position) -> &str {
        match position {
            Position::Subject => &self.s,
            Position::Predicate => &self.p,
            Position::Object => &self.o,
            Position::Context => &self.c,
        }
    }
}

#[derive(Debug, Default)]
pub struct Oracle {
    quads: Vec<Quad>,
}

impl Oracle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    /// Returns `false` if the quad was already present.
    pub fn add(&mut self, quad: Quad) -> bool {
        if self.quads.contains(&quad) {
            return false;
        }
        self.quads.push(quad);
        true
    }

    /// Remove every quad matching the given columns. `None` matches anything.
    pub fn delete(&mut self, filter: [Option<&str>; 4]) -> usize {
        let before = self.quads.len();
        self.quads.retain(|quad| {
            let columns = [&quad.s, &quad.p, &quad.o, &quad.c];
            !columns
                .iter()
                .zip(filter)
                .all(|(column, wanted)| wanted.is_none_or(|w| w == column.as_str()))
        });
        before - self.quads.len()
    }

    /// Projected rows of `query`, in no particular order.
    ///
    /// Distinct queries are deduplicated; limit and offset are ignored.
    #[must_use]
    pub fn rows(&self, query: &Query) -> Vec<Vec<String>> {
        let mut solutions = vec![Bindings::new()];
        for pattern in query.patterns() {
            solutions = solutions
                .iter()
                .flat_map(|bindings| {
                    self.quads
                        .iter()
                        .filter_map(move |quad| match_quad(pattern, quad, bindings))
                })
                .collect();
        }

        let mut rows: Vec<Vec<String>> = solutions
            .iter()
            .map(|bindings| {
                query
                    .select_variables()
                    .iter()
                    .map(|var| bindings.get(var).unwrap_or_default().to_owned())
                    .collect()
            })
            .collect();
        if query.is_distinct() {
            rows.sort();
            rows.dedup();
        }
        rows
    }
}

/// Extend `bindings` with the match of `pattern` against `quad`, if any.
fn match_quad(pattern: &Pattern, quad: &Quad, bindings: &Bindings) -> Option<Bindings> {
    let mut extended = bindings.clone_value();
    for (position, slot) in pattern.slots() {
        let value = quad.column(position);
        let matched = match slot {
            Slot::Variable(_) if position == Position::Context && value == DEFAULT_CONTEXT => {
                false
            }
            Slot::Variable(var) => extended.bind(var, value),
            Slot::Any => true,
            Slot::Resource(_) | Slot::Literal(_) => slot.to_lexical().as_deref() == Some(value),
        };
        if !matched {
            return None;
        }
    }
    Some(extended)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Literal, Resource};

    fn quad(s: &str, p: &str, o: &str) -> Quad {
        Quad {
            s: format!("<{s}>"),
            p: format!("<{p}>"),
            o: o.to_owned(),
            c: String::new(),
        }
    }

    #[test]
    fn test_join_on_shared_variable() {
        let mut oracle = Oracle::new();
        oracle.add(quad("a", "age", "\"27\""));
        oracle.add(quad("a", "name", "\"eyal\""));
        oracle.add(quad("b", "age", "\"28\""));

        let query = Query::new()
            .select(["s", "n"])
            .where_clause(Slot::var("s"), Resource::new("age"), Slot::var("a"))
            .unwrap()
            .where_clause(Slot::var("s"), Resource::new("name"), Slot::var("n"))
            .unwrap();
        assert_eq!(
            oracle.rows(&query),
            vec![vec!["<a>".to_owned(), "\"eyal\"".to_owned()]]
        );

        let query = Query::new()
            .select(["s"])
            .where_clause(Slot::var("s"), Slot::Any, Literal::string("28"))
            .unwrap();
        assert_eq!(oracle.rows(&query), vec![vec!["<b>".to_owned()]]);
    }

    #[test]
    fn test_add_and_delete() {
        let mut oracle = Oracle::new();
        assert!(oracle.add(quad("a", "p", "<x>")));
        assert!(!oracle.add(quad("a", "p", "<x>")));
        oracle.add(quad("a", "q", "<x>"));
        oracle.add(quad("b", "q", "<x>"));
        assert_eq!(oracle.delete([Some("<a>"), None, None, None]), 2);
        assert_eq!(oracle.len(), 1);
    }
}

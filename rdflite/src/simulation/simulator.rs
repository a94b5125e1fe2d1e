//! Main simulator harness for deterministic simulation testing.
//!
//! Applies a random sequence of adds, deletes and queries to a real store and
//! to the reference [`Oracle`], and records every disagreement.

use std::fmt;

use super::generator::DataGenerator;
use super::oracle::{Oracle, Quad};
use crate::query::{ExecuteOptions, Query, QueryExecutor, QueryOutput};
use crate::storage::{DEFAULT_CONTEXT, TripleStore};
use crate::types::{Resource, Term};

/// Configuration for the simulator.
#[derive(Debug)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility.
    pub seed: u64,
    /// Probability that an operation is a query.
    pub query_rate: f64,
    /// Probability that a mutation is a delete rather than an add.
    pub delete_rate: f64,
}

impl SimulatorConfig {
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            query_rate: 0.3,
            delete_rate: 0.1,
        }
    }

    #[must_use]
    pub const fn with_query_rate(mut self, rate: f64) -> Self {
        self.query_rate = rate;
        self
    }

    #[must_use]
    pub const fn with_delete_rate(mut self, rate: f64) -> Self {
        self.delete_rate = rate;
        self
    }
}

/// A disagreement between the store and the oracle.
#[derive(Debug)]
pub struct InvariantViolation {
    pub description: String,
    pub operation_index: usize,
    pub context: String,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "operation {}: {} ({})",
            self.operation_index, self.description, self.context
        )
    }
}

/// Results from a simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    pub seed: u64,
    pub operations: usize,
    pub queries_checked: usize,
    /// Number of statements stored at the end of the run.
    pub final_size: u64,
    pub invariant_violations: Vec<InvariantViolation>,
    /// Set when the store itself could not be opened.
    pub error: Option<String>,
}

impl SimulationResult {
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.error.is_none() && self.invariant_violations.is_empty()
    }
}

pub struct Simulator {
    config: SimulatorConfig,
    generator: DataGenerator,
    oracle: Oracle,
    violations: Vec<InvariantViolation>,
    queries_checked: usize,
}

impl Simulator {
    #[must_use]
    pub fn new(config: SimulatorConfig) -> Self {
        let generator = DataGenerator::new(config.seed);
        Self {
            config,
            generator,
            oracle: Oracle::new(),
            violations: Vec::new(),
            queries_checked: 0,
        }
    }

    /// Run `operations` random operations against a fresh in-memory store.
    pub fn run(&mut self, operations: usize) -> SimulationResult {
        let mut store = match TripleStore::in_memory() {
            Ok(store) => store,
            Err(e) => {
                return SimulationResult {
                    seed: self.config.seed,
                    operations: 0,
                    queries_checked: 0,
                    final_size: 0,
                    invariant_violations: Vec::new(),
                    error: Some(format!("Failed to open store: {e}")),
                };
            }
        };

        for index in 0..operations {
            if self.generator.chance(self.config.query_rate) {
                let query = self.generator.next_query();
                self.check_query(&store, &query, index);
            } else if self.generator.chance(self.config.delete_rate) {
                self.delete(&mut store, index);
            } else {
                self.add(&mut store, index);
            }
        }

        SimulationResult {
            seed: self.config.seed,
            operations,
            queries_checked: self.queries_checked,
            final_size: store.size().unwrap_or_default(),
            invariant_violations: std::mem::take(&mut self.violations),
            error: None,
        }
    }

    fn violation(&mut self, operation_index: usize, description: &str, context: String) {
        self.violations.push(InvariantViolation {
            description: description.to_owned(),
            operation_index,
            context,
        });
    }

    fn add(&mut self, store: &mut TripleStore, index: usize) {
        let statement = self.generator.next_statement();
        let quad = Quad {
            s: statement.subject.to_lexical(),
            p: statement.predicate.to_lexical(),
            o: statement.object.to_lexical(),
            c: context_lexical(statement.context.as_ref()),
        };
        let context = format!("{} {} {} {}", quad.s, quad.p, quad.o, quad.c);
        let expected = self.oracle.add(quad);
        match store.add(
            statement.subject,
            statement.predicate,
            statement.object,
            statement.context.as_ref(),
        ) {
            Ok(inserted) if inserted == expected => {}
            Ok(inserted) => self.violation(
                index,
                "add reported the wrong insertion flag",
                format!("{context}: store {inserted}, oracle {expected}"),
            ),
            Err(e) => self.violation(index, "add failed", format!("{context}: {e}")),
        }
        self.check_size(store, index);
    }

    fn delete(&mut self, store: &mut TripleStore, index: usize) {
        let (subject, predicate, object, context) = self.generator.next_delete();
        let lexical = [
            subject.as_ref().map(Term::to_lexical),
            predicate.as_ref().map(Term::to_lexical),
            object.as_ref().map(Term::to_lexical),
            context.as_ref().map(Resource::to_lexical),
        ];
        let expected = self.oracle.delete([
            lexical[0].as_deref(),
            lexical[1].as_deref(),
            lexical[2].as_deref(),
            lexical[3].as_deref(),
        ]);
        match store.delete(
            subject.as_ref(),
            predicate.as_ref(),
            object.as_ref(),
            context.as_ref(),
        ) {
            Ok(removed) if removed == expected => {}
            Ok(removed) => self.violation(
                index,
                "delete removed the wrong number of statements",
                format!("{lexical:?}: store {removed}, oracle {expected}"),
            ),
            Err(e) => self.violation(index, "delete failed", format!("{lexical:?}: {e}")),
        }
        self.check_size(store, index);
    }

    fn check_size(&mut self, store: &TripleStore, index: usize) {
        let expected = self.oracle.len();
        match store.size() {
            Ok(size) if usize::try_from(size).is_ok_and(|size| size == expected) => {}
            Ok(size) => self.violation(
                index,
                "store size differs from oracle",
                format!("store {size}, oracle {expected}"),
            ),
            Err(e) => self.violation(index, "size failed", e.to_string()),
        }
    }

    fn check_query(&mut self, store: &TripleStore, query: &Query, index: usize) {
        self.queries_checked += 1;
        let expected = self.oracle.rows(query);
        let output = match QueryExecutor::new(store).execute(query, ExecuteOptions::default()) {
            Ok(output) => output,
            Err(e) => {
                self.violation(index, "query failed", format!("{query}: {e}"));
                return;
            }
        };

        match output {
            QueryOutput::Rows(rows) => {
                let mut actual: Vec<Vec<String>> = rows
                    .iter()
                    .map(|row| row.iter().map(Term::to_lexical).collect())
                    .collect();
                if !query.sort_clauses().is_empty()
                    && actual.windows(2).any(|pair| pair[0][0] > pair[1][0])
                {
                    self.violation(index, "rows are not sorted", query.to_string());
                }
                actual.sort();
                let mut expected = expected;
                expected.sort();
                if actual != expected {
                    self.violation(
                        index,
                        "rows differ from oracle",
                        format!("{query}: store {actual:?}, oracle {expected:?}"),
                    );
                }
            }
            QueryOutput::Count(count) => {
                if usize::try_from(count).ok() != Some(expected.len()) {
                    self.violation(
                        index,
                        "count differs from oracle row count",
                        format!("{query}: store {count}, oracle {}", expected.len()),
                    );
                }
            }
            QueryOutput::Ask(found) => {
                if found == expected.is_empty() {
                    self.violation(
                        index,
                        "ask disagrees with oracle",
                        format!("{query}: store {found}, oracle rows {}", expected.len()),
                    );
                }
            }
            QueryOutput::Values(_) => {
                self.violation(index, "unexpected flattened output", query.to_string());
            }
        }
    }
}

fn context_lexical(context: Option<&Resource>) -> String {
    context.map_or_else(|| DEFAULT_CONTEXT.to_owned(), Resource::to_lexical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulator_basic() {
        let mut simulator = Simulator::new(SimulatorConfig::new(12345));
        let result = simulator.run(200);
        assert!(result.passed(), "violations: {:?}", result.invariant_violations);
        assert_eq!(result.operations, 200);
        assert!(result.queries_checked > 0);
        assert!(result.final_size > 0);
    }

    #[test]
    fn test_simulator_deterministic() {
        let result1 = Simulator::new(SimulatorConfig::new(777)).run(150);
        let result2 = Simulator::new(SimulatorConfig::new(777)).run(150);
        assert_eq!(result1.queries_checked, result2.queries_checked);
        assert_eq!(result1.final_size, result2.final_size);
    }

    #[test]
    fn test_simulator_query_heavy() {
        for seed in [1, 2, 3, 42] {
            let config = SimulatorConfig::new(seed)
                .with_query_rate(0.6)
                .with_delete_rate(0.2);
            let result = Simulator::new(config).run(300);
            assert!(
                result.passed(),
                "seed {seed}: {}",
                result
                    .invariant_violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n")
            );
        }
    }

    #[test]
    #[ignore] // Long running test
    fn test_simulator_stress() {
        for seed in 0..20 {
            let result = Simulator::new(SimulatorConfig::new(seed)).run(2_000);
            assert!(result.passed(), "seed {seed} failed");
        }
    }
}

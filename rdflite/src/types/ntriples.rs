//! N-Triples reading on top of [`oxttl`].
//!
//! Blank nodes are turned into resources under `urn:rdflite:bnode:`, scoped by
//! a batch number so that `_:b0` in two different loads stays distinct.

use std::fmt;

use oxrdf::{Subject, Term as OxTerm};
use oxttl::{NTriplesParser, TurtleSyntaxError};

use super::term::{Resource, Term};

/// IRI prefix given to blank nodes read from N-Triples input.
pub const BNODE_PREFIX: &str = "urn:rdflite:bnode:";

/// One statement read from N-Triples text.
#[derive(Debug, PartialEq, Eq)]
pub struct Statement {
    pub subject: Resource,
    pub predicate: Resource,
    pub object: Term,
}

/// Parse an N-Triples document.
///
/// `batch` scopes blank node labels; callers pass a fresh number per document.
/// Parsing stops at the first malformed statement.
pub fn parse_document(input: &str, batch: u64) -> Result<Vec<Statement>, NTriplesError> {
    let mut statements = Vec::new();
    for triple in NTriplesParser::new().for_slice(input.as_bytes()) {
        let triple = triple?;
        let subject = match triple.subject {
            Subject::NamedNode(node) => node.into(),
            Subject::BlankNode(node) => blank_resource(batch, node.as_str()),
        };
        let object = match triple.object {
            OxTerm::NamedNode(node) => Term::Resource(node.into()),
            OxTerm::BlankNode(node) => Term::Resource(blank_resource(batch, node.as_str())),
            OxTerm::Literal(literal) => Term::Literal(literal.into()),
        };
        statements.push(Statement {
            subject,
            predicate: triple.predicate.into(),
            object,
        });
    }
    Ok(statements)
}

fn blank_resource(batch: u64, label: &str) -> Resource {
    Resource::new(format!("{BNODE_PREFIX}{batch}:{label}"))
}

/// A malformed N-Triples statement.
#[derive(Debug)]
pub struct NTriplesError {
    /// 1-based line number.
    pub line: usize,
    pub kind: TurtleSyntaxError,
}

impl From<TurtleSyntaxError> for NTriplesError {
    fn from(kind: TurtleSyntaxError) -> Self {
        let line = usize::try_from(kind.location().start.line).unwrap_or(usize::MAX);
        Self {
            line: line.saturating_add(1),
            kind,
        }
    }
}

impl fmt::Display for NTriplesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for NTriplesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

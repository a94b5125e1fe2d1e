//! Errors raised while building, translating or executing a query.

use crate::storage::StoreError;
use crate::types::TypeError;

/// Errors that can occur while building, translating or executing a query.
///
/// Everything except `Backend` is raised before the backend is contacted.
#[derive(Debug)]
pub enum QueryError {
    /// A literal in subject, predicate or context position.
    Type(TypeError),
    /// A select, filter, sort or keyword variable that no where-clause binds.
    UnboundVariable(String),
    /// Both a language and a datatype filter on one variable.
    ConflictingFilter(String),
    /// Modifiers that cannot be combined, e.g. `count` with `ask`.
    ConflictingModifiers(String),
    /// A select query without any select variable.
    EmptyProjection,
    /// A query without where-clauses.
    EmptyQuery,
    /// A regex filter whose pattern does not compile.
    InvalidRegex { pattern: String, message: String },
    /// A keyword clause against a store without keyword index.
    KeywordSearchDisabled,
    /// A feature the target language cannot express.
    Unsupported(String),
    /// The backend failed.
    Backend(StoreError),
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Type(e) => write!(f, "{e}"),
            Self::UnboundVariable(name) => {
                write!(f, "variable ?{name} does not appear in any where-clause")
            }
            Self::ConflictingFilter(name) => write!(
                f,
                "variable ?{name} cannot be filtered on both language and datatype"
            ),
            Self::ConflictingModifiers(message) => write!(f, "conflicting modifiers: {message}"),
            Self::EmptyProjection => write!(f, "select query without select variables"),
            Self::EmptyQuery => write!(f, "query without where-clauses"),
            Self::InvalidRegex { pattern, message } => {
                write!(f, "invalid regex {pattern:?}: {message}")
            }
            Self::KeywordSearchDisabled => {
                write!(f, "keyword clause on a store without keyword search")
            }
            Self::Unsupported(feature) => write!(f, "unsupported: {feature}"),
            Self::Backend(e) => write!(f, "backend error: {e}"),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Type(e) => Some(e),
            Self::Backend(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TypeError> for QueryError {
    fn from(e: TypeError) -> Self {
        Self::Type(e)
    }
}

impl From<StoreError> for QueryError {
    fn from(e: StoreError) -> Self {
        Self::Backend(e)
    }
}

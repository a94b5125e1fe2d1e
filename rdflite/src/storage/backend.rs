//! The surface the query executor needs from a store.
//!
//! Keeping it a trait lets the executor run against the SQLite store or
//! against a test double that records what it was asked.

use super::store::StoreError;

/// One value of a result row.
#[derive(Debug, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Cell {
    /// The text, if this cell holds text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The integer, if this cell holds one.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<rusqlite::types::ValueRef<'_>> for Cell {
    fn from(value: rusqlite::types::ValueRef<'_>) -> Self {
        use rusqlite::types::ValueRef;
        match value {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(n) => Self::Integer(n),
            ValueRef::Real(n) => Self::Real(n),
            ValueRef::Text(bytes) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Self::Blob(bytes.to_vec()),
        }
    }
}

/// A raw result row.
pub type SqlRow = Vec<Cell>;

/// A `SELECT` over the keyword table yielding one subject column.
#[derive(Debug, PartialEq, Eq)]
pub struct KeywordSubquery {
    pub sql: String,
    pub params: Vec<String>,
}

/// Parameterized SQL execution over a triple table.
pub trait SqlBackend {
    /// Run `sql`, binding `params` positionally to its `?` placeholders.
    ///
    /// Parameters are never spliced into the text.
    fn execute_sql(&self, sql: &str, params: &[String]) -> Result<Vec<SqlRow>, StoreError>;

    /// Subjects (in lexical form) whose indexed literal text matches `text`.
    ///
    /// Returns `Ok(None)` when the backend has no keyword index.
    fn keyword_search(&self, text: &str) -> Result<Option<Vec<String>>, StoreError>;

    /// SQL selecting the subjects [`keyword_search`](Self::keyword_search)
    /// would return, to be nested inside `IN (...)`.
    ///
    /// Returns `None` when the backend has no keyword index.
    fn keyword_subquery(&self, text: &str) -> Option<KeywordSubquery>;

    /// Properties declared `rdfs:subPropertyOf` `predicate`, directly or
    /// through other properties, in lexical form. `predicate` itself is
    /// excluded.
    fn sub_properties(&self, predicate: &str) -> Result<Vec<String>, StoreError>;

    /// Whether predicates are expanded for queries that leave
    /// [`Query::reasoning`](crate::query::Query::reasoning) unset.
    fn reasoning(&self) -> bool {
        false
    }
}

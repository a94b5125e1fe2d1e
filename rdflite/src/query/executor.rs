//! Query execution.
//!
//! Runs translated SQL through a [`SqlBackend`] and turns result cells back
//! into terms.

use super::error::QueryError;
use super::sql::{self, SqlQuery};
use super::types::Query;
use crate::storage::{Cell, SqlBackend, SqlRow, StoreError};
use crate::types::Term;

/// One result row, in select order.
pub type Row = Vec<Term>;

/// The shape of a query result.
#[derive(Debug, PartialEq)]
pub enum QueryOutput {
    /// One row per match.
    Rows(Vec<Row>),
    /// One value per match, for flattened single-variable queries.
    Values(Vec<Term>),
    /// Number of matches of a count query.
    Count(u64),
    /// Whether an ask query matched.
    Ask(bool),
}

impl QueryOutput {
    /// Number of rows or values. Count and ask results have none.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Rows(rows) => rows.len(),
            Self::Values(values) => values.len(),
            Self::Count(_) | Self::Ask(_) => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Options for [`QueryExecutor::execute`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Return [`QueryOutput::Values`] when exactly one variable is selected.
    pub flatten: bool,
}

impl ExecuteOptions {
    #[must_use]
    pub const fn flatten() -> Self {
        Self { flatten: true }
    }
}

/// A query executor over a backend.
pub struct QueryExecutor<'a, B: SqlBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: SqlBackend + ?Sized> QueryExecutor<'a, B> {
    /// Create a new query executor for the given backend.
    pub const fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Translate `query` without running it.
    pub fn translate(&self, query: &Query) -> Result<SqlQuery, QueryError> {
        sql::translate(query, self.backend)
    }

    /// Run `query`.
    pub fn execute(&self, query: &Query, options: ExecuteOptions) -> Result<QueryOutput, QueryError> {
        let sql = self.translate(query)?;
        let rows = self.backend.execute_sql(&sql.text, &sql.params)?;

        if query.is_count() {
            return Ok(QueryOutput::Count(single_integer(&rows)?.try_into().unwrap_or_default()));
        }
        if query.is_ask() {
            return Ok(QueryOutput::Ask(single_integer(&rows)? != 0));
        }

        let rows = rows
            .into_iter()
            .map(wrap_row)
            .collect::<Result<Vec<Row>, StoreError>>()?;
        tracing::debug!(rows = rows.len(), "executed query");

        if options.flatten && query.select_variables().len() == 1 {
            return Ok(QueryOutput::Values(rows.into_iter().flatten().collect()));
        }
        Ok(QueryOutput::Rows(rows))
    }

    /// Run `query` and hand each row to `f`.
    ///
    /// Rows are delivered only once the whole result has been fetched and
    /// decoded, so `f` never sees part of a failed query. Returns the number
    /// of rows delivered.
    pub fn for_each(&self, query: &Query, mut f: impl FnMut(Row)) -> Result<usize, QueryError> {
        if query.is_count() || query.is_ask() {
            return Err(QueryError::Unsupported(
                "per-row results of a count or ask query".to_owned(),
            ));
        }
        let QueryOutput::Rows(rows) = self.execute(query, ExecuteOptions::default())? else {
            return Ok(0);
        };
        let delivered = rows.len();
        for row in rows {
            f(row);
        }
        Ok(delivered)
    }
}

fn wrap_row(row: SqlRow) -> Result<Row, StoreError> {
    row.into_iter().map(wrap_cell).collect()
}

/// Parse a stored cell back into a term.
fn wrap_cell(cell: Cell) -> Result<Term, StoreError> {
    match cell {
        Cell::Text(text) => {
            Term::from_lexical(&text).map_err(|_| StoreError::MalformedNode(text))
        }
        other => Err(StoreError::MalformedNode(format!("{other:?}"))),
    }
}

fn single_integer(rows: &[SqlRow]) -> Result<i64, StoreError> {
    match rows.first().and_then(|row| row.first()) {
        Some(cell) => cell
            .as_integer()
            .ok_or_else(|| StoreError::MalformedNode(format!("{cell:?}"))),
        None => Err(StoreError::MalformedNode("empty aggregate result".to_owned())),
    }
}

//! Query engine for the triple store.
//!
//! A [`Query`] is a conjunction of triple patterns plus projection, filters,
//! keyword constraints and result modifiers. It is translated either to SQL
//! over the triple table (and run by a [`QueryExecutor`]) or to SPARQL text
//! for a remote endpoint.
//!
//! # Example
//!
//! ```ignore
//! use rdflite::query::{ExecuteOptions, Query, QueryExecutor, Slot};
//! use rdflite::storage::TripleStore;
//! use rdflite::types::Resource;
//!
//! let store = TripleStore::in_memory()?;
//! let query = Query::new()
//!     .select(["s"])
//!     .where_clause(Slot::var("s"), Resource::new("http://test/age"), Slot::var("age"))?
//!     .sort(["age"]);
//!
//! let output = QueryExecutor::new(&store).execute(&query, ExecuteOptions::flatten())?;
//! ```

mod error;
mod executor;
mod planner;
mod sparql;
mod sql;
mod types;

pub use error::QueryError;
pub use executor::{ExecuteOptions, QueryExecutor, QueryOutput, Row};
pub use planner::{Column, JoinCondition, JoinPlan, SlotRef};
pub use sparql::{NameGenerator, SparqlEngine, SparqlTranslator, YARS_KEYWORD};
pub use sql::{SqlQuery, translate};
pub use types::{FilterSet, LangFilter, Pattern, Query, Slot, SortDirection, Variable};

//! Triple store storage.
//!
//! Statements live in a single SQLite table in lexical form:
//!
//! ```text
//! triple(s TEXT, p TEXT, o TEXT, c TEXT)   UNIQUE(s, p, o, c)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use rdflite::storage::TripleStore;
//! use rdflite::types::{Literal, Resource};
//!
//! let mut store = TripleStore::in_memory()?;
//! store.add(
//!     Resource::new("http://test/eyal"),
//!     Resource::new("http://test/age"),
//!     Literal::integer(27),
//!     None,
//! )?;
//! assert_eq!(store.size()?, 1);
//! ```

mod backend;
mod keyword;
mod schema;
mod store;
mod suggest;

pub use backend::{Cell, KeywordSubquery, SqlBackend, SqlRow};
pub use keyword::KeywordIndex;
pub use schema::{DEFAULT_CONTEXT, IndexSet, TRIPLE_TABLE, index_names};
pub use store::{StoreError, TripleStore};

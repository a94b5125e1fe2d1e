// Life of a query:
// 1. Caller builds a `query::Query`
// 2. Validate it (bound variables, modifiers, filters)
// 3. Translate:
//     - Plan joins over aliases of the triple table
//     - Emit SQL text, constants as positional parameters
//     - Nest keyword clauses as subqueries over the keyword index
//     - With reasoning, expand predicates to their sub-properties
// 4. Run the SQL through a `storage::SqlBackend`
// 5. Parse result cells back into terms and shape the output
//
// System components:
//  - SQLite triple table (+ keyword index, suggestion views)
//  - Query model to SQL / SPARQL translators
//  - Executor

pub mod config;
pub mod query;
pub mod storage;
pub mod types;

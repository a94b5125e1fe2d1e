//! Predicate suggestions from usage statistics.
//!
//! Two views summarize the triple table:
//! - `occurrence(p, count)`: number of distinct subjects using `p`
//! - `cooccurrence(p1, p2, count)`: number of distinct subjects using both
//!
//! A resource is suggested the predicates that co-occur with every one of its
//! own (shared) predicates, scored by how often they do.

use std::collections::{BTreeMap, BTreeSet};

use rusqlite::Connection;

use super::store::StoreError;
use crate::types::{Resource, Term};

fn create_views(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE VIEW IF NOT EXISTS occurrence AS
            SELECT p, COUNT(DISTINCT s) AS count FROM triple GROUP BY p;
        CREATE VIEW IF NOT EXISTS cooccurrence AS
            SELECT t0.p AS p1, t1.p AS p2, COUNT(DISTINCT t0.s) AS count
            FROM triple AS t0 JOIN triple AS t1 ON t0.s = t1.s AND t0.p <> t1.p
            GROUP BY t0.p, t1.p;",
    )
}

pub(super) fn suggest(
    conn: &Connection,
    resource: &Resource,
) -> Result<Option<Vec<(Resource, f64)>>, StoreError> {
    create_views(conn)?;

    let mut stmt = conn.prepare("SELECT DISTINCT p FROM triple WHERE s = ?1 ORDER BY p")?;
    let own = stmt
        .query_map([resource.to_lexical()], |row| row.get(0))?
        .collect::<rusqlite::Result<BTreeSet<String>>>()?;

    // Predicates used by a single subject say nothing about other subjects.
    let mut stmt = conn.prepare("SELECT p, count FROM occurrence WHERE count > 1")?;
    let occurrence = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<BTreeMap<String, f64>>>()?;

    let mut cooccurrence: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    let mut stmt = conn.prepare("SELECT p1, p2, count FROM cooccurrence")?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        cooccurrence
            .entry(row.get(0)?)
            .or_default()
            .insert(row.get(1)?, row.get(2)?);
    }

    let shared: Vec<&String> = own.iter().filter(|p| occurrence.contains_key(*p)).collect();
    if shared.is_empty() {
        tracing::debug!(%resource, "no shared predicates to suggest from");
        return Ok(None);
    }

    let mut candidates: Option<BTreeSet<&String>> = None;
    for p in &shared {
        let cooccurring: BTreeSet<&String> = cooccurrence
            .get(*p)
            .map(|m| m.keys().collect())
            .unwrap_or_default();
        candidates = Some(match candidates {
            Some(current) => current.intersection(&cooccurring).copied().collect(),
            None => cooccurring,
        });
    }

    let mut suggestions = Vec::new();
    for candidate in candidates.unwrap_or_default() {
        if own.contains(candidate) {
            continue;
        }
        let score = shared.iter().fold(1.0, |score, p| {
            let together = cooccurrence
                .get(candidate)
                .and_then(|m| m.get(*p))
                .copied()
                .unwrap_or(0.0);
            score * together / occurrence[*p]
        });
        let predicate = match Term::from_lexical(candidate) {
            Ok(Term::Resource(r)) => r,
            _ => return Err(StoreError::MalformedNode(candidate.as_str().to_owned())),
        };
        suggestions.push((predicate, score));
    }
    suggestions.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    tracing::debug!(%resource, suggestions = suggestions.len(), "suggested predicates");
    Ok(Some(suggestions))
}

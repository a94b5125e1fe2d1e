//! Test that distinct returns each subject once.

use crate::e2e_tests::helpers::{new_store, r, values};
use crate::query::{Query, Slot};
use crate::types::Term;

/// Setup: two subjects, each with two matching rows.
#[test]
fn test_distinct_subjects() {
    let mut store = new_store();
    for subject in ["eyal", "renaud"] {
        store.add(r(subject), r("type"), r("Person"), None).unwrap();
        store.add(r(subject), r("type"), r("Person"), Some(&r("g"))).unwrap();
    }

    let plain = Query::new()
        .select(["s"])
        .where_clause(Slot::var("s"), r("type"), r("Person"))
        .unwrap();
    assert_eq!(values(&store, &plain).len(), 4);

    let distinct = Query::new()
        .distinct(["s"])
        .where_clause(Slot::var("s"), r("type"), r("Person"))
        .unwrap()
        .sort(["s"]);
    assert_eq!(
        values(&store, &distinct),
        vec![Term::from(r("eyal")), Term::from(r("renaud"))]
    );
}

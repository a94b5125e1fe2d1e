//! Test named graphs.

use crate::e2e_tests::helpers::{new_store, r, rows, values};
use crate::query::{Query, Slot};
use crate::types::Term;

#[test]
fn test_where_in_context() {
    let mut store = new_store();
    store.add(r("a"), r("knows"), r("b"), Some(&r("g1"))).unwrap();
    store.add(r("a"), r("knows"), r("c"), Some(&r("g2"))).unwrap();
    store.add(r("a"), r("knows"), r("d"), None).unwrap();

    let in_g1 = Query::new()
        .select(["o"])
        .where_in_context(r("a"), r("knows"), Slot::var("o"), r("g1"))
        .unwrap();
    assert_eq!(values(&store, &in_g1), vec![Term::from(r("b"))]);

    // Without a context every graph matches.
    let anywhere = Query::new()
        .select(["o"])
        .where_clause(r("a"), r("knows"), Slot::var("o"))
        .unwrap();
    assert_eq!(values(&store, &anywhere).len(), 3);
}

#[test]
fn test_context_variable_ranges_over_named_graphs() {
    let mut store = new_store();
    store.add(r("a"), r("knows"), r("b"), Some(&r("g1"))).unwrap();
    store.add(r("a"), r("knows"), r("c"), Some(&r("g2"))).unwrap();
    store.add(r("a"), r("knows"), r("d"), None).unwrap();

    let query = Query::new()
        .select(["o", "g"])
        .where_in_context(r("a"), r("knows"), Slot::var("o"), Slot::var("g"))
        .unwrap()
        .sort(["g"]);
    assert_eq!(
        rows(&store, &query),
        vec![
            vec![Term::from(r("b")), Term::from(r("g1"))],
            vec![Term::from(r("c")), Term::from(r("g2"))],
        ]
    );
    assert_eq!(store.contexts().unwrap(), vec![r("g1"), r("g2")]);
}

#[test]
fn test_delete_by_context() {
    let mut store = new_store();
    store.add(r("a"), r("knows"), r("b"), Some(&r("g1"))).unwrap();
    store.add(r("a"), r("knows"), r("b"), None).unwrap();
    assert_eq!(store.delete(None, None, None, Some(&r("g1"))).unwrap(), 1);
    assert_eq!(store.dump().unwrap(), vec![format!(
        "{} {} {}",
        r("a").to_lexical(),
        r("knows").to_lexical(),
        r("b").to_lexical()
    )]);
}

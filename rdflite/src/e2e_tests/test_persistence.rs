//! Test that an on-disk store survives reopening.

use crate::config::StoreConfig;
use crate::e2e_tests::helpers::{r, values};
use crate::query::{Query, Slot};
use crate::storage::{IndexSet, TripleStore};
use crate::types::{Literal, Term};

#[test]
fn test_reopen_keeps_statements() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::default()
        .with_location(dir.path().join("people.db"))
        .with_indices(IndexSet::all());

    {
        let mut store = TripleStore::open(&config).unwrap();
        store.add(r("eyal"), r("age"), Literal::integer(27), None).unwrap();
        store.add(r("eyal"), r("name"), Literal::string("eyal"), None).unwrap();
        assert_eq!(store.location(), Some(dir.path().join("people.db").as_path()));
    }

    let store = TripleStore::open(&config).unwrap();
    assert_eq!(store.size().unwrap(), 2);
    let query = Query::new()
        .select(["age"])
        .where_clause(r("eyal"), r("age"), Slot::var("age"))
        .unwrap();
    assert_eq!(values(&store, &query), vec![Term::from(Literal::integer(27))]);
}

#[test]
fn test_fresh_drops_existing_statements() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::default().with_location(dir.path().join("fresh.db"));
    {
        let mut store = TripleStore::open(&config).unwrap();
        store.add(r("a"), r("knows"), r("b"), None).unwrap();
    }
    let store = TripleStore::open(&config.with_fresh(true)).unwrap();
    assert_eq!(store.size().unwrap(), 0);
}

#[test]
fn test_load_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.nt");
    std::fs::write(
        &path,
        "<http://test/eyal> <http://test/knows> _:friend .\n\
         _:friend <http://test/name> \"Renaud\"@en .\n",
    )
    .unwrap();

    let mut store = crate::testing::new_test_store(false).unwrap();
    assert_eq!(store.load(&path, Some(&r("g"))).unwrap(), 2);

    // The blank node becomes one resource shared by both statements.
    let query = Query::new()
        .select(["name"])
        .where_in_context(r("eyal"), r("knows"), Slot::var("f"), r("g"))
        .unwrap()
        .where_clause(Slot::var("f"), r("name"), Slot::var("name"))
        .unwrap();
    assert_eq!(
        values(&store, &query),
        vec![Term::from(Literal::lang_string("Renaud", "en"))]
    );
}

#[test]
fn test_malformed_file_adds_nothing() {
    let mut store = crate::testing::new_test_store(false).unwrap();
    let result = store.load_ntriples(
        "<http://test/a> <http://test/b> <http://test/c> .\nnot a triple\n",
        None,
    );
    assert!(result.is_err());
    assert_eq!(store.size().unwrap(), 0);
}

//! Test that reasoning lets a super-property match statements stored under
//! its sub-properties.

use crate::config::StoreConfig;
use crate::e2e_tests::helpers::{count, new_store, r, values};
use crate::query::{Query, Slot};
use crate::storage::TripleStore;
use crate::types::Term;

const RELATIONS: &str = "\
<http://test/mother> <http://www.w3.org/2000/01/rdf-schema#subPropertyOf> <http://test/parent> .
<http://test/parent> <http://www.w3.org/2000/01/rdf-schema#subPropertyOf> <http://test/ancestor> .
<http://test/ancestor> <http://www.w3.org/2000/01/rdf-schema#subPropertyOf> <http://test/relative> .
<http://test/sister> <http://www.w3.org/2000/01/rdf-schema#subPropertyOf> <http://test/relative> .
<http://test/grandmother> <http://test/mother> <http://test/mum> .
<http://test/mum> <http://test/ancestor> <http://test/daughter> .
<http://test/son> <http://test/sister> <http://test/daughter> .
";

fn family(store: &mut TripleStore) {
    store.load_ntriples(RELATIONS, None).unwrap();
}

fn subjects_with(predicate: &str, object: &str) -> Query {
    Query::new()
        .distinct(["s"])
        .where_clause(Slot::var("s"), r(predicate), r(object))
        .unwrap()
        .sort(["s"])
}

fn terms(names: &[&str]) -> Vec<Term> {
    names.iter().map(|n| Term::from(r(n))).collect()
}

#[test]
fn test_super_property_matches_sub_property_statements() {
    let mut store = new_store();
    family(&mut store);

    assert_eq!(
        values(&store, &subjects_with("ancestor", "mum").reasoning(true)),
        terms(&["grandmother"])
    );
    assert_eq!(
        values(&store, &subjects_with("relative", "daughter").reasoning(true)),
        terms(&["mum", "son"])
    );
    assert!(values(&store, &subjects_with("ancestor", "mum")).is_empty());
}

#[test]
fn test_store_default_applies_to_queries_that_do_not_choose() {
    let config = StoreConfig::default().with_reasoning(true);
    let mut store = TripleStore::open(&config).unwrap();
    family(&mut store);

    let query = subjects_with("parent", "mum");
    assert_eq!(values(&store, &query), terms(&["grandmother"]));
    assert!(values(&store, &query.reasoning(false)).is_empty());
}

#[test]
fn test_reasoning_in_joins_and_counts() {
    let mut store = new_store();
    family(&mut store);

    // Two hops: someone whose ancestor has an ancestor.
    let query = Query::new()
        .count(["s"])
        .where_clause(Slot::var("s"), r("ancestor"), Slot::var("m"))
        .unwrap()
        .where_clause(Slot::var("m"), r("ancestor"), Slot::var("d"))
        .unwrap()
        .reasoning(true);
    assert_eq!(count(&store, &query), 1);
}

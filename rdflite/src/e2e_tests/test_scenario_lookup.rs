//! Test looking up the object of a known subject and predicate.

use crate::e2e_tests::helpers::{new_store, r, values};
use crate::query::{Query, Slot};
use crate::types::{Literal, Term};

#[test]
fn test_lookup_single_object() {
    let mut store = new_store();
    store.add(r("eyal"), r("age"), Literal::string("27"), None).unwrap();
    store.add(r("eyal"), r("name"), Literal::string("eyal"), None).unwrap();

    let query = Query::new()
        .select(["o"])
        .where_clause(r("eyal"), r("age"), Slot::var("o"))
        .unwrap();

    assert_eq!(values(&store, &query), vec![Term::from(Literal::string("27"))]);
}

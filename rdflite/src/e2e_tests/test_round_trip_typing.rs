//! Test that literals come back from queries with their type.

use crate::e2e_tests::helpers::{new_store, r, values};
use crate::query::{Query, Slot};
use crate::types::{Literal, Resource, Term, Value};

fn stored_value(literal: Literal) -> Term {
    let mut store = new_store();
    store.add(r("x"), r("value"), literal, None).unwrap();
    let query = Query::new()
        .select(["v"])
        .where_clause(r("x"), r("value"), Slot::var("v"))
        .unwrap();
    let mut found = values(&store, &query);
    assert_eq!(found.len(), 1);
    found.remove(0)
}

#[test]
fn test_string_round_trip() {
    let literal = Literal::string("line one\nline \"two\"\t\\");
    let term = stored_value(literal.clone_value());
    assert_eq!(term, Term::from(literal));
    assert_eq!(
        term.as_literal().unwrap().value(),
        Value::String("line one\nline \"two\"\t\\".to_owned())
    );
}

#[test]
fn test_integer_round_trip() {
    let term = stored_value(Literal::integer(-42));
    assert_eq!(term.as_literal().unwrap().value(), Value::Integer(-42));
}

#[test]
fn test_boolean_round_trip() {
    let term = stored_value(Literal::boolean(true));
    assert_eq!(term.as_literal().unwrap().value(), Value::Boolean(true));
}

#[test]
fn test_double_round_trip() {
    let term = stored_value(Literal::double(2.5));
    assert_eq!(term.as_literal().unwrap().value(), Value::Double(2.5));
}

#[test]
fn test_language_and_custom_type_round_trip() {
    let tagged = Literal::lang_string("bonjour", "fr");
    assert_eq!(stored_value(tagged.clone_value()), Term::from(tagged));

    let custom = Literal::typed("1 kg", Resource::new("http://test/weight"));
    assert_eq!(stored_value(custom.clone_value()), Term::from(custom));
}

#[test]
fn test_resource_round_trip() {
    assert_eq!(
        stored_value_resource(),
        Term::from(Resource::new("http://test/with space?and=query"))
    );
}

fn stored_value_resource() -> Term {
    let mut store = new_store();
    let target = Resource::new("http://test/with space?and=query");
    store.add(r("x"), r("link"), target, None).unwrap();
    let query = Query::new()
        .select(["v"])
        .where_clause(r("x"), r("link"), Slot::var("v"))
        .unwrap();
    values(&store, &query).remove(0)
}

//! Value types shared by the store and the query engine.

pub mod ntriples;
pub mod term;

pub use ntriples::{NTriplesError, Statement, parse_document};
pub use term::{
    Literal, Position, RDFS_SUB_PROPERTY_OF, Resource, Term, TermParseError, TypeError, Value,
    XSD, XSD_BOOLEAN, XSD_DOUBLE, XSD_INTEGER, XSD_STRING,
};

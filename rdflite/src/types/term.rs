//! RDF terms and their lexical form.
//!
//! Terms are stored in the triple table as text:
//! - resources as `<iri>`
//! - plain literals as `"value"`
//! - typed literals as `"value"^^<datatype>`
//! - language-tagged literals as `"value"@lang`
//!
//! The lexical form is the N-Triples serialization written and read by
//! [`oxrdf`], so every stored cell parses back to an equal term.

use std::fmt;
use std::str::FromStr;

use oxrdf::{LiteralRef, NamedNodeRef};

/// Namespace of the XML Schema datatypes.
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

/// `xsd:string`.
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
/// `xsd:integer`.
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
/// `xsd:double`.
pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
/// `xsd:boolean`.
pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

/// `rdfs:subPropertyOf`.
pub const RDFS_SUB_PROPERTY_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subPropertyOf";

/// An IRI-identified node.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Resource {
    iri: String,
}

impl Resource {
    /// Create a resource from its IRI (without angle brackets).
    #[must_use]
    pub fn new(iri: impl Into<String>) -> Self {
        Self { iri: iri.into() }
    }

    /// The IRI of this resource.
    #[must_use]
    pub fn iri(&self) -> &str {
        &self.iri
    }

    /// The stored form, `<iri>`.
    #[must_use]
    pub fn to_lexical(&self) -> String {
        format!("<{}>", self.iri)
    }

    /// Create a copy of this resource.
    ///
    /// This is used instead of Clone to comply with project policy.
    #[must_use]
    pub fn clone_value(&self) -> Self {
        Self {
            iri: self.iri.as_str().to_owned(),
        }
    }
}

impl From<oxrdf::NamedNode> for Resource {
    fn from(node: oxrdf::NamedNode) -> Self {
        Self::new(node.into_string())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.iri)
    }
}

/// A literal value attached as the object of a triple.
///
/// A literal carries at most one of a datatype or a language tag.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Literal {
    value: String,
    datatype: Option<Resource>,
    language: Option<String>,
}

impl Literal {
    /// A plain string literal (no datatype, no language).
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    /// An `xsd:integer` literal.
    #[must_use]
    pub fn integer(value: i64) -> Self {
        Self::typed(value.to_string(), Resource::new(XSD_INTEGER))
    }

    /// An `xsd:double` literal.
    #[must_use]
    pub fn double(value: f64) -> Self {
        Self::typed(value.to_string(), Resource::new(XSD_DOUBLE))
    }

    /// An `xsd:boolean` literal.
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self::typed(value.to_string(), Resource::new(XSD_BOOLEAN))
    }

    /// A literal with an explicit datatype.
    ///
    /// `xsd:string` is the datatype of every plain literal, so it yields one.
    #[must_use]
    pub fn typed(value: impl Into<String>, datatype: Resource) -> Self {
        if datatype.iri() == XSD_STRING {
            return Self::string(value);
        }
        Self {
            value: value.into(),
            datatype: Some(datatype),
            language: None,
        }
    }

    /// A language-tagged string. The tag is stored lowercase without a leading `@`.
    #[must_use]
    pub fn lang_string(value: impl Into<String>, language: &str) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: Some(language.trim_start_matches('@').to_ascii_lowercase()),
        }
    }

    /// The literal text, unescaped.
    #[must_use]
    pub fn lexical_value(&self) -> &str {
        &self.value
    }

    /// The datatype, if any.
    #[must_use]
    pub const fn datatype(&self) -> Option<&Resource> {
        self.datatype.as_ref()
    }

    /// The language tag, if any.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Whether this literal has neither datatype nor language tag.
    #[must_use]
    pub const fn is_plain(&self) -> bool {
        self.datatype.is_none() && self.language.is_none()
    }

    /// Re-type the literal according to its datatype.
    ///
    /// Values whose text does not parse as their declared datatype come back
    /// as [`Value::Other`].
    #[must_use]
    pub fn value(&self) -> Value {
        let text = self.value.as_str();
        match self.datatype.as_ref().map(Resource::iri) {
            None | Some(XSD_STRING) => Value::String(text.to_owned()),
            Some(XSD_INTEGER) => text
                .parse()
                .map_or_else(|_| Value::Other(text.to_owned()), Value::Integer),
            Some(XSD_DOUBLE) => text
                .parse()
                .map_or_else(|_| Value::Other(text.to_owned()), Value::Double),
            Some(XSD_BOOLEAN) => match text {
                "true" | "1" => Value::Boolean(true),
                "false" | "0" => Value::Boolean(false),
                _ => Value::Other(text.to_owned()),
            },
            Some(_) => Value::Other(text.to_owned()),
        }
    }

    /// The stored form, e.g. `"27"^^<http://www.w3.org/2001/XMLSchema#integer>`.
    #[must_use]
    pub fn to_lexical(&self) -> String {
        let literal = match (&self.datatype, &self.language) {
            (Some(datatype), _) => LiteralRef::new_typed_literal(
                &self.value,
                NamedNodeRef::new_unchecked(datatype.iri()),
            ),
            (None, Some(language)) => {
                LiteralRef::new_language_tagged_literal_unchecked(&self.value, language)
            }
            (None, None) => LiteralRef::new_simple_literal(&self.value),
        };
        literal.to_string()
    }

    /// Create a copy of this literal.
    ///
    /// This is used instead of Clone to comply with project policy.
    #[must_use]
    pub fn clone_value(&self) -> Self {
        Self {
            value: self.value.as_str().to_owned(),
            datatype: self.datatype.as_ref().map(Resource::clone_value),
            language: self.language.as_deref().map(str::to_owned),
        }
    }
}

impl From<oxrdf::Literal> for Literal {
    fn from(literal: oxrdf::Literal) -> Self {
        let value = literal.value().to_owned();
        match literal.language() {
            Some(language) => Self::lang_string(value, language),
            None => Self::typed(value, Resource::new(literal.datatype().as_str())),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_lexical())
    }
}

/// A literal re-typed into a native value.
#[derive(Debug, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    /// Unknown datatype, or text that does not parse as its datatype.
    Other(String),
}

/// A node that can be stored in a triple: a resource or a literal.
#[derive(Debug, PartialEq, Eq, Hash)]
pub enum Term {
    Resource(Resource),
    Literal(Literal),
}

impl Term {
    /// Parse a term from its stored form.
    pub fn from_lexical(input: &str) -> Result<Self, TermParseError> {
        // Resources are stored as written, without escapes or IRI validation.
        if let Some(iri) = input
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
            .filter(|iri| !iri.contains(['<', '>', '\\']))
        {
            return Ok(Self::Resource(Resource::new(iri)));
        }
        match oxrdf::Term::from_str(input)? {
            oxrdf::Term::NamedNode(node) => Ok(Self::Resource(node.into())),
            oxrdf::Term::Literal(literal) => Ok(Self::Literal(literal.into())),
            blank => Err(TermParseError::UnexpectedBlankNode(blank.to_string())),
        }
    }

    /// The stored form of this term.
    #[must_use]
    pub fn to_lexical(&self) -> String {
        match self {
            Self::Resource(r) => r.to_lexical(),
            Self::Literal(l) => l.to_lexical(),
        }
    }

    /// The resource, if this term is one.
    #[must_use]
    pub const fn as_resource(&self) -> Option<&Resource> {
        match self {
            Self::Resource(r) => Some(r),
            Self::Literal(_) => None,
        }
    }

    /// The literal, if this term is one.
    #[must_use]
    pub const fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(l) => Some(l),
            Self::Resource(_) => None,
        }
    }

    /// Require a resource in the given triple position.
    pub fn expect_resource(&self, position: Position) -> Result<&Resource, TypeError> {
        match self {
            Self::Resource(r) => Ok(r),
            Self::Literal(l) => Err(TypeError::new(position, l.to_lexical())),
        }
    }

    /// Create a copy of this term.
    ///
    /// This is used instead of Clone to comply with project policy.
    #[must_use]
    pub fn clone_value(&self) -> Self {
        match self {
            Self::Resource(r) => Self::Resource(r.clone_value()),
            Self::Literal(l) => Self::Literal(l.clone_value()),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource(r) => r.fmt(f),
            Self::Literal(l) => l.fmt(f),
        }
    }
}

impl From<Resource> for Term {
    fn from(r: Resource) -> Self {
        Self::Resource(r)
    }
}

impl From<Literal> for Term {
    fn from(l: Literal) -> Self {
        Self::Literal(l)
    }
}

/// A position inside a triple or triple pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Subject,
    Predicate,
    Object,
    Context,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Subject => "subject",
            Self::Predicate => "predicate",
            Self::Object => "object",
            Self::Context => "context",
        })
    }
}

/// A term of the wrong kind was supplied for a triple position.
#[derive(Debug, PartialEq, Eq)]
pub struct TypeError {
    /// Where the term was supplied.
    pub position: Position,
    /// Stored form of the offending term.
    pub found: String,
}

impl TypeError {
    #[must_use]
    pub const fn new(position: Position, found: String) -> Self {
        Self { position, found }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected a resource or variable in {} position, found literal {}",
            self.position, self.found
        )
    }
}

impl std::error::Error for TypeError {}

/// Errors from parsing a stored term.
#[derive(Debug)]
pub enum TermParseError {
    /// Not a valid N-Triples term.
    Syntax(oxrdf::TermParseError),
    /// A blank node where only resources and literals are allowed.
    UnexpectedBlankNode(String),
}

impl fmt::Display for TermParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(e) => write!(f, "invalid term: {e}"),
            Self::UnexpectedBlankNode(node) => write!(f, "unexpected blank node {node}"),
        }
    }
}

impl std::error::Error for TermParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Syntax(e) => Some(e),
            Self::UnexpectedBlankNode(_) => None,
        }
    }
}

impl From<oxrdf::TermParseError> for TermParseError {
    fn from(e: oxrdf::TermParseError) -> Self {
        Self::Syntax(e)
    }
}

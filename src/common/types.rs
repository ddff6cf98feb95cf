// RDF Data Model
//
// Terms, quads and the two solution shapes (engine bindings and plain records)
// that flow through result sequences.

use std::fmt;

use linked_hash_map::LinkedHashMap;

/// XML Schema string datatype, the datatype of every plain literal
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// XML Schema integer datatype
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

/// Datatype of language-tagged literals
pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

/// An RDF term as produced by the query engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "termType")]
pub enum Term {
    NamedNode {
        value: String,
    },
    BlankNode {
        value: String,
    },
    Literal {
        value: String,
        datatype: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
    DefaultGraph,
}

impl Term {
    pub fn named_node(iri: impl Into<String>) -> Self {
        Term::NamedNode { value: iri.into() }
    }

    pub fn blank_node(id: impl Into<String>) -> Self {
        Term::BlankNode { value: id.into() }
    }

    /// Plain literal, typed as `xsd:string`
    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: XSD_STRING.to_string(),
            language: None,
        }
    }

    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: datatype.into(),
            language: None,
        }
    }

    pub fn lang_literal(value: impl Into<String>, language: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: RDF_LANG_STRING.to_string(),
            language: Some(language.into()),
        }
    }

    pub fn default_graph() -> Self {
        Term::DefaultGraph
    }

    /// Lexical value of the term. The default graph has an empty value.
    pub fn value(&self) -> &str {
        match self {
            Term::NamedNode { value } | Term::BlankNode { value } | Term::Literal { value, .. } => value,
            Term::DefaultGraph => "",
        }
    }

    pub fn is_named_node(&self) -> bool {
        matches!(self, Term::NamedNode { .. })
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal { .. })
    }

    pub fn is_default_graph(&self) -> bool {
        matches!(self, Term::DefaultGraph)
    }

    /// Datatype IRI for literals
    pub fn datatype(&self) -> Option<&str> {
        match self {
            Term::Literal { datatype, .. } => Some(datatype),
            _ => None,
        }
    }
}

/// Escape a lexical value for N-Triples string syntax
pub(crate) fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::NamedNode { value } => write!(f, "<{}>", value),
            Term::BlankNode { value } => write!(f, "_:{}", value),
            Term::Literal { value, language: Some(lang), .. } => {
                write!(f, "\"{}\"@{}", escape_literal(value), lang)
            }
            Term::Literal { value, datatype, .. } if datatype == XSD_STRING => {
                write!(f, "\"{}\"", escape_literal(value))
            }
            Term::Literal { value, datatype, .. } => {
                write!(f, "\"{}\"^^<{}>", escape_literal(value), datatype)
            }
            Term::DefaultGraph => Ok(()),
        }
    }
}

/// A structured record: subject, predicate, object and graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Quad {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    pub graph: Term,
}

impl Quad {
    pub fn new(subject: Term, predicate: Term, object: Term, graph: Term) -> Self {
        Quad { subject, predicate, object, graph }
    }

    /// A quad in the default graph
    pub fn triple(subject: Term, predicate: Term, object: Term) -> Self {
        Quad::new(subject, predicate, object, Term::DefaultGraph)
    }
}

/// One solution as emitted by the engine: variables in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Binding {
    entries: Vec<(String, Term)>,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a variable. Rebinding keeps the variable's original position.
    pub fn insert(&mut self, variable: impl Into<String>, term: Term) {
        let variable = variable.into();
        match self.entries.iter_mut().find(|(name, _)| *name == variable) {
            Some(entry) => entry.1 = term,
            None => self.entries.push((variable, term)),
        }
    }

    pub fn get(&self, variable: &str) -> Option<&Term> {
        self.entries
            .iter()
            .find(|(name, _)| name == variable)
            .map(|(_, term)| term)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.entries.iter().map(|(name, term)| (name.as_str(), term))
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Term)> for Binding {
    fn from_iter<I: IntoIterator<Item = (K, Term)>>(iter: I) -> Self {
        let mut binding = Binding::new();
        for (variable, term) in iter {
            binding.insert(variable, term);
        }
        binding
    }
}

impl IntoIterator for Binding {
    type Item = (String, Term);
    type IntoIter = std::vec::IntoIter<(String, Term)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Plain key-value record built from a binding, keeping variable order
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
#[serde(transparent)]
pub struct Solution {
    values: LinkedHashMap<String, Term>,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, variable: &str) -> Option<&Term> {
        self.values.get(variable)
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.values.contains_key(variable)
    }

    /// Variable names in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.values.iter().map(|(name, term)| (name.as_str(), term))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Binding> for Solution {
    fn from(binding: Binding) -> Self {
        let mut values = LinkedHashMap::new();
        for (variable, term) in binding {
            values.insert(variable, term);
        }
        Solution { values }
    }
}

// Query Engine Backend
//
// Interfaces of the external collaborators: the query engine that evaluates
// query strings and the quad store it reads from. Neither is implemented
// here; the facade only hands the store to the engine and adapts what the
// engine returns.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::common::types::{Binding, Quad, Term};
use crate::serialize;
use crate::stream::push::BoxedSource;

/// Push source of engine solutions
pub type BindingStream = BoxedSource<Binding>;

/// Push source of quads
pub type QuadStream = BoxedSource<Quad>;

/// Push source of serialized output chunks
pub type ByteStream = BoxedSource<Vec<u8>>;

/// Errors reported by the engine or the store
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unsupported format \"{format}\" for {kind} results")]
    UnsupportedFormat { format: String, kind: ResultKind },

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Discriminant of an engine result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    Bindings,
    Quads,
    Boolean,
}

impl ResultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultKind::Bindings => "bindings",
            ResultKind::Quads => "quads",
            ResultKind::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result handle returned by the engine for one query.
///
/// Consumed exactly once: it is either normalized, passed through, or handed
/// back to the engine for serialization.
pub enum EngineResult {
    /// Solutions of a SELECT-style query; `variables` in projection order
    Bindings { variables: Vec<String>, stream: BindingStream },
    /// Quads of a CONSTRUCT/DESCRIBE-style query
    Quads(QuadStream),
    /// Answer of an ASK-style query
    Boolean(bool),
}

impl EngineResult {
    pub fn kind(&self) -> ResultKind {
        match self {
            EngineResult::Bindings { .. } => ResultKind::Bindings,
            EngineResult::Quads(_) => ResultKind::Quads,
            EngineResult::Boolean(_) => ResultKind::Boolean,
        }
    }

    /// Release the underlying push source, if any
    pub fn close(&mut self) {
        match self {
            EngineResult::Bindings { stream, .. } => stream.close(),
            EngineResult::Quads(stream) => stream.close(),
            EngineResult::Boolean(_) => {}
        }
    }
}

impl fmt::Debug for EngineResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineResult::Bindings { variables, .. } => {
                f.debug_struct("Bindings").field("variables", variables).finish_non_exhaustive()
            }
            EngineResult::Quads(_) => f.debug_struct("Quads").finish_non_exhaustive(),
            EngineResult::Boolean(value) => f.debug_tuple("Boolean").field(value).finish(),
        }
    }
}

/// Kind of data source handed to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    /// An in-process store answering quad pattern lookups
    #[default]
    RdfjsSource,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::RdfjsSource => "rdfjsSource",
        }
    }
}

/// One source the engine should evaluate the query against
pub struct DataSource<S: ?Sized> {
    pub kind: SourceKind,
    pub value: Arc<S>,
}

impl<S: ?Sized> Clone for DataSource<S> {
    fn clone(&self) -> Self {
        DataSource { kind: self.kind, value: Arc::clone(&self.value) }
    }
}

/// Evaluation context passed along with every query
pub struct QueryContext<S: ?Sized> {
    pub sources: Vec<DataSource<S>>,
}

impl<S: ?Sized> QueryContext<S> {
    pub fn single(kind: SourceKind, store: Arc<S>) -> Self {
        QueryContext { sources: vec![DataSource { kind, value: store }] }
    }
}

/// The external query engine
pub trait QueryEngine<S: ?Sized> {
    /// Evaluate `query` against the sources in `context`
    fn query(&self, query: &str, context: &QueryContext<S>) -> Result<EngineResult, EngineError>;

    /// Serialize a result into the textual format named `format`.
    ///
    /// The default delegates to the built-in serializers.
    fn result_to_string(&self, result: EngineResult, format: &str) -> Result<ByteStream, EngineError> {
        serialize::serialize(result, format)
    }
}

/// Quad pattern; `None` positions match anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuadPattern {
    pub subject: Option<Term>,
    pub predicate: Option<Term>,
    pub object: Option<Term>,
    pub graph: Option<Term>,
}

impl QuadPattern {
    pub fn matches(&self, quad: &Quad) -> bool {
        fn position(pattern: &Option<Term>, term: &Term) -> bool {
            pattern.as_ref().is_none_or(|expected| expected == term)
        }
        position(&self.subject, &quad.subject)
            && position(&self.predicate, &quad.predicate)
            && position(&self.object, &quad.object)
            && position(&self.graph, &quad.graph)
    }
}

/// Pattern-matching access to stored quads, the capability an engine needs
/// from the store
pub trait QuadStore {
    fn match_quads(&self, pattern: &QuadPattern) -> QuadStream;
}

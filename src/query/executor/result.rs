// Query Result Implementation
//
// This module defines the error and result types handed back to callers:
// the tagged result stream and its materialized form.

use std::fmt;
use std::string::FromUtf8Error;

use log::debug;
use thiserror::Error;

use crate::common::types::{Binding, Quad, Solution};
use crate::query::backend::{EngineError, EngineResult, ResultKind};
use crate::stream::drain::{drain_to_collection, drain_to_text};
use crate::stream::push::IterSource;
use crate::stream::sequence::LazySequence;

/// Failure to serialize a query result into a requested format.
///
/// Keeps the query and format apart from the underlying cause; the message
/// naming both is only rendered by `Display`.
#[derive(Error, Debug)]
#[error("Cannot serialize results of query \"{query}\" to format \"{format}\".")]
pub struct SerializationError {
    query: String,
    format: String,
    #[source]
    cause: EngineError,
}

impl SerializationError {
    pub fn new(query: impl Into<String>, format: impl Into<String>, cause: EngineError) -> Self {
        SerializationError { query: query.into(), format: format.into(), cause }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn cause(&self) -> &EngineError {
        &self.cause
    }
}

/// Represents query execution error
#[derive(Error, Debug)]
pub enum QueryError {
    /// The engine failed to evaluate the query
    #[error("Query evaluation failed: {0}")]
    Engine(#[source] EngineError),

    /// The engine returned a result kind that cannot be streamed natively
    #[error("Unsupported result type {0} from the query engine")]
    UnsupportedShape(ResultKind),

    /// The engine could not serialize the result
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// The result stream failed mid-way
    #[error("Result stream failed: {0}")]
    Source(#[source] EngineError),

    /// A source turn delivered no event
    #[error("Result stream stalled: source turn delivered no event")]
    Stalled,

    /// Serialized output is not valid UTF-8
    #[error("Serialized result is not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Engine result held by a [`QueryStream`].
///
/// Dropping the handle closes the result's push source unless the result
/// was handed out first.
#[derive(Debug)]
pub struct EngineHandle {
    kind: ResultKind,
    result: Option<EngineResult>,
}

impl EngineHandle {
    pub fn new(result: EngineResult) -> Self {
        EngineHandle { kind: result.kind(), result: Some(result) }
    }

    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    /// Whether the result's source was released without being read
    pub fn is_closed(&self) -> bool {
        self.result.is_none()
    }

    /// Take the result out; `None` once the handle was closed
    pub fn into_inner(mut self) -> Option<EngineResult> {
        self.result.take()
    }

    /// Release the push source. A boolean answer has none and is kept.
    pub fn close(&mut self) {
        if matches!(self.result, Some(EngineResult::Boolean(_)) | None) {
            return;
        }
        if let Some(mut result) = self.result.take() {
            debug!("Closing unread {} engine result", self.kind);
            result.close();
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// Tag describing which branch produced a [`QueryStream`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultTag<'a> {
    Bindings,
    Quads,
    Engine,
    Serialized(&'a str),
}

impl fmt::Display for ResultTag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultTag::Bindings => f.write_str("bindings"),
            ResultTag::Quads => f.write_str("quads"),
            ResultTag::Engine => f.write_str(crate::query::format::ENGINE_FORMAT),
            ResultTag::Serialized(format) => f.write_str(format),
        }
    }
}

/// Uniform item type across every result branch
#[derive(Debug, Clone, PartialEq)]
pub enum ResultItem {
    Solution(Solution),
    Binding(Binding),
    Quad(Quad),
    Chunk(Vec<u8>),
    Boolean(bool),
}

/// Tagged lazy result of a query
#[derive(Debug)]
pub enum QueryStream {
    /// Solutions converted to plain records, variables in projection order
    Solutions {
        variables: Vec<String>,
        items: LazySequence<Solution>,
    },
    /// Quads passed through as produced
    Quads(LazySequence<Quad>),
    /// The engine's own result, untouched
    Engine {
        result: EngineHandle,
        high_water_mark: usize,
    },
    /// Serialized output in the requested format
    Serialized {
        format: String,
        data: LazySequence<Vec<u8>>,
    },
}

impl QueryStream {
    pub fn tag(&self) -> ResultTag<'_> {
        match self {
            QueryStream::Solutions { .. } => ResultTag::Bindings,
            QueryStream::Quads(_) => ResultTag::Quads,
            QueryStream::Engine { .. } => ResultTag::Engine,
            QueryStream::Serialized { format, .. } => ResultTag::Serialized(format),
        }
    }

    /// Drain the stream: records and quads into collections, serialized
    /// output into a single string
    pub fn materialize(self) -> QueryResult<Materialized> {
        match self {
            QueryStream::Solutions { items, .. } => Ok(Materialized::Solutions(drain_to_collection(items)?)),
            QueryStream::Quads(items) => Ok(Materialized::Quads(drain_to_collection(items)?)),
            QueryStream::Serialized { data, .. } => Ok(Materialized::Text(drain_to_text(data)?)),
            QueryStream::Engine { result, high_water_mark } => {
                let kind = result.kind();
                match result.into_inner() {
                    Some(EngineResult::Bindings { stream, .. }) => Ok(Materialized::Bindings(drain_to_collection(
                        LazySequence::with_high_water_mark(stream, high_water_mark),
                    )?)),
                    Some(EngineResult::Quads(stream)) => Ok(Materialized::Quads(drain_to_collection(
                        LazySequence::with_high_water_mark(stream, high_water_mark),
                    )?)),
                    Some(EngineResult::Boolean(value)) => Ok(Materialized::Boolean(value)),
                    // Closed before draining
                    None if kind == ResultKind::Quads => Ok(Materialized::Quads(Vec::new())),
                    None => Ok(Materialized::Bindings(Vec::new())),
                }
            }
        }
    }

    /// View any branch as one sequence of [`ResultItem`]s
    pub fn into_items(self) -> LazySequence<ResultItem> {
        match self {
            QueryStream::Solutions { items, .. } => items.map_items(ResultItem::Solution),
            QueryStream::Quads(items) => items.map_items(ResultItem::Quad),
            QueryStream::Serialized { data, .. } => data.map_items(ResultItem::Chunk),
            QueryStream::Engine { result, high_water_mark } => match result.into_inner() {
                Some(EngineResult::Bindings { stream, .. }) => {
                    LazySequence::with_high_water_mark(stream, high_water_mark).map_items(ResultItem::Binding)
                }
                Some(EngineResult::Quads(stream)) => {
                    LazySequence::with_high_water_mark(stream, high_water_mark).map_items(ResultItem::Quad)
                }
                Some(EngineResult::Boolean(value)) => {
                    LazySequence::from_source(IterSource::from_items([ResultItem::Boolean(value)]))
                }
                None => LazySequence::from_source(IterSource::from_items(Vec::new())),
            },
        }
    }

    pub fn into_solutions(self) -> Option<LazySequence<Solution>> {
        match self {
            QueryStream::Solutions { items, .. } => Some(items),
            _ => None,
        }
    }

    pub fn into_quads(self) -> Option<LazySequence<Quad>> {
        match self {
            QueryStream::Quads(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<LazySequence<Vec<u8>>> {
        match self {
            QueryStream::Serialized { data, .. } => Some(data),
            _ => None,
        }
    }

    /// The engine's result, if this is the engine branch and it was not
    /// closed. The caller takes over releasing its source.
    pub fn into_engine_result(self) -> Option<EngineResult> {
        match self {
            QueryStream::Engine { result, .. } => result.into_inner(),
            _ => None,
        }
    }

    /// Release the underlying source without draining it
    pub fn close(&mut self) {
        match self {
            QueryStream::Solutions { items, .. } => items.close(),
            QueryStream::Quads(items) => items.close(),
            QueryStream::Serialized { data, .. } => data.close(),
            QueryStream::Engine { result, .. } => result.close(),
        }
    }
}

/// Fully drained query result
#[derive(Debug, Clone, PartialEq)]
pub enum Materialized {
    Solutions(Vec<Solution>),
    Quads(Vec<Quad>),
    Bindings(Vec<Binding>),
    Boolean(bool),
    Text(String),
}

impl Materialized {
    pub fn into_solutions(self) -> Option<Vec<Solution>> {
        match self {
            Materialized::Solutions(solutions) => Some(solutions),
            _ => None,
        }
    }

    pub fn into_quads(self) -> Option<Vec<Quad>> {
        match self {
            Materialized::Quads(quads) => Some(quads),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Materialized::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Number of materialized items; text and boolean results count as one
    pub fn len(&self) -> usize {
        match self {
            Materialized::Solutions(solutions) => solutions.len(),
            Materialized::Quads(quads) => quads.len(),
            Materialized::Bindings(bindings) => bindings.len(),
            Materialized::Boolean(_) | Materialized::Text(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

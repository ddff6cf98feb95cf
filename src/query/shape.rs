// Result Shape Normalization
//
// Classifies an engine result and wraps its push source in a lazy sequence
// tagged with the shape.

use std::fmt;

use crate::common::types::{Binding, Quad};
use crate::query::backend::EngineResult;
use crate::query::executor::result::{QueryError, QueryResult};
use crate::stream::sequence::LazySequence;

/// Result shapes the facade knows how to stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Bindings,
    Quads,
}

impl Shape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Bindings => "bindings",
            Shape::Quads => "quads",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine result wrapped as a lazy sequence, tagged by shape
#[derive(Debug)]
pub enum NormalizedResult {
    Bindings {
        variables: Vec<String>,
        items: LazySequence<Binding>,
    },
    Quads(LazySequence<Quad>),
}

impl NormalizedResult {
    pub fn shape(&self) -> Shape {
        match self {
            NormalizedResult::Bindings { .. } => Shape::Bindings,
            NormalizedResult::Quads(_) => Shape::Quads,
        }
    }
}

/// Wrap the engine result's source, rejecting shapes that cannot be streamed
pub fn normalize(result: EngineResult, high_water_mark: usize) -> QueryResult<NormalizedResult> {
    match result {
        EngineResult::Bindings { variables, stream } => Ok(NormalizedResult::Bindings {
            variables,
            items: LazySequence::with_high_water_mark(stream, high_water_mark),
        }),
        EngineResult::Quads(stream) => Ok(NormalizedResult::Quads(
            LazySequence::with_high_water_mark(stream, high_water_mark),
        )),
        unsupported @ EngineResult::Boolean(_) => Err(QueryError::UnsupportedShape(unsupported.kind())),
    }
}

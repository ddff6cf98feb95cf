// quadsparql
//
// Query facade that runs query strings through an external engine against a
// pluggable quad store and streams the results with backpressure.

pub mod common;
pub mod query;
pub mod serialize;
pub mod stream;

// Re-export key items for convenient access
pub use common::types::{Binding, Quad, Solution, Term};
pub use query::backend::{
    DataSource, EngineError, EngineResult, QuadPattern, QuadStore, QueryContext, QueryEngine, ResultKind, SourceKind,
};
pub use query::executor::engine::{EngineConfig, SparqlEngine};
pub use query::executor::result::{Materialized, QueryError, QueryResult, QueryStream, ResultItem, ResultTag};
pub use query::format::Format;
pub use stream::{drain_to_collection, drain_to_text, Flow, IterSource, LazySequence, PushSource, SourceEvent};

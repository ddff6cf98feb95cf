// Query Processing Module
//
// Engine collaborator interfaces, result shape normalization, format
// resolution and the execution facade.

pub mod backend;
pub mod shape;
pub mod format;
pub mod executor;

pub use backend::{EngineError, EngineResult, QueryEngine, QuadStore};
pub use executor::engine::SparqlEngine;
pub use executor::result::{QueryError, QueryResult, QueryStream};
pub use format::Format;

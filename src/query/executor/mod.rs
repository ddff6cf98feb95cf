// Query Executor Module
//
// The facade that runs queries through the external engine, plus the result
// and error types it returns.

pub mod engine;
pub mod result;

pub use self::engine::{EngineConfig, SparqlEngine};
pub use self::result::{EngineHandle, Materialized, QueryError, QueryResult, QueryStream, ResultItem, ResultTag, SerializationError};

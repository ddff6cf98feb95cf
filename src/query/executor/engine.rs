// Query Execution Facade
//
// Submits query strings to the external engine against the configured store
// and adapts the engine's result into a tagged lazy stream or a materialized
// value.

use std::sync::Arc;

use log::debug;

use crate::query::backend::{QueryContext, QueryEngine, SourceKind};
use crate::query::executor::result::{Materialized, QueryError, QueryResult, QueryStream};
use crate::query::format::{self, Format};
use crate::stream::sequence::DEFAULT_HIGH_WATER_MARK;

/// Configuration for the query facade
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Items a result sequence keeps ready before pausing its source
    pub high_water_mark: usize,

    /// Kind of the single source descriptor handed to the engine
    pub source_kind: SourceKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
            source_kind: SourceKind::RdfjsSource,
        }
    }
}

impl EngineConfig {
    pub fn with_high_water_mark(mut self, high_water_mark: usize) -> Self {
        self.high_water_mark = high_water_mark.max(1);
        self
    }

    pub fn with_source_kind(mut self, source_kind: SourceKind) -> Self {
        self.source_kind = source_kind;
        self
    }
}

/// Query facade over an external engine and the store it reads from.
///
/// Holds no state between queries besides the engine and the store.
pub struct SparqlEngine<E, S: ?Sized> {
    engine: E,
    store: Arc<S>,
    config: EngineConfig,
}

impl<E, S> SparqlEngine<E, S>
where
    E: QueryEngine<S>,
    S: ?Sized,
{
    pub fn new(engine: E, store: Arc<S>) -> Self {
        Self::with_config(engine, store, EngineConfig::default())
    }

    pub fn with_config(engine: E, store: Arc<S>, config: EngineConfig) -> Self {
        SparqlEngine { engine, store, config }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run a query and return its result as a tagged lazy stream
    pub fn query_stream(&self, query: &str, format: impl Into<Format>) -> QueryResult<QueryStream> {
        let format = format.into();
        debug!("Executing query ({} format): {}", format, query);

        let context = QueryContext::single(self.config.source_kind, Arc::clone(&self.store));
        let result = self.engine.query(query, &context).map_err(QueryError::Engine)?;

        format::dispatch::<E, S>(&self.engine, query, result, &format, self.config.high_water_mark)
    }

    /// Run a query and drain its result.
    ///
    /// Bindings and quads come back as collections, serialized formats as a
    /// single string.
    pub fn query(&self, query: &str, format: impl Into<Format>) -> QueryResult<Materialized> {
        self.query_stream(query, format)?.materialize()
    }

    /// Callback form of [`query_stream`](Self::query_stream)
    pub fn query_stream_with<F>(&self, query: &str, format: impl Into<Format>, callback: F)
    where
        F: FnOnce(QueryResult<QueryStream>),
    {
        callback(self.query_stream(query, format))
    }

    /// Callback form of [`query`](Self::query)
    pub fn query_with<F>(&self, query: &str, format: impl Into<Format>, callback: F)
    where
        F: FnOnce(QueryResult<Materialized>),
    {
        callback(self.query(query, format))
    }
}

// Output Format Resolution
//
// Decides what a caller gets back: the native shape (bindings converted to
// plain records), the engine's own result object, or the result serialized
// by the engine into a named textual format.

use std::fmt;

use log::debug;

use crate::common::types::Solution;
use crate::query::backend::{EngineResult, QueryEngine};
use crate::query::executor::result::{EngineHandle, QueryResult, QueryStream, SerializationError};
use crate::query::shape::{self, NormalizedResult};
use crate::stream::sequence::LazySequence;

/// Format name that returns the engine's result untouched
pub const ENGINE_FORMAT: &str = "engine";

/// Requested output format
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Format {
    /// Native shape: records for bindings, quads as they are
    #[default]
    Native,
    /// The engine's result object, unchanged
    Engine,
    /// Serialized output in the named format
    Serialized(String),
}

impl Format {
    /// Parse an optional format name; missing or empty names mean native
    pub fn parse(name: Option<&str>) -> Self {
        match name {
            None | Some("") => Format::Native,
            Some(ENGINE_FORMAT) => Format::Engine,
            Some(other) => Format::Serialized(other.to_string()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Format::Native => None,
            Format::Engine => Some(ENGINE_FORMAT),
            Format::Serialized(name) => Some(name),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("native"))
    }
}

impl From<&str> for Format {
    fn from(name: &str) -> Self {
        Format::parse(Some(name))
    }
}

impl From<String> for Format {
    fn from(name: String) -> Self {
        Format::parse(Some(&name))
    }
}

impl From<Option<&str>> for Format {
    fn from(name: Option<&str>) -> Self {
        Format::parse(name)
    }
}

/// Resolve an engine result into the stream shape asked for by `format`.
///
/// Serialization always starts from the engine's original result, and a
/// failure is wrapped with the query and format it was attempted for.
pub fn dispatch<E, S>(
    engine: &E,
    query: &str,
    result: EngineResult,
    format: &Format,
    high_water_mark: usize,
) -> QueryResult<QueryStream>
where
    E: QueryEngine<S> + ?Sized,
    S: ?Sized,
{
    debug!("Resolving {} result as {}", result.kind(), format);
    match format {
        Format::Native => {
            let normalized = shape::normalize(result, high_water_mark)?;
            debug!("Streaming {} natively", normalized.shape());
            match normalized {
                NormalizedResult::Bindings { variables, items } => Ok(QueryStream::Solutions {
                    variables,
                    items: items.map_items(Solution::from),
                }),
                NormalizedResult::Quads(items) => Ok(QueryStream::Quads(items)),
            }
        }
        Format::Engine => Ok(QueryStream::Engine { result: EngineHandle::new(result), high_water_mark }),
        Format::Serialized(name) => {
            let data = engine
                .result_to_string(result, name)
                .map_err(|cause| SerializationError::new(query, name.as_str(), cause))?;
            Ok(QueryStream::Serialized {
                format: name.clone(),
                data: LazySequence::with_high_water_mark(data, high_water_mark),
            })
        }
    }
}

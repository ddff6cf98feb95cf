// Result Serialization
//
// Built-in textual formats an engine can delegate `result_to_string` to.
// Every serializer is itself a push source, so output is produced chunk by
// chunk as the consumer pulls.

pub mod nquads;
pub mod sparql_json;
pub mod writer;

use crate::query::backend::{ByteStream, EngineError, EngineResult};
use crate::stream::push::IterSource;

use self::nquads::NQuadsWriter;
use self::sparql_json::SparqlJsonWriter;
use self::writer::SerializingSource;

/// SPARQL 1.1 Query Results JSON
pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// N-Quads
pub const N_QUADS: &str = "application/n-quads";

/// N-Triples
pub const N_TRIPLES: &str = "application/n-triples";

/// Serialize an engine result into `format`.
///
/// Fails with [`EngineError::UnsupportedFormat`] for unknown formats and for
/// formats that do not fit the result kind.
pub fn serialize(result: EngineResult, format: &str) -> Result<ByteStream, EngineError> {
    match (format, result) {
        (SPARQL_RESULTS_JSON, EngineResult::Bindings { variables, stream }) => {
            Ok(Box::new(SerializingSource::new(stream, SparqlJsonWriter::new(variables))))
        }
        (SPARQL_RESULTS_JSON, EngineResult::Boolean(value)) => {
            Ok(Box::new(IterSource::from_items([sparql_json::boolean_document(value)?])))
        }
        (N_QUADS, EngineResult::Quads(stream)) => Ok(Box::new(SerializingSource::new(stream, NQuadsWriter::quads()))),
        (N_TRIPLES, EngineResult::Quads(stream)) => {
            Ok(Box::new(SerializingSource::new(stream, NQuadsWriter::triples())))
        }
        (format, mut result) => {
            result.close();
            Err(EngineError::UnsupportedFormat { format: format.to_string(), kind: result.kind() })
        }
    }
}

// N-Quads / N-Triples Writer
//
// One line per quad. N-Triples output drops the graph component; quads in
// the default graph are written without one in both formats.

use crate::common::types::Quad;
use crate::query::backend::EngineError;
use crate::serialize::writer::ChunkWriter;

/// Line-based writer for quad results
pub struct NQuadsWriter {
    with_graph: bool,
}

impl NQuadsWriter {
    pub fn quads() -> Self {
        NQuadsWriter { with_graph: true }
    }

    pub fn triples() -> Self {
        NQuadsWriter { with_graph: false }
    }
}

impl ChunkWriter<Quad> for NQuadsWriter {
    fn header(&mut self) -> Result<Vec<u8>, EngineError> {
        Ok(Vec::new())
    }

    fn write(&mut self, quad: Quad) -> Result<Vec<u8>, EngineError> {
        let line = if self.with_graph && !quad.graph.is_default_graph() {
            format!("{} {} {} {} .\n", quad.subject, quad.predicate, quad.object, quad.graph)
        } else {
            format!("{} {} {} .\n", quad.subject, quad.predicate, quad.object)
        };
        Ok(line.into_bytes())
    }

    fn trailer(&mut self) -> Vec<u8> {
        Vec::new()
    }
}

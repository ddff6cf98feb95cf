// SPARQL Results JSON Writer
//
// Streams SELECT-style solutions as a `head.vars` / `results.bindings`
// document. The header carries the projected variables without their `?`,
// each solution becomes one chunk, and unbound variables are left out of
// their solution object. Literals carry `xml:lang` when tagged and
// `datatype` unless they are plain `xsd:string`.

use serde_json::{json, Map, Value as JsonValue};

use crate::common::types::{Binding, Term, XSD_STRING};
use crate::query::backend::EngineError;
use crate::serialize::writer::ChunkWriter;

/// Streaming writer for SELECT-style results
pub struct SparqlJsonWriter {
    variables: Vec<String>,
    first: bool,
}

impl SparqlJsonWriter {
    pub fn new(variables: Vec<String>) -> Self {
        SparqlJsonWriter { variables, first: true }
    }
}

impl ChunkWriter<Binding> for SparqlJsonWriter {
    fn header(&mut self) -> Result<Vec<u8>, EngineError> {
        let vars: Vec<&str> = self.variables.iter().map(|name| strip_question_mark(name)).collect();
        let head = serde_json::to_string(&json!({ "vars": vars }))?;
        Ok(format!("{{\"head\":{},\"results\":{{\"bindings\":[", head).into_bytes())
    }

    fn write(&mut self, binding: Binding) -> Result<Vec<u8>, EngineError> {
        let mut object = Map::new();
        for (variable, term) in binding.iter() {
            if let Some(value) = format_term(term) {
                object.insert(strip_question_mark(variable).to_string(), value);
            }
        }

        let mut chunk = if self.first { Vec::new() } else { b",".to_vec() };
        self.first = false;
        serde_json::to_writer(&mut chunk, &JsonValue::Object(object))?;
        Ok(chunk)
    }

    fn trailer(&mut self) -> Vec<u8> {
        b"]}}".to_vec()
    }
}

/// Complete document for an ASK-style answer
pub fn boolean_document(value: bool) -> Result<Vec<u8>, EngineError> {
    Ok(serde_json::to_vec(&json!({ "head": {}, "boolean": value }))?)
}

fn strip_question_mark(name: &str) -> &str {
    name.strip_prefix('?').unwrap_or(name)
}

/// Format a single term; `None` for terms with no SPARQL JSON form
fn format_term(term: &Term) -> Option<JsonValue> {
    match term {
        Term::NamedNode { value } => Some(json!({ "type": "uri", "value": value })),
        Term::BlankNode { value } => Some(json!({ "type": "bnode", "value": value })),
        Term::Literal { value, language: Some(lang), .. } => {
            Some(json!({ "type": "literal", "value": value, "xml:lang": lang }))
        }
        Term::Literal { value, datatype, .. } if datatype == XSD_STRING => {
            Some(json!({ "type": "literal", "value": value }))
        }
        Term::Literal { value, datatype, .. } => {
            Some(json!({ "type": "literal", "value": value, "datatype": datatype }))
        }
        Term::DefaultGraph => None,
    }
}

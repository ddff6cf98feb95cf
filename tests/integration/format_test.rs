use std::error::Error;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use quadsparql::query::backend::{ByteStream, EngineError, EngineResult, QuadPattern, QueryContext, QueryEngine};
use quadsparql::serialize::{self, N_QUADS, N_TRIPLES, SPARQL_RESULTS_JSON};
use quadsparql::{drain_to_text, IterSource, QueryError, QueryResult, ResultKind, ResultTag, SparqlEngine, Term};
use serde_json::{json, Value};

#[path = "../common/mod.rs"]
mod common;
use common::{
    ex, matching, quad, spog_bindings, spog_result, tracked_engine, MemoryStore, ScriptedEngine, SourceStats,
};

const ALL_GRAPHS: &str = "SELECT *  WHERE { GRAPH ?g { ?s ?p ?o } }";
const CONSTRUCT_ALL: &str = "CONSTRUCT { ?s ?p ?o } WHERE { GRAPH ?g { ?s ?p ?o } }";
const ASK_ANY: &str = "ASK { ?s ?p ?o }";

fn scripted() -> ScriptedEngine {
    ScriptedEngine::new()
        .on(ALL_GRAPHS, |store| Ok(spog_result(spog_bindings(matching(store, &QuadPattern::default())))))
        .on(CONSTRUCT_ALL, |store| {
            let quads = matching(store, &QuadPattern::default());
            Ok(EngineResult::Quads(Box::new(IterSource::from_items(quads))))
        })
        .on(ASK_ANY, |store| Ok(EngineResult::Boolean(store.len() > 0)))
}

fn setup<E: QueryEngine<MemoryStore>>(engine: E) -> SparqlEngine<E, MemoryStore> {
    let store = MemoryStore::new();
    store.put(vec![
        quad(ex("s1"), ex("p1"), ex("o1"), ex("g1")),
        quad(ex("s2"), ex("p2"), Term::literal("two"), ex("g2")),
        quad(ex("s3"), ex("p3"), Term::lang_literal("drei", "de"), ex("g3")),
    ]);
    SparqlEngine::new(engine, Arc::new(store))
}

fn text_of(engine: &SparqlEngine<impl QueryEngine<MemoryStore>, MemoryStore>, query: &str, format: &str) -> Result<String> {
    engine
        .query(query, format)?
        .into_text()
        .ok_or_else(|| anyhow!("expected text for {}", format))
}

#[test]
fn test_sparql_json_document() -> Result<()> {
    let engine = setup(scripted());
    let text = text_of(&engine, ALL_GRAPHS, SPARQL_RESULTS_JSON)?;
    let document: Value = serde_json::from_str(&text)?;

    assert_eq!(document["head"]["vars"], json!(["s", "p", "o", "g"]));
    let bindings = document["results"]["bindings"]
        .as_array()
        .ok_or_else(|| anyhow!("bindings should be an array"))?;
    assert_eq!(bindings.len(), 3);
    assert_eq!(
        bindings[0],
        json!({
            "s": { "type": "uri", "value": "http://ex.com/s1" },
            "p": { "type": "uri", "value": "http://ex.com/p1" },
            "o": { "type": "uri", "value": "http://ex.com/o1" },
            "g": { "type": "uri", "value": "http://ex.com/g1" }
        })
    );
    assert_eq!(bindings[1]["o"], json!({ "type": "literal", "value": "two" }));
    assert_eq!(bindings[2]["o"], json!({ "type": "literal", "value": "drei", "xml:lang": "de" }));
    Ok(())
}

#[test]
fn test_serialized_stream_is_tagged_with_format() -> Result<()> {
    let engine = setup(scripted());
    let stream = engine.query_stream(ALL_GRAPHS, SPARQL_RESULTS_JSON)?;
    assert_eq!(stream.tag(), ResultTag::Serialized(SPARQL_RESULTS_JSON));
    assert_eq!(stream.tag().to_string(), SPARQL_RESULTS_JSON);
    Ok(())
}

#[test]
fn test_closing_serialized_stream_releases_engine_source() -> Result<()> {
    let stats = Rc::new(SourceStats::default());
    let engine = setup(tracked_engine(ALL_GRAPHS, stats.clone()));

    let mut stream = engine.query_stream(ALL_GRAPHS, SPARQL_RESULTS_JSON)?;
    stream.close();
    assert!(stats.closed.get());
    assert!(!stats.ended.get());
    Ok(())
}

#[test]
fn test_dropping_serialized_stream_releases_engine_source() -> Result<()> {
    let stats = Rc::new(SourceStats::default());
    let engine = setup(tracked_engine(ALL_GRAPHS, stats.clone()));

    let mut data = engine
        .query_stream(ALL_GRAPHS, SPARQL_RESULTS_JSON)?
        .into_data()
        .ok_or_else(|| anyhow!("expected serialized data"))?;
    // Header only; no solution read yet
    assert!(data.pull()?.is_some());
    drop(data);
    assert!(stats.closed.get());
    assert_eq!(stats.emitted.get(), 0);
    Ok(())
}

#[test]
fn test_closing_engine_stream_releases_source() -> Result<()> {
    let stats = Rc::new(SourceStats::default());
    let engine = setup(tracked_engine(ALL_GRAPHS, stats.clone()));

    let mut stream = engine.query_stream(ALL_GRAPHS, "engine")?;
    assert_eq!(stream.tag(), ResultTag::Engine);
    stream.close();
    assert!(stats.closed.get());
    // Nothing left to hand out
    assert!(stream.into_engine_result().is_none());
    Ok(())
}

#[test]
fn test_dropping_engine_stream_releases_source() -> Result<()> {
    let stats = Rc::new(SourceStats::default());
    let engine = setup(tracked_engine(ALL_GRAPHS, stats.clone()));

    let stream = engine.query_stream(ALL_GRAPHS, "engine")?;
    drop(stream);
    assert!(stats.closed.get());
    assert_eq!(stats.turns.get(), 0);
    Ok(())
}

#[test]
fn test_drained_engine_stream_is_not_closed() -> Result<()> {
    let stats = Rc::new(SourceStats::default());
    let engine = setup(tracked_engine(ALL_GRAPHS, stats.clone()));

    let items = engine.query(ALL_GRAPHS, "engine")?;
    assert_eq!(items.len(), 3);
    assert!(stats.ended.get());
    assert!(!stats.closed.get());
    Ok(())
}

#[test]
fn test_serialized_output_arrives_in_chunks() -> Result<()> {
    let engine = setup(scripted());
    let data = engine
        .query_stream(ALL_GRAPHS, SPARQL_RESULTS_JSON)?
        .into_data()
        .ok_or_else(|| anyhow!("expected serialized data"))?;

    let chunks: Vec<Vec<u8>> = data.collect::<QueryResult<_>>()?;
    // Header, one chunk per solution, trailer
    assert_eq!(chunks.len(), 5);
    let joined = String::from_utf8(chunks.concat())?;
    assert!(joined.starts_with("{\"head\":"));
    assert!(joined.ends_with("]}}"));
    Ok(())
}

#[test]
fn test_n_quads_output() -> Result<()> {
    let engine = setup(scripted());
    let text = text_of(&engine, CONSTRUCT_ALL, N_QUADS)?;

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "<http://ex.com/s1> <http://ex.com/p1> <http://ex.com/o1> <http://ex.com/g1> .",
            "<http://ex.com/s2> <http://ex.com/p2> \"two\" <http://ex.com/g2> .",
            "<http://ex.com/s3> <http://ex.com/p3> \"drei\"@de <http://ex.com/g3> .",
        ]
    );
    Ok(())
}

#[test]
fn test_n_triples_output_drops_graphs() -> Result<()> {
    let engine = setup(scripted());
    let text = text_of(&engine, CONSTRUCT_ALL, N_TRIPLES)?;

    assert_eq!(text.lines().count(), 3);
    assert!(text.lines().all(|line| line.matches("http://ex.com/g").count() == 0));
    Ok(())
}

#[test]
fn test_boolean_as_sparql_json() -> Result<()> {
    let engine = setup(scripted());
    let document: Value = serde_json::from_str(&text_of(&engine, ASK_ANY, SPARQL_RESULTS_JSON)?)?;
    assert_eq!(document["boolean"], json!(true));
    Ok(())
}

#[test]
fn test_unsupported_format_is_wrapped() {
    let engine = setup(scripted());
    let err = match engine.query_stream(ALL_GRAPHS, "text/turtle") {
        Err(err) => err,
        Ok(stream) => panic!("expected serialization failure, got {}", stream.tag()),
    };

    assert_eq!(
        err.to_string(),
        "Cannot serialize results of query \"SELECT *  WHERE { GRAPH ?g { ?s ?p ?o } }\" to format \"text/turtle\"."
    );
    match &err {
        QueryError::Serialization(inner) => {
            assert_eq!(inner.query(), ALL_GRAPHS);
            assert_eq!(inner.format(), "text/turtle");
            match inner.cause() {
                EngineError::UnsupportedFormat { format, kind } => {
                    assert_eq!(format, "text/turtle");
                    assert_eq!(*kind, ResultKind::Bindings);
                }
                other => panic!("unexpected cause {}", other),
            }
        }
        other => panic!("unexpected error {}", other),
    }
    assert!(err.source().is_some());
}

#[test]
fn test_format_mismatch_is_wrapped() {
    let engine = setup(scripted());
    let result = engine.query(CONSTRUCT_ALL, SPARQL_RESULTS_JSON);
    assert!(matches!(
        result,
        Err(QueryError::Serialization(ref inner))
            if matches!(inner.cause(), EngineError::UnsupportedFormat { kind: ResultKind::Quads, .. })
    ));
}

#[test]
fn test_query_failure_is_not_a_serialization_error() {
    let engine = setup(scripted());
    let result = engine.query("SELECT ?nothing WHERE {}", N_QUADS);
    assert!(matches!(result, Err(QueryError::Engine(EngineError::Query(_)))));
}

/// Engine adding its own plain-text format on top of the built-in ones
struct PlainTextEngine {
    inner: ScriptedEngine,
}

const PLAIN_TEXT: &str = "text/plain";

impl QueryEngine<MemoryStore> for PlainTextEngine {
    fn query(&self, query: &str, context: &QueryContext<MemoryStore>) -> Result<EngineResult, EngineError> {
        self.inner.query(query, context)
    }

    fn result_to_string(&self, result: EngineResult, format: &str) -> Result<ByteStream, EngineError> {
        match (format, result) {
            (PLAIN_TEXT, EngineResult::Boolean(value)) => {
                Ok(Box::new(IterSource::from_items([if value { b"yes".to_vec() } else { b"no".to_vec() }])))
            }
            (_, result) => serialize::serialize(result, format),
        }
    }
}

#[test]
fn test_engine_defined_format() -> Result<()> {
    let engine = setup(PlainTextEngine { inner: scripted() });

    assert_eq!(text_of(&engine, ASK_ANY, PLAIN_TEXT)?, "yes");
    // Built-in formats stay available
    let document: Value = serde_json::from_str(&text_of(&engine, ALL_GRAPHS, SPARQL_RESULTS_JSON)?)?;
    assert_eq!(document["results"]["bindings"].as_array().map(Vec::len), Some(3));
    // Unknown to both the engine and the built-ins
    assert!(matches!(engine.query(ALL_GRAPHS, PLAIN_TEXT), Err(QueryError::Serialization(_))));
    Ok(())
}

#[test]
fn test_drain_serialized_stream() -> Result<()> {
    let engine = setup(scripted());
    let data = engine
        .query_stream(CONSTRUCT_ALL, N_TRIPLES)?
        .into_data()
        .ok_or_else(|| anyhow!("expected serialized data"))?;

    let text = drain_to_text(data)?;
    assert!(text.starts_with("<http://ex.com/s1> <http://ex.com/p1> <http://ex.com/o1> ."));
    Ok(())
}

//! WASM bindings for poetry-engine, powering the browser demo.

use wasm_bindgen::prelude::*;

use poetry_engine::core::cleaner::clean_source_text;
use poetry_engine::core::pipeline::PoetryEngine;
use poetry_engine::schema::poem::{parse_line_count, PoemConfig, PoemKind};

// ---------------------------------------------------------------------------
// Embedded corpora, compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const POE_CORPUS: &str = include_str!("../../corpora/poe.txt");

    pub const SOURCES: &[(&str, &str)] = &[("poe", POE_CORPUS)];
}

#[derive(serde::Serialize)]
struct PoemOutput {
    kind: String,
    source: String,
    lines: Vec<String>,
}

fn build_config(kind: &str, length: &str, source: &str) -> Result<PoemConfig, JsError> {
    let kind: PoemKind = kind
        .parse()
        .map_err(|e| JsError::new(&format!("Invalid poem kind: {e}")))?;
    match kind {
        PoemKind::Haiku => Ok(PoemConfig::haiku(source)),
        PoemKind::FreeForm => parse_line_count(length)
            .map(|n| PoemConfig::free_form(n, source))
            .map_err(|e| JsError::new(&format!("Invalid poem length: {e}"))),
    }
}

// ---------------------------------------------------------------------------
// PoemDemo: the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct PoemDemo {
    engine: PoetryEngine,
    source: String,
}

#[wasm_bindgen]
impl PoemDemo {
    /// Create a new demo instance drawing from the embedded Poe corpus.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Result<PoemDemo, JsError> {
        let mut builder = PoetryEngine::builder().seed(seed);
        for (id, text) in data::SOURCES {
            builder = builder.with_corpus(id, &clean_source_text(text));
        }
        let engine = builder
            .build()
            .map_err(|e| JsError::new(&format!("Engine build error: {e}")))?;

        Ok(PoemDemo {
            engine,
            source: "poe".to_string(),
        })
    }

    /// Compose a poem and return its text.
    ///
    /// `kind` is "haiku" or "free-form"; `length` is "short", "medium",
    /// "long", or a line count, and is ignored for haiku.
    pub fn compose(&mut self, kind: &str, length: &str) -> Result<String, JsError> {
        let config = build_config(kind, length, &self.source)?;
        self.engine
            .compose(&config)
            .map(|poem| poem.to_string())
            .map_err(|e| JsError::new(&format!("Composition error: {e}")))
    }

    /// Compose several poems. Returns a JSON array of `{kind, source, lines}`.
    pub fn compose_variants(
        &mut self,
        kind: &str,
        length: &str,
        count: usize,
    ) -> Result<String, JsError> {
        let config = build_config(kind, length, &self.source)?;
        let poems = self
            .engine
            .compose_variants(&config, count)
            .map_err(|e| JsError::new(&format!("Composition error: {e}")))?;
        let output: Vec<PoemOutput> = poems
            .into_iter()
            .map(|poem| PoemOutput {
                kind: config.kind.to_string(),
                source: config.source.clone(),
                lines: poem.lines,
            })
            .collect();
        serde_json::to_string(&output)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Switch the corpus later poems draw from.
    pub fn set_source(&mut self, source: &str) -> Result<(), JsError> {
        if self.engine.corpus(source).is_none() {
            return Err(JsError::new(&format!("Unknown source: {source}")));
        }
        self.source = source.to_string();
        Ok(())
    }

    /// Return JSON array of embedded corpus identifiers.
    pub fn available_sources() -> String {
        let ids: Vec<&str> = data::SOURCES.iter().map(|(id, _)| *id).collect();
        serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
    }

    /// Return JSON array of poem kinds.
    pub fn kinds() -> String {
        serde_json::to_string(&["haiku", "free-form"]).unwrap_or_else(|_| "[]".to_string())
    }

    /// Return JSON array of named lengths.
    pub fn lengths() -> String {
        serde_json::to_string(&["short", "medium", "long"]).unwrap_or_else(|_| "[]".to_string())
    }

    /// Reset the engine with a new seed (same source).
    pub fn reset(&mut self, seed: u64) {
        self.engine.reseed(seed);
    }
}

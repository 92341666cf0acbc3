//! WASM bindings for maze-rats-lab — powers the web lab page.
//!
//! Results cross the boundary as JSON strings, shaped exactly like the
//! output of the `generate` tool.

use wasm_bindgen::prelude::*;

use maze_rats_lab::core::composer::Generator;
use maze_rats_lab::core::random::SeededSource;
use maze_rats_lab::schema::value::Tree;

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct LabInfo<'a> {
    domains: Vec<&'a str>,
    locales: Vec<&'a str>,
    default_locale: &'a str,
    seed: u64,
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}

/// Largest batch `generate_batch` will produce in one call.
pub const MAX_BATCH: usize = 1000;

// ---------------------------------------------------------------------------
// MazeRatsLab — the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct MazeRatsLab {
    generator: Generator,
    source: SeededSource,
}

#[wasm_bindgen]
impl MazeRatsLab {
    /// Create a lab over the bundled tables. Every call draws from one
    /// stream seeded here, so a page reload with the same seed replays the
    /// same sequence of results.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Result<MazeRatsLab, JsError> {
        let generator =
            Generator::bundled().map_err(|e| JsError::new(&format!("Generator build error: {e}")))?;
        Ok(MazeRatsLab {
            generator,
            source: SeededSource::new(seed),
        })
    }

    /// Generate one result for `domain` as a JSON object.
    pub fn generate(&mut self, domain: &str, locale: &str) -> Result<String, JsError> {
        let tree = self.next(domain, locale)?;
        to_json(&tree)
    }

    pub fn character(&mut self, locale: &str) -> Result<String, JsError> {
        self.generate("character", locale)
    }

    pub fn spell(&mut self, locale: &str) -> Result<String, JsError> {
        self.generate("spell", locale)
    }

    /// Generate `count` results, at most `MAX_BATCH`. Returns a JSON array
    /// of objects.
    pub fn generate_batch(
        &mut self,
        domain: &str,
        locale: &str,
        count: usize,
    ) -> Result<String, JsError> {
        let results = self.batch(domain, locale, count).map_err(|e| JsError::new(&e))?;
        to_json(&results)
    }

    /// Restart the stream from a new seed.
    pub fn reseed(&mut self, seed: u64) {
        self.source = SeededSource::new(seed);
    }

    /// Return a JSON description of the available domains and locales.
    pub fn info(&self) -> Result<String, JsError> {
        let locales = self.generator.locales();
        let info = LabInfo {
            domains: self.generator.domains().map(|d| d.name.as_str()).collect(),
            locales: locales.tags(),
            default_locale: locales.default_bundle().tag(),
            seed: self.source.seed(),
        };
        to_json(&info)
    }
}

impl MazeRatsLab {
    fn batch(&mut self, domain: &str, locale: &str, count: usize) -> Result<Vec<Tree>, String> {
        if count > MAX_BATCH {
            return Err(format!("Batch of {count} exceeds the limit of {MAX_BATCH}"));
        }
        let mut results = Vec::new();
        for _ in 0..count {
            let tree = self
                .generator
                .generate(domain, locale, &mut self.source)
                .map_err(|e| format!("Generation error: {e}"))?;
            results.push(tree);
        }
        Ok(results)
    }

    fn next(&mut self, domain: &str, locale: &str) -> Result<Tree, JsError> {
        self.generator
            .generate(domain, locale, &mut self.source)
            .map_err(|e| JsError::new(&format!("Generation error: {e}")))
    }
}

/// One-shot seeded generation without keeping a lab around.
#[wasm_bindgen]
pub fn generate_seeded(domain: &str, locale: &str, seed: u64) -> Result<String, JsError> {
    let generator =
        Generator::bundled().map_err(|e| JsError::new(&format!("Generator build error: {e}")))?;
    let tree = generator
        .generate_seeded(domain, locale, seed)
        .map_err(|e| JsError::new(&format!("Generation error: {e}")))?;
    to_json(&tree)
}

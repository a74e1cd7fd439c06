//! Offline embeddings from hashed word and character-trigram features.

use crate::embeddings::config::TRIGRAM_MODEL;
use crate::embeddings::provider::{normalize_in_place, EmbeddingProvider};
use catalog_qa_core::AppResult;
use std::collections::HashMap;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have", "in",
    "is", "it", "its", "of", "on", "or", "that", "the", "this", "to", "was", "were", "with",
];

/// Weight of one trigram relative to a whole-word match.
const TRIGRAM_WEIGHT: f32 = 0.3;

/// Deterministic feature-hashing embedder.
///
/// Needs no network or model download, so it backs tests and offline
/// demos. Texts sharing words (or word fragments) land close together.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
}

impl TrigramProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];

        let mut term_freq: HashMap<String, u32> = HashMap::new();
        for token in tokenize(text) {
            *term_freq.entry(token).or_insert(0) += 1;
        }

        for (term, freq) in &term_freq {
            let weight = 1.0 + (*freq as f32).ln();

            embedding[self.bucket(term.as_bytes())] += weight;

            let padded: Vec<char> = format!("#{}#", term).chars().collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                embedding[self.bucket(trigram.as_bytes())] += weight * TRIGRAM_WEIGHT;
            }
        }

        normalize_in_place(&mut embedding);
        embedding
    }

    fn bucket(&self, feature: &[u8]) -> usize {
        (fnv1a(feature) % self.dimensions as u64) as usize
    }
}

/// Lowercased alphanumeric runs, minus stop words and single characters.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > 1)
        .map(str::to_lowercase)
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf29ce484222325_u64, |hash, b| {
        (hash ^ *b as u64).wrapping_mul(0x100000001b3)
    })
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        TRIGRAM_MODEL
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.dimensions)
    }

    async fn embed_documents(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

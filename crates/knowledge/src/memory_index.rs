//! Brute-force in-memory vector index.

use crate::types::{Document, ScoredDocument};
use crate::vector_index::VectorIndex;
use catalog_qa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// How query/document similarity is scored. Higher is always better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    DotProduct,
    /// Negated squared euclidean distance
    Euclidean,
}

impl DistanceMetric {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cosine" => Some(Self::Cosine),
            "dot" | "dot_product" => Some(Self::DotProduct),
            "euclidean" | "l2" => Some(Self::Euclidean),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
            Self::DotProduct => "dot_product",
            Self::Euclidean => "euclidean",
        }
    }

    /// Score two equal-length vectors.
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::Cosine => cosine_similarity(a, b),
            Self::DotProduct => dot(a, b),
            Self::Euclidean => -a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>(),
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Cosine similarity; 0 when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot(a, b) / (norm_a * norm_b)
}

#[derive(Debug, Clone)]
struct IndexEntry {
    document: Document,
    embedding: Vec<f32>,
}

/// Every document lives in a `Vec`; search scores all of them.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIndex {
    metric: DistanceMetric,
    dimensions: Option<usize>,
    entries: Vec<IndexEntry>,
}

impl InMemoryIndex {
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            metric,
            dimensions: None,
            entries: Vec::new(),
        }
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.entries.iter().map(|e| &e.document)
    }

    fn check_query(&self, query: &[f32]) -> AppResult<()> {
        match self.dimensions {
            Some(dims) if dims != query.len() => Err(AppError::Index(format!(
                "Query has {} dimensions, index has {}",
                query.len(),
                dims
            ))),
            _ => Ok(()),
        }
    }

    /// Indices of all entries, best first. Stable, so ties keep insertion order.
    fn ranked(&self, query: &[f32]) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let score = self.metric.score(query, &e.embedding);
                (i, if score.is_nan() { f32::NEG_INFINITY } else { score })
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored
    }

    fn hit(&self, i: usize, score: f32) -> ScoredDocument {
        ScoredDocument {
            document: self.entries[i].document.clone(),
            score,
        }
    }

    /// Maximal marginal relevance selection.
    ///
    /// Takes the `fetch_k` nearest candidates, then greedily picks `k` of
    /// them, trading query similarity (weight `lambda_mult`) against cosine
    /// similarity to what is already picked. `lambda_mult = 1` is plain
    /// similarity order; `0` maximises diversity.
    pub fn max_marginal_relevance(
        &self,
        query: &[f32],
        k: usize,
        fetch_k: usize,
        lambda_mult: f32,
    ) -> AppResult<Vec<ScoredDocument>> {
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }
        self.check_query(query)?;

        let mut candidates: Vec<(usize, f32)> = self.ranked(query);
        candidates.truncate(fetch_k.max(k));

        let relevance: Vec<f32> = candidates
            .iter()
            .map(|(i, _)| cosine_similarity(query, &self.entries[*i].embedding))
            .collect();

        let mut selected: Vec<usize> = Vec::with_capacity(k);
        let mut remaining: Vec<usize> = (0..candidates.len()).collect();

        while selected.len() < k && !remaining.is_empty() {
            let mut best_pos = 0;
            let mut best_score = f32::NEG_INFINITY;

            for (pos, &c) in remaining.iter().enumerate() {
                let redundancy = selected
                    .iter()
                    .map(|&s| {
                        cosine_similarity(
                            &self.entries[candidates[c].0].embedding,
                            &self.entries[candidates[s].0].embedding,
                        )
                    })
                    .fold(f32::NEG_INFINITY, f32::max);
                let redundancy = if selected.is_empty() { 0.0 } else { redundancy };

                let score = lambda_mult * relevance[c] - (1.0 - lambda_mult) * redundancy;
                if score > best_score {
                    best_score = score;
                    best_pos = pos;
                }
            }

            selected.push(remaining.remove(best_pos));
        }

        Ok(selected
            .into_iter()
            .map(|c| self.hit(candidates[c].0, candidates[c].1))
            .collect())
    }
}

impl VectorIndex for InMemoryIndex {
    fn add(&mut self, documents: Vec<Document>, embeddings: Vec<Vec<f32>>) -> AppResult<()> {
        if documents.len() != embeddings.len() {
            return Err(AppError::Index(format!(
                "Got {} documents but {} embeddings",
                documents.len(),
                embeddings.len()
            )));
        }

        let Some(first) = embeddings.first() else {
            return Ok(());
        };
        let dims = self.dimensions.unwrap_or(first.len());

        if dims == 0 {
            return Err(AppError::Index("Embeddings cannot be empty".to_string()));
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dims) {
            return Err(AppError::Index(format!(
                "Embedding has {} dimensions, index has {}",
                bad.len(),
                dims
            )));
        }

        self.dimensions = Some(dims);
        self.entries.extend(
            documents
                .into_iter()
                .zip(embeddings)
                .map(|(document, embedding)| IndexEntry {
                    document,
                    embedding,
                }),
        );

        tracing::debug!(count = self.entries.len(), dims, "Index updated");
        Ok(())
    }

    fn search(&self, query_embedding: &[f32], k: usize) -> AppResult<Vec<ScoredDocument>> {
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }
        self.check_query(query_embedding)?;

        Ok(self
            .ranked(query_embedding)
            .into_iter()
            .take(k)
            .map(|(i, score)| self.hit(i, score))
            .collect())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.dimensions = None;
    }
}

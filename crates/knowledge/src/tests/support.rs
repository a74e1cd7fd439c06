//! Shared fixtures: a scripted chat client and a small catalog.

use crate::embeddings::providers::TrigramProvider;
use crate::embeddings::EmbeddingProvider;
use crate::loader::CsvLoader;
use crate::rag::{IndexCreator, VectorStoreIndex};
use async_trait::async_trait;
use catalog_qa_core::AppResult;
use catalog_qa_llm::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const CATALOG_CSV: &str = "name,description
Women's Campside Oxfords,\"This ultracomfortable lace-to-toe Oxford boasts a super-soft canvas, thick cushioning, and quality construction for a broken-in feel from the first time you put them on.\"
Recycled Waterhog Dog Mat,\"Protect your floors from spills and splashing with our ultradurable recycled Waterhog dog mat made right here in the USA.\"
Infant and Toddler Girls' Coastal Chill Swimsuit,\"She'll love the bright colors, ruffles and exclusive whimsical prints of this toddler's two-piece swimsuit. UPF 50+ rated sun protection.\"
Refresh Swimwear V-Neck Tankini Contrasts,\"Whether you're going for a swim or heading out on an SUP, this watersport-ready tankini top is designed to move with you.\"
EcoFlex 3L Storm Pants,\"Our new TEK O2 technology makes our four-season waterproof pants even more breathable.\"
Sun Shield Shirt,\"Block the sun, not the fun. Our high-performance sun shirt is rated UPF 50+ for superior sun protection. Wicks moisture and dries fast.\"
Men's Tropical Plaid Short-Sleeve Shirt,\"Our lightest hot-weather shirt is rated UPF 50+ for superior protection from the sun's UV rays.\"
";

/// Row numbers of notable products in [`CATALOG_CSV`].
pub const DOG_MAT_ROW: usize = 1;
pub const STORM_PANTS_ROW: usize = 4;
pub const SUN_SHIELD_ROW: usize = 5;
pub const TROPICAL_SHIRT_ROW: usize = 6;

/// Catalog written to a temp dir; keep the guard alive for the test.
pub struct CatalogFixture {
    pub dir: TempDir,
    pub path: PathBuf,
}

pub fn catalog_file() -> CatalogFixture {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("OutdoorClothingCatalog.csv");
    std::fs::write(&path, CATALOG_CSV).unwrap();
    CatalogFixture { dir, path }
}

pub fn embedder() -> Arc<dyn EmbeddingProvider> {
    Arc::new(TrigramProvider::new(384))
}

pub async fn catalog_index(fixture: &CatalogFixture) -> VectorStoreIndex {
    IndexCreator::new(embedder())
        .from_loaders(&[CsvLoader::new(&fixture.path)])
        .await
        .unwrap()
}

type Responder = Box<dyn Fn(&LlmRequest) -> String + Send + Sync>;

/// In-process chat client that records requests and answers from a closure.
pub struct ScriptedLlm {
    responder: Responder,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub fn new(responder: impl Fn(&LlmRequest) -> String + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(reply: &str) -> Arc<Self> {
        let reply = reply.to_string();
        Self::new(move |_| reply.clone())
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, request: &LlmRequest) -> String {
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(request)
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let content = self.record(request);
        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::new(10, 5),
            done: true,
        })
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        let content = self.record(request);
        let model = request.model.clone();

        let mut chunks: Vec<AppResult<LlmStreamChunk>> = content
            .split_inclusive(' ')
            .map(|piece| {
                Ok(LlmStreamChunk {
                    content: piece.to_string(),
                    model: model.clone(),
                    done: false,
                    usage: None,
                })
            })
            .collect();
        chunks.push(Ok(LlmStreamChunk {
            content: String::new(),
            model,
            done: true,
            usage: Some(LlmUsage::new(10, 5)),
        }));

        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}

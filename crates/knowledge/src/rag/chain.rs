//! Retrieval QA orchestration.
//!
//! Retrieves catalog rows for a question and combines them into an answer
//! with the configured chain strategy.

use crate::rag::combine::{run_chain, ChainContext};
use crate::rag::sources::map_sources;
use crate::rag::types::{ChainType, LlmSettings, QaResponse, SourceRef};
use crate::retriever::Retriever;
use crate::types::{Document, ScoredDocument};
use catalog_qa_core::{AppError, AppResult};
use catalog_qa_llm::{LlmClient, LlmStream};
use std::path::PathBuf;
use std::sync::Arc;

/// Question answering over a retriever.
///
/// # Example
/// ```no_run
/// use catalog_qa_knowledge::rag::{ChainType, LlmSettings, RetrievalQa};
/// # async fn example(
/// #     llm: std::sync::Arc<dyn catalog_qa_llm::LlmClient>,
/// #     retriever: catalog_qa_knowledge::Retriever,
/// # ) -> Result<(), Box<dyn std::error::Error>> {
/// let qa = RetrievalQa::new(llm, retriever, LlmSettings::new("gpt-3.5-turbo"))
///     .with_chain_type(ChainType::Stuff)
///     .with_source_documents(true);
/// let response = qa.run("Do you have shirts with sun protection?").await?;
/// println!("{}", response.answer);
/// # Ok(())
/// # }
/// ```
pub struct RetrievalQa {
    llm: Arc<dyn LlmClient>,
    retriever: Retriever,
    chain_type: ChainType,
    settings: LlmSettings,
    workspace: Option<PathBuf>,
    return_source_documents: bool,
}

/// A streamed stuff-chain answer.
pub struct QaStream {
    /// Rows placed in the prompt
    pub sources: Vec<SourceRef>,

    /// Incremental answer text
    pub stream: LlmStream,
}

impl RetrievalQa {
    pub fn new(llm: Arc<dyn LlmClient>, retriever: Retriever, settings: LlmSettings) -> Self {
        Self {
            llm,
            retriever,
            chain_type: ChainType::default(),
            settings,
            workspace: None,
            return_source_documents: false,
        }
    }

    pub fn with_chain_type(mut self, chain_type: ChainType) -> Self {
        self.chain_type = chain_type;
        self
    }

    /// Look for prompt overrides under this workspace.
    pub fn with_workspace(mut self, workspace: impl Into<PathBuf>) -> Self {
        self.workspace = Some(workspace.into());
        self
    }

    pub fn with_source_documents(mut self, enabled: bool) -> Self {
        self.return_source_documents = enabled;
        self
    }

    pub fn chain_type(&self) -> ChainType {
        self.chain_type
    }

    fn context(&self) -> ChainContext<'_> {
        ChainContext {
            llm: self.llm.as_ref(),
            settings: &self.settings,
            workspace: self.workspace.as_deref(),
        }
    }

    async fn retrieve(&self, question: &str) -> AppResult<(Vec<ScoredDocument>, Vec<Document>)> {
        let hits = self.retriever.relevant_documents(question).await?;
        let documents = hits.iter().map(|hit| hit.document.clone()).collect();
        Ok((hits, documents))
    }

    /// Answer `question`.
    ///
    /// # Errors
    /// `AppError::Chain` for a blank question; otherwise whatever retrieval,
    /// prompt rendering or the model call reports.
    pub async fn run(&self, question: &str) -> AppResult<QaResponse> {
        let question = validate_question(question)?;

        tracing::info!(
            chain = self.chain_type.as_str(),
            model = %self.settings.model,
            "Answering: {}",
            question
        );

        let (hits, documents) = self.retrieve(question).await?;
        let max_score = hits
            .iter()
            .map(|hit| hit.score)
            .fold(f32::NEG_INFINITY, f32::max);
        let max_score = if hits.is_empty() { 0.0 } else { max_score };

        tracing::info!(
            "Retrieved {} documents (max score: {:.3})",
            hits.len(),
            max_score
        );

        let output = run_chain(&self.context(), self.chain_type, &documents, question).await?;

        tracing::info!(
            llm_calls = output.llm_calls,
            total_tokens = output.usage.total_tokens,
            "Answer complete"
        );

        let sources = if self.return_source_documents {
            map_sources(&hits)
        } else {
            Vec::new()
        };

        Ok(QaResponse {
            answer: output.answer,
            sources,
            chain_type: self.chain_type,
            usage: output.usage,
            llm_calls: output.llm_calls,
            max_score,
        })
    }

    /// Stream the answer to `question`. Only the stuff chain can stream.
    pub async fn stream(&self, question: &str) -> AppResult<QaStream> {
        if self.chain_type != ChainType::Stuff {
            return Err(AppError::Chain(format!(
                "Streaming requires the stuff chain, not {}",
                self.chain_type.as_str()
            )));
        }

        let question = validate_question(question)?;
        let (hits, documents) = self.retrieve(question).await?;

        let request = self
            .context()
            .stuff_request(&documents, question)?
            .with_streaming();
        let stream = self.llm.stream(&request).await?;

        Ok(QaStream {
            sources: map_sources(&hits),
            stream,
        })
    }
}

fn validate_question(question: &str) -> AppResult<&str> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AppError::Chain("Question cannot be empty".to_string()));
    }
    Ok(question)
}

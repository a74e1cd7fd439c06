//! Single-call answering over documents the caller already has.

use crate::rag::combine::{join_page_contents, ChainContext};
use crate::rag::types::LlmSettings;
use crate::types::Document;
use catalog_qa_core::AppResult;
use catalog_qa_llm::{LlmClient, LlmResponse};
use catalog_qa_prompt::builtin::QA_DIRECT;

/// Ask the model about `documents` without going through a retriever.
///
/// Page contents are concatenated with no separator and followed by
/// `" Question: {question}"`, all in one user message.
pub async fn answer_with_documents(
    llm: &dyn LlmClient,
    settings: &LlmSettings,
    documents: &[Document],
    question: &str,
) -> AppResult<LlmResponse> {
    let ctx = ChainContext {
        llm,
        settings,
        workspace: None,
    };

    let context = join_page_contents(documents, "");
    let request = ctx.build_request(
        QA_DIRECT,
        &[("context", context.as_str()), ("question", question)],
    )?;

    tracing::debug!(
        documents = documents.len(),
        chars = request.prompt.len(),
        "Direct answer request"
    );

    llm.complete(&request).await
}

//! Document-combining strategies for retrieval QA.

use crate::rag::types::{ChainType, LlmSettings, NO_INFORMATION_ANSWER};
use crate::types::Document;
use catalog_qa_core::{AppError, AppResult};
use catalog_qa_llm::{LlmClient, LlmRequest, LlmUsage};
use catalog_qa_prompt::builtin::{
    builtin, QA_MAP_REDUCE_COMBINE, QA_MAP_REDUCE_MAP, QA_MAP_RERANK, QA_REFINE_INITIAL,
    QA_REFINE_REFINE, QA_STUFF,
};
use catalog_qa_prompt::{build_prompt, load_prompt, PromptTemplate};
use std::collections::HashMap;
use std::path::Path;

/// Separator between documents in a stuffed context.
pub(crate) const DOCUMENT_SEPARATOR: &str = "\n\n";

/// Everything a chain needs to talk to the model.
pub(crate) struct ChainContext<'a> {
    pub llm: &'a dyn LlmClient,
    pub settings: &'a LlmSettings,
    /// Workspace searched for prompt overrides
    pub workspace: Option<&'a Path>,
}

/// Result of running one chain.
#[derive(Debug, Default)]
pub(crate) struct ChainOutput {
    pub answer: String,
    pub usage: LlmUsage,
    pub llm_calls: u32,
}

impl ChainContext<'_> {
    fn template(&self, id: &str) -> AppResult<PromptTemplate> {
        match self.workspace {
            Some(workspace) => load_prompt(workspace, id),
            None => builtin(id)
                .ok_or_else(|| AppError::Prompt(format!("Prompt '{}' not found", id))),
        }
    }

    /// Render `template_id` into a request using the chain's model settings.
    pub(crate) fn build_request(
        &self,
        template_id: &str,
        variables: &[(&str, &str)],
    ) -> AppResult<LlmRequest> {
        let template = self.template(template_id)?;
        let variables: HashMap<String, String> = variables
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let built = build_prompt(&template, &variables)?;
        let request = self.settings.request(built.user);

        Ok(match built.system {
            Some(system) => request.with_system(system),
            None => request,
        })
    }

    async fn call(
        &self,
        template_id: &str,
        variables: &[(&str, &str)],
        output: &mut ChainOutput,
    ) -> AppResult<String> {
        let request = self.build_request(template_id, variables)?;
        let response = self.llm.complete(&request).await?;

        output.usage.add(&response.usage);
        output.llm_calls += 1;

        tracing::debug!(
            template = template_id,
            chars = response.content.len(),
            "Model call complete"
        );

        Ok(response.content)
    }

    /// The single request the stuff chain sends.
    pub(crate) fn stuff_request(
        &self,
        documents: &[Document],
        question: &str,
    ) -> AppResult<LlmRequest> {
        let context = join_page_contents(documents, DOCUMENT_SEPARATOR);
        self.build_request(QA_STUFF, &[("context", context.as_str()), ("question", question)])
    }
}

pub(crate) fn join_page_contents(documents: &[Document], separator: &str) -> String {
    documents
        .iter()
        .map(|d| d.page_content.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Run `chain_type` over `documents`.
pub(crate) async fn run_chain(
    ctx: &ChainContext<'_>,
    chain_type: ChainType,
    documents: &[Document],
    question: &str,
) -> AppResult<ChainOutput> {
    if documents.is_empty() && chain_type != ChainType::Stuff {
        tracing::info!(chain = chain_type.as_str(), "No documents retrieved");
        return Ok(ChainOutput {
            answer: NO_INFORMATION_ANSWER.to_string(),
            ..ChainOutput::default()
        });
    }

    match chain_type {
        ChainType::Stuff => stuff(ctx, documents, question).await,
        ChainType::MapReduce => map_reduce(ctx, documents, question).await,
        ChainType::Refine => refine(ctx, documents, question).await,
        ChainType::MapRerank => map_rerank(ctx, documents, question).await,
    }
}

async fn stuff(
    ctx: &ChainContext<'_>,
    documents: &[Document],
    question: &str,
) -> AppResult<ChainOutput> {
    let request = ctx.stuff_request(documents, question)?;
    let response = ctx.llm.complete(&request).await?;

    Ok(ChainOutput {
        answer: response.content,
        usage: response.usage,
        llm_calls: 1,
    })
}

async fn map_reduce(
    ctx: &ChainContext<'_>,
    documents: &[Document],
    question: &str,
) -> AppResult<ChainOutput> {
    let mut output = ChainOutput::default();

    let mut extracts = Vec::with_capacity(documents.len());
    for document in documents {
        let extract = ctx
            .call(
                QA_MAP_REDUCE_MAP,
                &[("context", document.page_content.as_str()), ("question", question)],
                &mut output,
            )
            .await?;
        extracts.push(extract.trim().to_string());
    }

    let summaries = extracts.join(DOCUMENT_SEPARATOR);
    output.answer = ctx
        .call(
            QA_MAP_REDUCE_COMBINE,
            &[("summaries", summaries.as_str()), ("question", question)],
            &mut output,
        )
        .await?;

    Ok(output)
}

async fn refine(
    ctx: &ChainContext<'_>,
    documents: &[Document],
    question: &str,
) -> AppResult<ChainOutput> {
    let mut output = ChainOutput::default();

    let Some((first, rest)) = documents.split_first() else {
        return Ok(output);
    };

    let mut answer = ctx
        .call(
            QA_REFINE_INITIAL,
            &[("context", first.page_content.as_str()), ("question", question)],
            &mut output,
        )
        .await?;

    for document in rest {
        let refined = ctx
            .call(
                QA_REFINE_REFINE,
                &[
                    ("question", question),
                    ("existing_answer", answer.as_str()),
                    ("context", document.page_content.as_str()),
                ],
                &mut output,
            )
            .await?;
        answer = refined;
    }

    output.answer = answer;
    Ok(output)
}

async fn map_rerank(
    ctx: &ChainContext<'_>,
    documents: &[Document],
    question: &str,
) -> AppResult<ChainOutput> {
    let mut output = ChainOutput::default();
    let mut best: Option<(String, u32)> = None;

    for (i, document) in documents.iter().enumerate() {
        let raw = ctx
            .call(
                QA_MAP_RERANK,
                &[("context", document.page_content.as_str()), ("question", question)],
                &mut output,
            )
            .await?;

        let (answer, score) = parse_scored_answer(&raw);
        tracing::debug!(document = i, score, "Scored answer");

        if best.as_ref().map_or(true, |(_, best_score)| score > *best_score) {
            best = Some((answer, score));
        }
    }

    output.answer = best.map(|(answer, _)| answer).unwrap_or_default();
    Ok(output)
}

/// Split a map-rerank reply into its answer and `Score:` value.
///
/// The last line starting with `Score:` (any case) supplies the score,
/// clamped to 100; the text before it is the answer, minus any leading
/// `Helpful Answer:` label. Replies without a readable score get 0.
pub(crate) fn parse_scored_answer(text: &str) -> (String, u32) {
    let lines: Vec<&str> = text.lines().collect();

    let score_line = lines
        .iter()
        .rposition(|line| strip_label(line.trim_start(), "score:").is_some());

    let (answer_lines, score) = match score_line {
        Some(i) => {
            let value = strip_label(lines[i].trim_start(), "score:").unwrap_or("");
            let digits: String = value
                .trim_start()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            let score = digits.parse::<u32>().map(|s| s.min(100)).unwrap_or(0);
            (&lines[..i], score)
        }
        None => (&lines[..], 0),
    };

    let answer = answer_lines.join("\n");
    let answer = answer.trim();
    let answer = strip_label(answer, "helpful answer:").unwrap_or(answer).trim();

    (answer.to_string(), score)
}

/// Text after a case-insensitive ASCII `label`, if `text` starts with it.
fn strip_label<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    match text.get(..label.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(label) => Some(&text[label.len()..]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scored_answer() {
        let (answer, score) = parse_scored_answer("The Sun Shield Shirt blocks UV.\nScore: 85");
        assert_eq!(answer, "The Sun Shield Shirt blocks UV.");
        assert_eq!(score, 85);
    }

    #[test]
    fn test_parse_scored_answer_strips_label_and_clamps() {
        let (answer, score) =
            parse_scored_answer(" Helpful Answer: Yes, it is waterproof.\n\nSCORE: 250/100");
        assert_eq!(answer, "Yes, it is waterproof.");
        assert_eq!(score, 100);
    }

    #[test]
    fn test_parse_scored_answer_uses_last_score_line() {
        let (answer, score) = parse_scored_answer("Score: 10 is what the label says\nScore: 60");
        assert_eq!(answer, "Score: 10 is what the label says");
        assert_eq!(score, 60);
    }

    #[test]
    fn test_unparsable_score_is_zero() {
        assert_eq!(parse_scored_answer("I don't know.").1, 0);
        assert_eq!(parse_scored_answer("Maybe.\nScore: high").1, 0);
        assert_eq!(parse_scored_answer("I don't know.").0, "I don't know.");
    }

    #[test]
    fn test_strip_label_is_char_safe() {
        assert_eq!(strip_label("été", "helpful answer:"), None);
        assert_eq!(strip_label("HELPFUL ANSWER: ok", "helpful answer:"), Some(" ok"));
    }

    #[test]
    fn test_join_page_contents() {
        use crate::types::DocumentMetadata;
        let docs = vec![
            Document::new("name: A", DocumentMetadata::new("c.csv", 0)),
            Document::new("name: B", DocumentMetadata::new("c.csv", 1)),
        ];
        assert_eq!(join_page_contents(&docs, DOCUMENT_SEPARATOR), "name: A\n\nname: B");
        assert_eq!(join_page_contents(&docs, ""), "name: Aname: B");
    }
}

//! Built-in question-answering templates.
//!
//! Each retrieval chain strategy uses one or two of these. A workspace can
//! override any of them by dropping `<id>.yml` into `.catalog-qa/prompts/`.

use crate::types::PromptTemplate;

pub const QA_STUFF: &str = "qa.stuff";
pub const QA_MAP_REDUCE_MAP: &str = "qa.map_reduce.map";
pub const QA_MAP_REDUCE_COMBINE: &str = "qa.map_reduce.combine";
pub const QA_REFINE_INITIAL: &str = "qa.refine.initial";
pub const QA_REFINE_REFINE: &str = "qa.refine.refine";
pub const QA_MAP_RERANK: &str = "qa.map_rerank";
pub const QA_DIRECT: &str = "qa.direct";

/// Every built-in template id.
pub const BUILTIN_IDS: [&str; 7] = [
    QA_STUFF,
    QA_MAP_REDUCE_MAP,
    QA_MAP_REDUCE_COMBINE,
    QA_REFINE_INITIAL,
    QA_REFINE_REFINE,
    QA_MAP_RERANK,
    QA_DIRECT,
];

const STUFF_SYSTEM: &str = "Use the following pieces of context to answer the user's question. \n\
If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\
----------------\n\
{{context}}";

const MAP_SYSTEM: &str = "Use the following portion of a long document to see if any of the text is relevant to answer the question. \n\
Return any relevant text verbatim.\n\
______________________\n\
{{context}}";

const COMBINE_SYSTEM: &str = "Given the following extracted parts of a long document and a question, create a final answer. \n\
If you don't know the answer, just say that you don't know. Don't try to make up an answer.\n\
______________________\n\
{{summaries}}";

const REFINE_INITIAL_SYSTEM: &str = "Context information is below.\n\
------------\n\
{{context}}\n\
------------\n\
Given the context information and not prior knowledge, answer any questions";

const REFINE_TEMPLATE: &str = "The original question is as follows: {{question}}\n\
We have provided an existing answer: {{existing_answer}}\n\
We have the opportunity to refine the existing answer (only if needed) with some more context below.\n\
------------\n\
{{context}}\n\
------------\n\
Given the new context, refine the original answer to better answer the question. \
If the context isn't useful, return the original answer.";

const MAP_RERANK_TEMPLATE: &str = "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\n\
In addition to giving an answer, also return a score of how fully it answered the user's question. \
This should be in the following format:\n\n\
Question: [question here]\n\
Helpful Answer: [answer here]\n\
Score: [score between 0 and 100]\n\n\
Begin!\n\n\
Context:\n\
---------\n\
{{context}}\n\
---------\n\
Question: {{question}}\n\
Helpful Answer:";

/// Look up a built-in template by id.
pub fn builtin(id: &str) -> Option<PromptTemplate> {
    let template = match id {
        QA_STUFF => PromptTemplate::new(
            QA_STUFF,
            "Answer from stuffed context",
            Some(STUFF_SYSTEM),
            "{{question}}",
            &["context", "question"],
        ),
        QA_MAP_REDUCE_MAP => PromptTemplate::new(
            QA_MAP_REDUCE_MAP,
            "Extract relevant text from one document",
            Some(MAP_SYSTEM),
            "{{question}}",
            &["context", "question"],
        ),
        QA_MAP_REDUCE_COMBINE => PromptTemplate::new(
            QA_MAP_REDUCE_COMBINE,
            "Combine extracted passages into an answer",
            Some(COMBINE_SYSTEM),
            "{{question}}",
            &["summaries", "question"],
        ),
        QA_REFINE_INITIAL => PromptTemplate::new(
            QA_REFINE_INITIAL,
            "Initial answer from the first document",
            Some(REFINE_INITIAL_SYSTEM),
            "{{question}}",
            &["context", "question"],
        ),
        QA_REFINE_REFINE => PromptTemplate::new(
            QA_REFINE_REFINE,
            "Refine an answer with one more document",
            None,
            REFINE_TEMPLATE,
            &["question", "existing_answer", "context"],
        ),
        QA_MAP_RERANK => PromptTemplate::new(
            QA_MAP_RERANK,
            "Answer and self-score against one document",
            None,
            MAP_RERANK_TEMPLATE,
            &["context", "question"],
        ),
        QA_DIRECT => PromptTemplate::new(
            QA_DIRECT,
            "Concatenated rows followed by the question",
            None,
            "{{context}} Question: {{question}}",
            &["context", "question"],
        ),
        _ => return None,
    };

    Some(template)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_builtin_id_resolves() {
        for id in BUILTIN_IDS {
            let template = builtin(id).unwrap();
            assert_eq!(template.id, id);
            assert!(!template.input_variables.is_empty());
        }
    }

    #[test]
    fn test_declared_variables_appear_in_sources() {
        for id in BUILTIN_IDS {
            let template = builtin(id).unwrap();
            let sources = format!(
                "{}{}",
                template.system.clone().unwrap_or_default(),
                template.template
            );
            for var in &template.input_variables {
                assert!(
                    sources.contains(&format!("{{{{{}}}}}", var)),
                    "{} does not use {}",
                    id,
                    var
                );
            }
        }
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(builtin("qa.unknown").is_none());
    }
}

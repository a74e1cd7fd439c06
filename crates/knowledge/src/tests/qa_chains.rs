//! End-to-end chain tests: CSV -> trigram embeddings -> retrieval -> scripted model.

use super::support::*;
use crate::rag::{
    answer_with_documents, ChainType, LlmSettings, RetrievalQa, NO_INFORMATION_ANSWER,
};
use crate::retriever::{SearchOptions, SearchType};
use catalog_qa_llm::{LlmClient, LlmUsage};
use futures::StreamExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const QUESTION: &str = "Please list all your shirts with sun protection in a table in markdown.";

fn settings() -> LlmSettings {
    LlmSettings::new("gpt-3.5-turbo")
}

#[tokio::test]
async fn test_stuff_chain_single_call_with_context() {
    let fixture = catalog_file();
    let index = catalog_index(&fixture).await;
    let llm = ScriptedLlm::replying("| Name |\n|---|\n| Sun Shield Shirt |");

    let qa = RetrievalQa::new(
        llm.clone(),
        index.retriever(SearchOptions::default()),
        settings(),
    );
    let response = qa.run(QUESTION).await.unwrap();

    assert_eq!(response.answer, "| Name |\n|---|\n| Sun Shield Shirt |");
    assert_eq!(response.chain_type, ChainType::Stuff);
    assert_eq!(response.llm_calls, 1);
    assert_eq!(response.usage, LlmUsage::new(10, 5));
    assert!(response.sources.is_empty());
    assert!(response.max_score > 0.0);

    let requests = llm.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].prompt, QUESTION);
    assert_eq!(requests[0].temperature, Some(0.0));
    assert!(!requests[0].stream);

    let system = requests[0].system.as_deref().unwrap();
    assert!(system.starts_with("Use the following pieces of context"));
    assert_eq!(system.matches("name: ").count(), 4);
    assert!(system.contains("\n\nname: "));
}

#[tokio::test]
async fn test_sources_returned_when_requested() {
    let fixture = catalog_file();
    let index = catalog_index(&fixture).await;
    let llm = ScriptedLlm::replying("ok");

    let response = RetrievalQa::new(llm, index.retriever(SearchOptions::default()), settings())
        .with_source_documents(true)
        .run(QUESTION)
        .await
        .unwrap();

    assert_eq!(response.sources.len(), 4);
    assert!(response.sources.iter().all(|s| s.location.starts_with("row ")));
    assert!(response
        .sources
        .windows(2)
        .all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn test_map_reduce_maps_each_document_then_combines() {
    let fixture = catalog_file();
    let index = catalog_index(&fixture).await;
    let llm = ScriptedLlm::new(|request| {
        let system = request.system.clone().unwrap_or_default();
        if system.contains("extracted parts") {
            "combined answer".to_string()
        } else {
            "relevant text".to_string()
        }
    });

    let response = RetrievalQa::new(
        llm.clone(),
        index.retriever(SearchOptions::default().with_k(3)),
        settings(),
    )
    .with_chain_type(ChainType::MapReduce)
    .run(QUESTION)
    .await
    .unwrap();

    assert_eq!(response.answer, "combined answer");
    assert_eq!(response.llm_calls, 4);
    assert_eq!(response.usage, LlmUsage::new(40, 20));

    let requests = llm.requests();
    let combine = requests.last().unwrap().system.as_deref().unwrap();
    assert!(combine.ends_with("relevant text\n\nrelevant text\n\nrelevant text"));
}

#[tokio::test]
async fn test_refine_threads_existing_answer() {
    let fixture = catalog_file();
    let index = catalog_index(&fixture).await;
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let llm = ScriptedLlm::new(move |_| {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("answer {}", n)
    });

    let response = RetrievalQa::new(
        llm.clone(),
        index.retriever(SearchOptions::default().with_k(3)),
        settings(),
    )
    .with_chain_type(ChainType::Refine)
    .run(QUESTION)
    .await
    .unwrap();

    assert_eq!(response.answer, "answer 3");
    assert_eq!(response.llm_calls, 3);

    let requests = llm.requests();
    assert!(requests[0].system.as_deref().unwrap().starts_with("Context information"));
    assert!(requests[1].prompt.contains("existing answer: answer 1"));
    assert!(requests[2].prompt.contains("existing answer: answer 2"));
}

#[tokio::test]
async fn test_map_rerank_picks_highest_score() {
    let fixture = catalog_file();
    let index = catalog_index(&fixture).await;
    let llm = ScriptedLlm::new(|request| {
        if request.prompt.contains("name: Sun Shield Shirt") {
            "The Sun Shield Shirt is rated UPF 50+.\nScore: 90".to_string()
        } else {
            "Not relevant.\nScore: 10".to_string()
        }
    });

    let response = RetrievalQa::new(
        llm.clone(),
        index.retriever(SearchOptions::default().with_k(7)),
        settings(),
    )
    .with_chain_type(ChainType::MapRerank)
    .run(QUESTION)
    .await
    .unwrap();

    assert_eq!(response.answer, "The Sun Shield Shirt is rated UPF 50+.");
    assert_eq!(response.llm_calls, 7);
    assert_eq!(llm.requests().len(), 7);
}

#[tokio::test]
async fn test_map_rerank_ties_go_to_earliest_document() {
    let fixture = catalog_file();
    let index = catalog_index(&fixture).await;
    let retriever = index.retriever(SearchOptions::default().with_k(3));
    let first = retriever.relevant_documents(QUESTION).await.unwrap()[0]
        .document
        .page_content
        .lines()
        .next()
        .unwrap()
        .to_string();

    let llm = ScriptedLlm::new(|request| {
        let context_start = request.prompt.find("name: ").unwrap();
        let line = request.prompt[context_start..].lines().next().unwrap();
        format!("{}\nScore: 50", line)
    });

    let response = RetrievalQa::new(llm, retriever, settings())
        .with_chain_type(ChainType::MapRerank)
        .run(QUESTION)
        .await
        .unwrap();

    assert_eq!(response.answer, first);
}

#[tokio::test]
async fn test_empty_retrieval_per_chain() {
    let fixture = catalog_file();
    let index = catalog_index(&fixture).await;
    let nothing = SearchOptions {
        k: 4,
        search_type: SearchType::SimilarityScoreThreshold { threshold: 0.99 },
    };

    let llm = ScriptedLlm::replying("I don't know.");
    let stuffed = RetrievalQa::new(llm.clone(), index.retriever(nothing), settings())
        .run(QUESTION)
        .await
        .unwrap();
    assert_eq!(stuffed.answer, "I don't know.");
    assert_eq!(llm.requests().len(), 1);
    assert!(llm.requests()[0]
        .system
        .as_deref()
        .unwrap()
        .ends_with("----------------\n"));

    for chain_type in [ChainType::MapReduce, ChainType::Refine, ChainType::MapRerank] {
        let llm = ScriptedLlm::replying("unused");
        let response = RetrievalQa::new(llm.clone(), index.retriever(nothing), settings())
            .with_chain_type(chain_type)
            .run(QUESTION)
            .await
            .unwrap();

        assert_eq!(response.answer, NO_INFORMATION_ANSWER);
        assert_eq!(response.llm_calls, 0);
        assert!(llm.requests().is_empty());
    }
}

#[tokio::test]
async fn test_blank_question_rejected_before_any_call() {
    let fixture = catalog_file();
    let index = catalog_index(&fixture).await;
    let llm = ScriptedLlm::replying("unused");

    let err = RetrievalQa::new(llm.clone(), index.retriever(SearchOptions::default()), settings())
        .run("   ")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Question cannot be empty"));
    assert!(llm.requests().is_empty());
}

#[tokio::test]
async fn test_stream_yields_full_answer() {
    let fixture = catalog_file();
    let index = catalog_index(&fixture).await;
    let llm = ScriptedLlm::replying("We carry two sun shirts.");

    let qa = RetrievalQa::new(llm.clone(), index.retriever(SearchOptions::default()), settings());
    let mut qa_stream = qa.stream(QUESTION).await.unwrap();

    let mut answer = String::new();
    let mut usage = None;
    while let Some(chunk) = qa_stream.stream.next().await {
        let chunk = chunk.unwrap();
        answer.push_str(&chunk.content);
        if chunk.done {
            usage = chunk.usage;
        }
    }

    assert_eq!(answer, "We carry two sun shirts.");
    assert_eq!(usage, Some(LlmUsage::new(10, 5)));
    assert_eq!(qa_stream.sources.len(), 4);
    assert!(llm.requests()[0].stream);
}

#[tokio::test]
async fn test_stream_requires_stuff_chain() {
    let fixture = catalog_file();
    let index = catalog_index(&fixture).await;
    let llm = ScriptedLlm::replying("unused");

    let result = RetrievalQa::new(llm.clone(), index.retriever(SearchOptions::default()), settings())
        .with_chain_type(ChainType::Refine)
        .stream(QUESTION)
        .await;

    assert!(result.is_err());
    assert!(llm.requests().is_empty());
}

#[tokio::test]
async fn test_answer_with_documents_concatenates_rows() {
    let fixture = catalog_file();
    let index = catalog_index(&fixture).await;
    let docs = index.store().similarity_search(QUESTION, 4).await.unwrap();
    let llm = ScriptedLlm::replying("table");

    let response = answer_with_documents(llm.as_ref(), &settings(), &docs, QUESTION)
        .await
        .unwrap();
    assert_eq!(response.content, "table");

    let expected: String = docs.iter().map(|d| d.page_content.as_str()).collect();
    let requests = llm.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].system.is_none());
    assert_eq!(requests[0].prompt, format!("{} Question: {}", expected, QUESTION));
}

#[tokio::test]
async fn test_index_query_convenience() {
    let fixture = catalog_file();
    let index = catalog_index(&fixture).await;
    let llm = ScriptedLlm::replying("Yes, the Sun Shield Shirt.");

    let answer = index
        .query("Do you have a sun shirt?", llm.clone(), &settings())
        .await
        .unwrap();
    assert_eq!(answer, "Yes, the Sun Shield Shirt.");

    let response = index
        .query_with_sources("Do you have a sun shirt?", llm.clone(), &settings())
        .await
        .unwrap();
    assert_eq!(response.sources.len(), 4);
    assert_eq!(llm.provider_name(), "scripted");
    assert_eq!(llm.requests().len(), 2);
}

#[tokio::test]
async fn test_workspace_prompt_override() {
    let fixture = catalog_file();
    let index = catalog_index(&fixture).await;
    let prompts = fixture.dir.path().join(".catalog-qa").join("prompts");
    std::fs::create_dir_all(&prompts).unwrap();
    std::fs::write(
        prompts.join("qa.stuff.yml"),
        "id: qa.stuff\ntitle: Shop voice\ntemplate: \"Catalog:\\n{{context}}\\n\\nCustomer asks: {{question}}\"\ninputVariables: [context, question]\n",
    )
    .unwrap();

    let llm = ScriptedLlm::replying("ok");
    RetrievalQa::new(llm.clone(), index.retriever(SearchOptions::default()), settings())
        .with_workspace(fixture.dir.path())
        .run("sun shirt?")
        .await
        .unwrap();

    let request = &llm.requests()[0];
    assert!(request.system.is_none());
    assert!(request.prompt.starts_with("Catalog:\nname: "));
    assert!(request.prompt.ends_with("Customer asks: sun shirt?"));
}

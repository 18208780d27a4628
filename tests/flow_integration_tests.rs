//! End-to-end flow tests against a mock Ollama server.
//!
//! These go through the real `OllamaClient`, so they cover prompt rendering,
//! the request body, envelope decoding and shape checking together.

use mindwell::ai::flows;
use mindwell::ai::{FlowInvoker, OllamaClient};
use mindwell::db::{Database, SqliteStore, WellnessStore};
use mindwell::models::{NewJournalEntry, SentimentLabel};
use mindwell::ops;
use mindwell::stress::{get_stress_advice_from_quiz, AssessmentSource, QuizAnswers, QuizScoring};
use mockito::{Matcher, Server};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn invoker(url: &str) -> FlowInvoker {
    let client = OllamaClient::new(url, "llama3.2:3b", Duration::from_secs(5)).unwrap();
    FlowInvoker::with_builtin_catalog(Arc::new(client)).unwrap()
}

/// Wraps `content` in an Ollama chat envelope.
fn envelope(content: &str) -> String {
    json!({
        "model": "llama3.2:3b",
        "message": { "role": "assistant", "content": content },
        "done": true
    })
    .to_string()
}

#[tokio::test]
async fn test_sentiment_flow_sends_schema_and_clamps_score() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat")
        .match_body(Matcher::PartialJson(json!({
            "model": "llama3.2:3b",
            "stream": false,
            "format": { "type": "object" }
        })))
        .with_status(200)
        .with_body(envelope(r#"{"sentiment":"Positive","score":1.7}"#))
        .create_async()
        .await;

    let sentiment = flows::detect_sentiment(&invoker(&server.url()), "Best day in months!")
        .await
        .unwrap();
    assert_eq!(sentiment.sentiment, SentimentLabel::Positive);
    assert_eq!(sentiment.score, 1.0);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fenced_reply_is_accepted() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/chat")
        .with_status(200)
        .with_body(envelope(
            "```json\n{\"summary\":\"A calm weekend.\",\"extra\":true}\n```",
        ))
        .create_async()
        .await;

    let summary = flows::summarize_journal(&invoker(&server.url()), "Slept in, read, walked.")
        .await
        .unwrap();
    assert_eq!(summary, "A calm weekend.");
}

#[tokio::test]
async fn test_missing_model_is_upstream_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/chat")
        .with_status(404)
        .with_body(r#"{"error":"model not found"}"#)
        .create_async()
        .await;

    let err = flows::stress_advice(&invoker(&server.url()), 2)
        .await
        .unwrap_err();
    assert!(err.is_upstream());
    assert!(err.to_string().contains("llama3.2:3b"));
}

#[tokio::test]
async fn test_wrong_shape_is_validation_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/chat")
        .with_status(200)
        .with_body(envelope(r#"{"stressLevel":"high"}"#))
        .create_async()
        .await;

    let err = flows::stress_from_quiz(&invoker(&server.url()), &QuizAnswers::worst_case())
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_out_of_range_input_never_reaches_server() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat")
        .expect(0)
        .create_async()
        .await;

    let err = flows::stress_advice(&invoker(&server.url()), 6)
        .await
        .unwrap_err();
    assert!(err.is_validation());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_worst_case_quiz_is_high_stress() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/chat")
        .match_body(Matcher::Regex("Questions & Answers".to_string()))
        .with_status(200)
        .with_body(envelope(
            r#"{"stressLevel":5,"justification":"Poor sleep, heavy workload and no time to rest."}"#,
        ))
        .create_async()
        .await;
    server
        .mock("POST", "/api/chat")
        .match_body(Matcher::Regex("Their stress level is: 5".to_string()))
        .with_status(200)
        .with_body(envelope(r#"{"advice":"Try the 4-7-8 breathing technique tonight."}"#))
        .create_async()
        .await;

    let result = get_stress_advice_from_quiz(
        &invoker(&server.url()),
        &QuizAnswers::worst_case(),
        QuizScoring::Model,
    )
    .await;
    assert!((4..=5).contains(&result.level.value()));
    assert_eq!(result.source, AssessmentSource::Model);
    assert!(result.advice.contains("4-7-8"));
}

#[tokio::test]
async fn test_sentiment_is_saved_on_the_entry() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/chat")
        .with_status(200)
        .with_body(envelope(r#"{"sentiment":"negative","score":-0.6}"#))
        .create_async()
        .await;

    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(&temp_dir.path().join("flows.db")).unwrap();
    db.initialize_schema().unwrap();
    let store: Arc<dyn WellnessStore> = Arc::new(SqliteStore::new(db));

    let entry = ops::add_entry(
        &store,
        "alice",
        NewJournalEntry {
            title: "Rough".to_string(),
            content: "Missed the train and the meeting went badly.".to_string(),
        },
    )
    .await
    .unwrap();

    let flows = invoker(&server.url());
    let sentiment = ops::detect_entry_sentiment(&store, &flows, "alice", &entry.id)
        .await
        .unwrap();
    assert_eq!(sentiment.sentiment, SentimentLabel::Negative);

    let stored = store.journal_entry("alice", &entry.id).unwrap().unwrap();
    assert_eq!(stored.sentiment, Some(sentiment));

    let missing = ops::detect_entry_sentiment(&store, &flows, "bob", &entry.id).await;
    assert!(missing.is_err());
}

//! E2E tests for the two-tier classifier: remote zero-shot first, rules on any miss.

mod helpers;

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fq_nlu::ZeroShotConfig;
use fq_query_api::formatter::REPHRASE_MESSAGE;
use helpers::TestHarness;

/// The rules cannot place this question; only the remote tier can.
const VAGUE_QUESTION: &str = "Anything I should know about farm 2?";

async fn classifier_server(response: ResponseTemplate, expected_calls: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/classify"))
        .respond_with(response)
        .expect(expected_calls)
        .mount(&server)
        .await;
    server
}

fn harness_for(server: &MockServer, timeout_ms: u64) -> TestHarness {
    let mut config = ZeroShotConfig::new(format!("{}/classify", server.uri()));
    config.timeout_ms = timeout_ms;
    TestHarness::with_zero_shot(config)
}

fn labels(top: &str, score: f64) -> serde_json::Value {
    json!({
        "sequence": VAGUE_QUESTION,
        "labels": [top, "task summary"],
        "scores": [score, 1.0 - score],
    })
}

#[tokio::test]
async fn e2e_rules_alone_cannot_place_vague_question() {
    let h = TestHarness::with_sample_data();
    let (_, json) = h.ask(VAGUE_QUESTION, Some(42)).await;
    assert_eq!(json["intent"], "UNKNOWN");
    assert_eq!(json["text"], REPHRASE_MESSAGE);
}

#[tokio::test]
async fn e2e_remote_tier_answers() {
    let server = classifier_server(
        ResponseTemplate::new(200).set_body_json(labels("farm health", 0.88)),
        1,
    )
    .await;
    let h = harness_for(&server, 2000);

    let (_, json) = h.ask(VAGUE_QUESTION, Some(42)).await;
    assert_eq!(json["intent"], "FARM_HEALTH");
    assert_eq!(json["tier"], "remote");
    assert_eq!(json["entities"]["farm_id"], 2);
    assert!(json["text"].as_str().unwrap().contains("Mwea Farm"));

    // Entities extracted under the remote intent reach the query.
    assert!(h.store.calls()[0].contains("f.id = 2"));
}

#[tokio::test]
async fn e2e_remote_error_falls_back_to_rules() {
    let server = classifier_server(ResponseTemplate::new(503), 1).await;
    let h = harness_for(&server, 2000);

    let (_, json) = h.ask("When is my next harvest?", Some(42)).await;
    assert_eq!(json["intent"], "NEXT_HARVEST");
    assert_eq!(json["tier"], "rules");
}

/// Rate limiting is a miss and is not retried.
#[tokio::test]
async fn e2e_rate_limited_not_retried() {
    let server = classifier_server(ResponseTemplate::new(429), 1).await;
    let h = harness_for(&server, 2000);

    let (_, json) = h.classify("How is my farm health?").await;
    assert_eq!(json["intent"], "FARM_HEALTH");
    assert_eq!(json["tier"], "rules");
}

#[tokio::test]
async fn e2e_slow_remote_abandoned() {
    let server = classifier_server(
        ResponseTemplate::new(200)
            .set_body_json(labels("plot status", 0.95))
            .set_delay(Duration::from_secs(5)),
        1,
    )
    .await;
    let h = harness_for(&server, 150);

    let (_, json) = h.classify("Give me a summary of my tasks").await;
    assert_eq!(json["intent"], "TASK_SUMMARY");
    assert_eq!(json["tier"], "rules");
}

#[tokio::test]
async fn e2e_low_remote_confidence_ignored() {
    let server = classifier_server(
        ResponseTemplate::new(200).set_body_json(labels("farm health", 0.4)),
        1,
    )
    .await;
    let h = harness_for(&server, 2000);

    let (_, json) = h.ask(VAGUE_QUESTION, Some(42)).await;
    assert_eq!(json["intent"], "UNKNOWN");
    assert_eq!(json["tier"], "rules");
    assert!(h.store.calls().is_empty());
}

#[tokio::test]
async fn e2e_unrecognized_label_ignored() {
    let server = classifier_server(
        ResponseTemplate::new(200).set_body_json(labels("weather report", 0.99)),
        1,
    )
    .await;
    let h = harness_for(&server, 2000);

    let (_, json) = h.classify("What pending tasks do I have in Kirinyaga?").await;
    assert_eq!(json["intent"], "TASKS_BY_LOCATION");
    assert_eq!(json["tier"], "rules");
}

//! Hosted message store tests against a local mock server.

use std::sync::Arc;

use marketplace::proposal::session::proposal_text;
use marketplace::{MarketplaceDesk, MessageStore, ScriptReleaser, StoreError, SupabaseStore, TurnKind};
use roster::Roster;
use scout_agent::backend::MockBackend;
use scout_agent::ScoutService;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ANON_KEY: &str = "anon-key";

fn store(server: &MockServer) -> SupabaseStore {
    SupabaseStore::new(&server.uri(), ANON_KEY, "messages").unwrap()
}

#[tokio::test]
async fn send_inserts_row_with_project_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/messages"))
        .and(header("apikey", ANON_KEY))
        .and(header("authorization", "Bearer anon-key"))
        .and(header("Prefer", "return=representation"))
        .and(body_json(json!([{ "from": "0xclient", "to": "0xfreelancer", "text": "hello" }])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": 42,
            "from": "0xclient",
            "to": "0xfreelancer",
            "text": "hello",
            "timestamp": "2024-06-01T12:00:00+00:00"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let message = store(&server).send("0xclient", "0xfreelancer", "hello").await.unwrap();
    assert_eq!(message.text, "hello");
    assert!(message.timestamp.is_some());
}

#[tokio::test]
async fn history_filters_both_directions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/messages"))
        .and(query_param(
            "or",
            "(and(from.eq.0xa,to.eq.0xb),and(from.eq.0xb,to.eq.0xa))",
        ))
        .and(query_param("order", "timestamp.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "from": "0xa", "to": "0xb", "text": "hi", "timestamp": "2024-06-01T12:00:00Z" },
            { "from": "0xb", "to": "0xa", "text": "Project Proposal: audit", "timestamp": "2024-06-01T12:01:00Z" }
        ])))
        .mount(&server)
        .await;

    let history = store(&server).history("0xa", "0xb").await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(!history[0].is_proposal());
    assert!(history[1].is_proposal());
}

#[tokio::test]
async fn first_inbound_queries_oldest_message_from_others() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/messages"))
        .and(query_param("to", "eq.0xf"))
        .and(query_param("from", "neq.0xf"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "from": "0xc", "to": "0xf", "text": "are you free?" }
        ])))
        .mount(&server)
        .await;

    let first = store(&server).first_inbound("0xf").await.unwrap().unwrap();
    assert_eq!(first.sender, "0xc");
    assert!(first.timestamp.is_none());
}

#[tokio::test]
async fn error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .mount(&server)
        .await;

    let result = store(&server).send("a", "b", "hi").await;
    assert!(matches!(
        result,
        Err(StoreError::Http { status: 401, ref body }) if body == "Invalid API key"
    ));
}

#[tokio::test]
async fn desk_delivers_proposal_through_hosted_store() {
    let server = MockServer::start().await;
    let roster = Roster::builtin().unwrap();
    let maya = roster.by_username("maya").unwrap().clone();

    Mock::given(method("POST"))
        .and(path("/rest/v1/messages"))
        .and(body_json(json!([{
            "from": "0xclient",
            "to": maya.wallet,
            "text": proposal_text("Port our dApp to React Native", "0xclient"),
        }])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let desk = MarketplaceDesk::new(
        Arc::new(roster),
        Arc::new(ScoutService::new(vec![Arc::new(MockBackend::default())])),
        Arc::new(store(&server)),
        Arc::new(ScriptReleaser::new("python", "send.py")),
    );

    let turn = desk.scout_turn("0xclient", "Send project invitation to @maya").await;
    assert_eq!(turn.kind, TurnKind::DetailsRequested);

    let turn = desk.scout_turn("0xclient", "Port our dApp to React Native").await;
    assert_eq!(turn.kind, TurnKind::ProposalSent);
    assert!(turn.replies[0].contains("Maya Singh"));
}

#[tokio::test]
async fn desk_apologizes_when_hosted_store_rejects_proposal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/messages"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let desk = MarketplaceDesk::new(
        Arc::new(Roster::builtin().unwrap()),
        Arc::new(ScoutService::new(vec![Arc::new(MockBackend::default())])),
        Arc::new(store(&server)),
        Arc::new(ScriptReleaser::new("python", "send.py")),
    );

    desk.scout_turn("0xclient", "send project proposal to nina").await;
    let turn = desk.scout_turn("0xclient", "Pentest our contracts").await;

    assert_eq!(turn.kind, TurnKind::ProposalFailed);
    assert_eq!(turn.replies, vec![scout_agent::APOLOGY.to_string()]);
    assert!(desk.session("0xclient").is_empty());
}

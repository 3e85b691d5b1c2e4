//! End-to-end tests for the HTTP API.

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use uuid::Uuid;

use postsmith_api::identity::Identity;
use postsmith_api::{AppState, router};
use postsmith_core::config::{AuthConfig, Config, GeneratorConfig};
use postsmith_core::{Database, GeneratorClient};

const TEST_SECRET: &str = "test-secret";

fn temp_db_path() -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("postsmith-api-test-{}.db", Uuid::new_v4()));
    path
}

// Stands in for the generation webhook, answering every call the same way.
async fn spawn_stub_generator(status: StatusCode, body: serde_json::Value) -> String {
    let app = Router::new().route(
        "/generate",
        post(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve stub");
    });
    format!("http://{addr}/generate")
}

async fn spawn_app(generator_endpoint: &str) -> String {
    let config = Config {
        database: temp_db_path(),
        generator: GeneratorConfig {
            endpoint: generator_endpoint.to_string(),
            timeout_secs: 5,
        },
        auth: AuthConfig {
            token_secret: TEST_SECRET.to_string(),
        },
    };

    let db = Database::open(&config.database).await.expect("open db");
    let generator = GeneratorClient::new(&config.generator).expect("build generator client");

    let state = AppState {
        config: Arc::new(config),
        db: Arc::new(db),
        generator: Arc::new(generator),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind app");
    let addr = listener.local_addr().expect("app addr");
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.expect("serve app");
    });
    format!("http://{addr}")
}

fn mint_token(sub: &str) -> String {
    mint_token_with_secret(sub, TEST_SECRET)
}

fn mint_token_with_secret(sub: &str, secret: &str) -> String {
    let claims = Identity {
        sub: sub.to_string(),
        name: Some("Test Caller".to_string()),
        email: Some("caller@example.com".to_string()),
        exp: usize::try_from(chrono::Utc::now().timestamp() + 3600).expect("exp in range"),
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("encode token")
}

async fn save_generation(
    client: &reqwest::Client,
    base: &str,
    token: &str,
    body: &serde_json::Value,
) -> serde_json::Value {
    let res = client
        .post(format!("{base}/api/generations"))
        .bearer_auth(token)
        .json(body)
        .send()
        .await
        .expect("save request");
    assert_eq!(res.status(), 200);
    res.json().await.expect("save body")
}

fn linkedin_body(user_message: &str) -> serde_json::Value {
    serde_json::json!({
        "user_message": user_message,
        "assistant_message": "<generated text>",
        "platform": "linkedin",
        "tone": "professional",
        "length": "medium",
    })
}

#[tokio::test]
async fn root_and_health_are_public() {
    let base = spawn_app("http://127.0.0.1:9/generate").await;
    let client = reqwest::Client::new();

    let res = client.get(format!("{base}/")).send().await.expect("root");
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.expect("root body");
    assert_eq!(body["name"], "postsmith-api");
    assert!(body["version"].is_string());

    let res = client
        .get(format!("{base}/health"))
        .send()
        .await
        .expect("health");
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.expect("health body");
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn api_requires_a_valid_bearer_token() {
    let base = spawn_app("http://127.0.0.1:9/generate").await;
    let client = reqwest::Client::new();

    // No Authorization header
    let res = client
        .get(format!("{base}/api/conversations"))
        .send()
        .await
        .expect("request");
    assert_eq!(res.status(), 401);
    let body: serde_json::Value = res.json().await.expect("body");
    assert_eq!(body["error"]["code"], "unauthorized");

    // Garbage token
    let res = client
        .get(format!("{base}/api/conversations"))
        .bearer_auth("not-a-token")
        .send()
        .await
        .expect("request");
    assert_eq!(res.status(), 401);

    // Token signed with the wrong secret
    let forged = mint_token_with_secret("user-1", "some-other-secret");
    let res = client
        .get(format!("{base}/api/conversations"))
        .bearer_auth(forged)
        .send()
        .await
        .expect("request");
    assert_eq!(res.status(), 401);
}

#[tokio::test]
async fn unknown_caller_gets_empty_lists() {
    let base = spawn_app("http://127.0.0.1:9/generate").await;
    let client = reqwest::Client::new();
    let token = mint_token("user-never-seen");

    let res = client
        .get(format!("{base}/api/conversations"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("list conversations");
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.expect("body");
    assert_eq!(body, serde_json::json!([]));

    let res = client
        .get(format!("{base}/api/history"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("list history");
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.expect("body");
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn unknown_conversation_type_is_rejected() {
    let base = spawn_app("http://127.0.0.1:9/generate").await;
    let client = reqwest::Client::new();
    let token = mint_token("user-1");

    let res = client
        .get(format!("{base}/api/conversations?type=VIDEO"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request");
    assert_eq!(res.status(), 400);
    let body: serde_json::Value = res.json().await.expect("body");
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn save_round_trip_then_fetch() {
    let base = spawn_app("http://127.0.0.1:9/generate").await;
    let client = reqwest::Client::new();
    let token = mint_token("user-1");

    let saved = save_generation(
        &client,
        &base,
        &token,
        &linkedin_body("Write a LinkedIn post about AI"),
    )
    .await;

    assert_eq!(saved["conversation"]["title"], "Write a LinkedIn post about AI");
    assert_eq!(saved["user_message"]["sender"], "USER");
    assert_eq!(saved["assistant_message"]["sender"], "ASSISTANT");
    let conv_id = saved["conversation"]["id"].as_str().expect("conv id");

    // Fetch it back with its messages
    let res = client
        .get(format!("{base}/api/conversations/{conv_id}"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("get conversation");
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.expect("body");
    assert_eq!(body["title"], "Write a LinkedIn post about AI");
    assert_eq!(body["kind"], "GENERATION");
    let messages = body["messages"].as_array().expect("messages");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["sender"], "USER");
    assert_eq!(messages[0]["content"], "Write a LinkedIn post about AI");
    assert_eq!(messages[1]["sender"], "ASSISTANT");
    assert_eq!(messages[1]["content"], "<generated text>");

    // And it shows up in the caller's listing
    let res = client
        .get(format!("{base}/api/conversations?type=GENERATION"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("list");
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.expect("body");
    assert_eq!(body.as_array().expect("array").len(), 1);
}

#[tokio::test]
async fn saving_into_an_existing_conversation_appends() {
    let base = spawn_app("http://127.0.0.1:9/generate").await;
    let client = reqwest::Client::new();
    let token = mint_token("user-1");

    let saved = save_generation(&client, &base, &token, &linkedin_body("First prompt")).await;
    let conv_id = saved["conversation"]["id"].as_str().expect("conv id");

    let mut follow_up = linkedin_body("Second prompt");
    follow_up["conversation_id"] = serde_json::json!(conv_id);
    let saved = save_generation(&client, &base, &token, &follow_up).await;
    assert_eq!(saved["conversation"]["id"].as_str(), Some(conv_id));

    let res = client
        .get(format!("{base}/api/conversations/{conv_id}/messages"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("messages");
    assert_eq!(res.status(), 200);
    let messages: serde_json::Value = res.json().await.expect("body");
    assert_eq!(messages.as_array().expect("array").len(), 4);

    // Pagination slices the same ascending order
    let res = client
        .get(format!(
            "{base}/api/conversations/{conv_id}/messages?limit=1&offset=1"
        ))
        .bearer_auth(&token)
        .send()
        .await
        .expect("paged messages");
    let page: serde_json::Value = res.json().await.expect("body");
    let page = page.as_array().expect("array");
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["content"], "<generated text>");
}

#[tokio::test]
async fn another_callers_conversation_is_not_found() {
    let base = spawn_app("http://127.0.0.1:9/generate").await;
    let client = reqwest::Client::new();
    let owner_token = mint_token("owner");
    let other_token = mint_token("other");

    let saved = save_generation(&client, &base, &owner_token, &linkedin_body("Mine")).await;
    let conv_id = saved["conversation"]["id"].as_str().expect("conv id");

    let res = client
        .get(format!("{base}/api/conversations/{conv_id}"))
        .bearer_auth(&other_token)
        .send()
        .await
        .expect("foreign get");
    assert_eq!(res.status(), 404);
    let body: serde_json::Value = res.json().await.expect("body");
    assert_eq!(body["error"]["code"], "not_found");

    let res = client
        .delete(format!("{base}/api/conversations/{conv_id}"))
        .bearer_auth(&other_token)
        .send()
        .await
        .expect("foreign delete");
    assert_eq!(res.status(), 404);

    // Untouched for the real owner
    let res = client
        .get(format!("{base}/api/conversations/{conv_id}"))
        .bearer_auth(&owner_token)
        .send()
        .await
        .expect("owner get");
    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn generate_proxies_the_webhook() {
    let endpoint = spawn_stub_generator(
        StatusCode::OK,
        serde_json::json!({"output": "Generated post text"}),
    )
    .await;
    let base = spawn_app(&endpoint).await;
    let client = reqwest::Client::new();
    let token = mint_token("user-1");

    let res = client
        .post(format!("{base}/api/generate"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "theme": "AI startups",
            "details": "why most fail",
            "platform": "linkedin",
        }))
        .send()
        .await
        .expect("generate");
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.expect("body");
    assert_eq!(body["output"], "Generated post text");
}

#[tokio::test]
async fn failing_webhook_maps_to_bad_gateway() {
    let endpoint = spawn_stub_generator(
        StatusCode::SERVICE_UNAVAILABLE,
        serde_json::json!({"error": "overloaded"}),
    )
    .await;
    let base = spawn_app(&endpoint).await;
    let client = reqwest::Client::new();
    let token = mint_token("user-1");

    let res = client
        .post(format!("{base}/api/generate"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "theme": "AI",
            "details": "short",
            "platform": "linkedin",
        }))
        .send()
        .await
        .expect("generate");
    assert_eq!(res.status(), 502);
    let body: serde_json::Value = res.json().await.expect("body");
    assert_eq!(body["error"]["code"], "upstream_error");
}

#[tokio::test]
async fn messages_can_be_edited_and_deleted() {
    let base = spawn_app("http://127.0.0.1:9/generate").await;
    let client = reqwest::Client::new();
    let token = mint_token("user-1");

    let saved = save_generation(&client, &base, &token, &linkedin_body("Edit me")).await;
    let conv_id = saved["conversation"]["id"].as_str().expect("conv id");
    let user_msg_id = saved["user_message"]["id"].as_str().expect("msg id");
    let assistant_msg_id = saved["assistant_message"]["id"].as_str().expect("msg id");

    let res = client
        .patch(format!("{base}/api/messages/{user_msg_id}"))
        .bearer_auth(&token)
        .json(&serde_json::json!({"content": "Reworded prompt"}))
        .send()
        .await
        .expect("edit");
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.expect("body");
    assert_eq!(body["content"], "Reworded prompt");
    assert_eq!(body["edited"], true);

    let res = client
        .delete(format!("{base}/api/messages/{assistant_msg_id}"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("delete");
    assert_eq!(res.status(), 204);

    let res = client
        .get(format!("{base}/api/conversations/{conv_id}/messages"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("messages");
    let messages: serde_json::Value = res.json().await.expect("body");
    let messages = messages.as_array().expect("array");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], "Reworded prompt");
}

#[tokio::test]
async fn foreign_messages_cannot_be_touched() {
    let base = spawn_app("http://127.0.0.1:9/generate").await;
    let client = reqwest::Client::new();
    let owner_token = mint_token("owner");
    let other_token = mint_token("other");

    let saved = save_generation(&client, &base, &owner_token, &linkedin_body("Private")).await;
    let msg_id = saved["user_message"]["id"].as_str().expect("msg id");

    let res = client
        .patch(format!("{base}/api/messages/{msg_id}"))
        .bearer_auth(&other_token)
        .json(&serde_json::json!({"content": "hijacked"}))
        .send()
        .await
        .expect("edit");
    assert_eq!(res.status(), 404);

    let res = client
        .delete(format!("{base}/api/messages/{msg_id}"))
        .bearer_auth(&other_token)
        .send()
        .await
        .expect("delete");
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn conversations_can_be_archived_and_deleted() {
    let base = spawn_app("http://127.0.0.1:9/generate").await;
    let client = reqwest::Client::new();
    let token = mint_token("user-1");

    let saved = save_generation(&client, &base, &token, &linkedin_body("Lifecycle")).await;
    let conv_id = saved["conversation"]["id"].as_str().expect("conv id");

    let res = client
        .post(format!("{base}/api/conversations/{conv_id}/archive"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("archive");
    assert_eq!(res.status(), 204);

    let res = client
        .get(format!("{base}/api/conversations/{conv_id}"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("get archived");
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.expect("body");
    assert!(!body["archived_at"].is_null());

    let res = client
        .delete(format!("{base}/api/conversations/{conv_id}"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("delete");
    assert_eq!(res.status(), 204);

    let res = client
        .get(format!("{base}/api/conversations/{conv_id}"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("get deleted");
    assert_eq!(res.status(), 404);

    let res = client
        .get(format!("{base}/api/conversations"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("list");
    let body: serde_json::Value = res.json().await.expect("body");
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn conversation_title_can_be_renamed() {
    let base = spawn_app("http://127.0.0.1:9/generate").await;
    let client = reqwest::Client::new();
    let token = mint_token("user-1");

    let saved = save_generation(&client, &base, &token, &linkedin_body("Old name")).await;
    let conv_id = saved["conversation"]["id"].as_str().expect("conv id");

    let res = client
        .patch(format!("{base}/api/conversations/{conv_id}"))
        .bearer_auth(&token)
        .json(&serde_json::json!({"title": "New name"}))
        .send()
        .await
        .expect("rename");
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.expect("body");
    assert_eq!(body["title"], "New name");
    // Messages and metadata are untouched
    assert_eq!(body["messages"].as_array().expect("messages").len(), 2);
    assert_eq!(body["meta"]["platform"], "linkedin");
}

#[tokio::test]
async fn history_lists_the_callers_generations_newest_first() {
    let base = spawn_app("http://127.0.0.1:9/generate").await;
    let client = reqwest::Client::new();
    let token = mint_token("user-1");

    save_generation(&client, &base, &token, &linkedin_body("First subject")).await;
    save_generation(&client, &base, &token, &linkedin_body("Second subject")).await;

    let res = client
        .get(format!("{base}/api/history"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("history");
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.expect("body");
    let records = body.as_array().expect("array");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["subject"], "Second subject");
    assert_eq!(records[1]["subject"], "First subject");

    let res = client
        .get(format!("{base}/api/history?limit=1"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("limited history");
    let body: serde_json::Value = res.json().await.expect("body");
    assert_eq!(body.as_array().expect("array").len(), 1);
}

#[tokio::test]
async fn participants_can_be_added_and_removed() {
    let base = spawn_app("http://127.0.0.1:9/generate").await;
    let client = reqwest::Client::new();
    let owner_token = mint_token("owner");
    let guest_token = mint_token("guest");

    // The guest needs a user row; their own save creates it
    let guest_save = save_generation(&client, &base, &guest_token, &linkedin_body("Guest")).await;
    let guest_id = guest_save["conversation"]["owner_id"]
        .as_str()
        .expect("guest id")
        .to_string();

    let saved = save_generation(&client, &base, &owner_token, &linkedin_body("Shared")).await;
    let conv_id = saved["conversation"]["id"].as_str().expect("conv id");

    let res = client
        .post(format!("{base}/api/conversations/{conv_id}/participants"))
        .bearer_auth(&owner_token)
        .json(&serde_json::json!({"user_id": guest_id}))
        .send()
        .await
        .expect("add participant");
    assert_eq!(res.status(), 204);

    let res = client
        .get(format!("{base}/api/conversations/{conv_id}/participants"))
        .bearer_auth(&owner_token)
        .send()
        .await
        .expect("list participants");
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.expect("body");
    let participants = body.as_array().expect("array");
    assert_eq!(participants.len(), 2);
    let guest = participants
        .iter()
        .find(|p| p["user_id"] == guest_id.as_str())
        .expect("guest row");
    assert_eq!(guest["role"], "member");
    let owner = participants
        .iter()
        .find(|p| p["user_id"] != guest_id.as_str())
        .expect("owner row");
    assert_eq!(owner["role"], "owner");

    let res = client
        .delete(format!(
            "{base}/api/conversations/{conv_id}/participants/{guest_id}"
        ))
        .bearer_auth(&owner_token)
        .send()
        .await
        .expect("remove participant");
    assert_eq!(res.status(), 204);

    let res = client
        .get(format!("{base}/api/conversations/{conv_id}/participants"))
        .bearer_auth(&owner_token)
        .send()
        .await
        .expect("list participants");
    let body: serde_json::Value = res.json().await.expect("body");
    assert_eq!(body.as_array().expect("array").len(), 1);
}

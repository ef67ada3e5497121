use std::time::Duration;

use anyhow::Result;
use mockito::Matcher;

use super::CompletionChoiceResponse;
use super::CompletionResponse;
use super::MessageRequest;
use super::OpenAI;
use crate::domain::models::Backend;
use crate::domain::models::BackendErrorKind;
use crate::domain::models::Message;
use crate::domain::models::Role;
use crate::domain::models::TokenUsage;

impl OpenAI {
    fn with_url(url: String) -> OpenAI {
        return OpenAI {
            url,
            token: "abc".to_string(),
            timeout: Duration::from_secs(5),
        };
    }
}

fn prompt_fixture() -> Vec<Message> {
    return vec![
        Message::new(Role::System, "You are terse."),
        Message::new(Role::User, "hi"),
    ];
}

#[test]
fn it_requires_a_token() {
    let mut backend = OpenAI::with_url("http://localhost".to_string());
    assert!(backend.has_credentials());

    backend.token = " ".to_string();
    assert!(!backend.has_credentials());
}

#[tokio::test]
async fn it_gets_completions() -> Result<()> {
    let body = serde_json::to_string(&CompletionResponse {
        choices: vec![CompletionChoiceResponse {
            message: MessageRequest {
                role: "assistant".to_string(),
                content: "hello".to_string(),
            },
        }],
        usage: Some(TokenUsage::new(5, 1, 6)),
    })?;

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("Authorization", "Bearer abc")
        .match_body(Matcher::Json(serde_json::json!({
            "model": "gpt-4",
            "messages": [
                {"role": "system", "content": "You are terse."},
                {"role": "user", "content": "hi"}
            ]
        })))
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let backend = OpenAI::with_url(server.url());
    let res = backend.get_completion("gpt-4", &prompt_fixture()).await?;
    mock.assert_async().await;

    assert_eq!(res.content, "hello");
    assert_eq!(res.usage, TokenUsage::new(5, 1, 6));

    return Ok(());
}

#[tokio::test]
async fn it_defaults_missing_usage() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(r#"{"id": "chatcmpl-1", "choices": [{"index": 0, "message": {"role": "assistant", "content": "hello"}}]}"#)
        .create_async()
        .await;

    let backend = OpenAI::with_url(server.url());
    let res = backend.get_completion("gpt-4", &prompt_fixture()).await?;
    mock.assert_async().await;

    assert_eq!(res.content, "hello");
    assert!(res.usage.is_zero());

    return Ok(());
}

#[tokio::test]
async fn it_maps_auth_failures() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(401)
        .with_body(r#"{"error": {"message": "Incorrect API key provided.", "type": "invalid_request_error"}}"#)
        .create_async()
        .await;

    let backend = OpenAI::with_url(server.url());
    let err = backend
        .get_completion("gpt-4", &prompt_fixture())
        .await
        .unwrap_err();
    mock.assert_async().await;

    assert_eq!(err.kind, BackendErrorKind::Auth);
    insta::assert_snapshot!(err.to_string(), @"authentication failed: Incorrect API key provided.");

    return Ok(());
}

#[tokio::test]
async fn it_maps_rate_limits() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .with_body("slow down")
        .create_async()
        .await;

    let backend = OpenAI::with_url(server.url());
    let err = backend
        .get_completion("gpt-4", &prompt_fixture())
        .await
        .unwrap_err();
    mock.assert_async().await;

    assert_eq!(err.kind, BackendErrorKind::RateLimit);
    assert_eq!(err.message, "OpenAI returned status 429");

    return Ok(());
}

#[tokio::test]
async fn it_maps_quota_failures() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(403)
        .with_body(r#"{"error": {"message": "You exceeded your current quota.", "code": "insufficient_quota"}}"#)
        .create_async()
        .await;

    let backend = OpenAI::with_url(server.url());
    let err = backend
        .get_completion("gpt-4", &prompt_fixture())
        .await
        .unwrap_err();
    mock.assert_async().await;

    assert_eq!(err.kind, BackendErrorKind::RateLimit);
    assert!(err.message.starts_with("You exceeded your current quota."));

    return Ok(());
}

#[tokio::test]
async fn it_maps_unknown_models() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(404)
        .with_body(r#"{"error": {"message": "The model `gpt-4` does not exist"}}"#)
        .create_async()
        .await;

    let backend = OpenAI::with_url(server.url());
    let err = backend
        .get_completion("gpt-4", &prompt_fixture())
        .await
        .unwrap_err();
    mock.assert_async().await;

    assert_eq!(err.kind, BackendErrorKind::InvalidModel);

    return Ok(());
}

#[tokio::test]
async fn it_fails_on_unexpected_bodies() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices": []}"#)
        .create_async()
        .await;

    let backend = OpenAI::with_url(server.url());
    let err = backend
        .get_completion("gpt-4", &prompt_fixture())
        .await
        .unwrap_err();
    mock.assert_async().await;

    assert_eq!(err.kind, BackendErrorKind::Other);

    return Ok(());
}

#[tokio::test]
async fn it_fails_when_unreachable() -> Result<()> {
    let backend = OpenAI::with_url("http://127.0.0.1:1".to_string());
    let err = backend
        .get_completion("gpt-4", &prompt_fixture())
        .await
        .unwrap_err();

    assert_eq!(err.kind, BackendErrorKind::Network);

    return Ok(());
}

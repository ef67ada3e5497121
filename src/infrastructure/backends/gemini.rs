#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use super::network_error;
use crate::configuration::Config;
use crate::domain::models::Backend;
use crate::domain::models::BackendError;
use crate::domain::models::BackendErrorKind;
use crate::domain::models::BackendResponse;
use crate::domain::models::Message;
use crate::domain::models::Provider;
use crate::domain::models::Role;
use crate::domain::models::TokenUsage;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    role: String,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: i64,
    #[serde(default)]
    candidates_token_count: i64,
    #[serde(default)]
    total_token_count: i64,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

fn to_content(role: &str, text: &str) -> Content {
    return Content {
        role: role.to_string(),
        parts: vec![ContentPart {
            text: text.to_string(),
        }],
    };
}

fn to_error(status: u16, body: &str) -> BackendError {
    let mut message = serde_json::from_str::<ErrorResponse>(body)
        .map(|res| return res.error.message)
        .unwrap_or_default();
    if message.is_empty() {
        message = format!("Gemini returned status {status}");
    }

    if status == 400 && body.contains("API_KEY_INVALID") {
        return BackendError::new(BackendErrorKind::Auth, message);
    }

    return BackendError::from_status(status, message);
}

/// Gemini doesn't always report usage, in which case counts are estimated
/// from whitespace separated words of the last user message and the reply.
fn estimate_usage(messages: &[Message], reply: &str) -> TokenUsage {
    let prompt_tokens = messages
        .iter()
        .rev()
        .find(|message| return message.role == Role::User)
        .map(|message| return message.content.split_whitespace().count())
        .unwrap_or_default() as i64;
    let completion_tokens = reply.split_whitespace().count() as i64;

    return TokenUsage::new(
        prompt_tokens,
        completion_tokens,
        prompt_tokens + completion_tokens,
    );
}

pub struct Gemini {
    url: String,
    token: String,
    timeout: Duration,
}

impl Gemini {
    pub fn new(config: &Config) -> Gemini {
        return Gemini {
            url: config.gemini_url.to_string(),
            token: config.gemini_token.to_string(),
            timeout: config.request_timeout,
        };
    }
}

#[async_trait]
impl Backend for Gemini {
    fn name(&self) -> Provider {
        return Provider::Gemini;
    }

    fn has_credentials(&self) -> bool {
        return !self.token.trim().is_empty();
    }

    #[allow(clippy::implicit_return)]
    async fn get_completion(
        &self,
        model: &str,
        messages: &[Message],
    ) -> Result<BackendResponse, BackendError> {
        let mut req = CompletionRequest::default();
        for message in messages {
            match message.role {
                Role::System => {
                    req.system_instruction = Some(to_content("", &message.content));
                }
                Role::User => req.contents.push(to_content("user", &message.content)),
                Role::Assistant => req.contents.push(to_content("model", &message.content)),
            }
        }

        let res = reqwest::Client::new()
            .post(format!(
                "{url}/v1beta/models/{model}:generateContent?key={key}",
                url = self.url,
                key = self.token,
            ))
            .timeout(self.timeout)
            .json(&req)
            .send()
            .await
            .map_err(network_error)?;

        let status = res.status().as_u16();
        let body = res.text().await.map_err(network_error)?;

        if status >= 400 {
            tracing::error!(
                status = status,
                body = %body,
                "Failed to make completion request to Gemini"
            );
            return Err(to_error(status, &body));
        }

        let ores = serde_json::from_str::<GenerateContentResponse>(&body).map_err(|err| {
            return BackendError::new(
                BackendErrorKind::Other,
                format!("Unexpected response from Gemini, {err}"),
            );
        })?;
        tracing::debug!(body = ?ores, "Completion response");

        let content = match ores.candidates.first() {
            Some(candidate) => candidate
                .content
                .parts
                .iter()
                .map(|part| return part.text.to_string())
                .collect::<Vec<String>>()
                .join(""),
            None => {
                return Err(BackendError::new(
                    BackendErrorKind::Other,
                    "Gemini returned no candidates",
                ));
            }
        };

        let usage = match ores.usage_metadata {
            Some(metadata) => TokenUsage::new(
                metadata.prompt_token_count,
                metadata.candidates_token_count,
                metadata.total_token_count,
            ),
            None => estimate_usage(messages, &content),
        };

        return Ok(BackendResponse { content, usage });
    }
}

#[cfg(test)]
#[path = "openai_test.rs"]
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
use crate::domain::models::TokenUsage;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct MessageRequest {
    role: String,
    content: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<MessageRequest>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionChoiceResponse {
    message: MessageRequest,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoiceResponse>,
    #[serde(default)]
    usage: Option<TokenUsage>,
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

fn to_error(status: u16, body: &str) -> BackendError {
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .map(|res| return res.error)
        .unwrap_or_default();

    let mut message = detail.message;
    if message.is_empty() {
        message = format!("OpenAI returned status {status}");
    }

    if body.contains("insufficient_quota") {
        return BackendError::new(
            BackendErrorKind::RateLimit,
            format!("{message} Check your plan and billing details at https://platform.openai.com/account/billing"),
        );
    }

    return BackendError::from_status(status, message);
}

pub struct OpenAI {
    url: String,
    token: String,
    timeout: Duration,
}

impl OpenAI {
    pub fn new(config: &Config) -> OpenAI {
        return OpenAI {
            url: config.openai_url.to_string(),
            token: config.openai_token.to_string(),
            timeout: config.request_timeout,
        };
    }
}

#[async_trait]
impl Backend for OpenAI {
    fn name(&self) -> Provider {
        return Provider::OpenAI;
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
        let req = CompletionRequest {
            model: model.to_string(),
            messages: messages
                .iter()
                .map(|message| {
                    return MessageRequest {
                        role: message.role.to_string(),
                        content: message.content.to_string(),
                    };
                })
                .collect(),
        };

        let res = reqwest::Client::new()
            .post(format!("{url}/v1/chat/completions", url = self.url))
            .header("Authorization", format!("Bearer {}", self.token))
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
                "Failed to make completion request to OpenAI"
            );
            return Err(to_error(status, &body));
        }

        let ores = serde_json::from_str::<CompletionResponse>(&body).map_err(|err| {
            return BackendError::new(
                BackendErrorKind::Other,
                format!("Unexpected response from OpenAI, {err}"),
            );
        })?;
        tracing::debug!(body = ?ores, "Completion response");

        let content = match ores.choices.first() {
            Some(choice) => choice.message.content.to_string(),
            None => {
                return Err(BackendError::new(
                    BackendErrorKind::Other,
                    "OpenAI returned no choices",
                ));
            }
        };

        return Ok(BackendResponse {
            content,
            usage: ores.usage.unwrap_or_default(),
        });
    }
}

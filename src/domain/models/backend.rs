use async_trait::async_trait;

use super::BackendError;
use super::Message;
use super::Provider;
use super::TokenUsage;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendResponse {
    pub content: String,
    pub usage: TokenUsage,
}

#[async_trait]
pub trait Backend {
    fn name(&self) -> Provider;

    /// Whether an API credential was supplied. Checked before every request
    /// and at startup to find out which providers are usable.
    fn has_credentials(&self) -> bool;

    /// Sends the full ordered prompt to the provider and waits for the
    /// complete reply. The system message, if any, is the first entry of
    /// `messages`.
    async fn get_completion(
        &self,
        model: &str,
        messages: &[Message],
    ) -> Result<BackendResponse, BackendError>;
}

pub type BackendBox = Box<dyn Backend + Send + Sync>;

pub mod gemini;
pub mod openai;

use crate::configuration::Config;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendError;
use crate::domain::models::BackendErrorKind;
use crate::domain::models::ChatError;
use crate::domain::models::Provider;

/// Gemini carries its key in the query string, so the URL never makes it
/// into the message.
pub(crate) fn network_error(err: reqwest::Error) -> BackendError {
    let err = err.without_url();
    if err.is_timeout() {
        return BackendError::new(BackendErrorKind::Timeout, err.to_string());
    }

    return BackendError::new(BackendErrorKind::Network, err.to_string());
}

/// Holds one backend per provider and hands out the one a model belongs to.
pub struct BackendManager {
    backends: Vec<BackendBox>,
}

impl BackendManager {
    pub fn new(config: &Config) -> BackendManager {
        return BackendManager::with_backends(vec![
            Box::new(openai::OpenAI::new(config)),
            Box::new(gemini::Gemini::new(config)),
        ]);
    }

    pub fn with_backends(backends: Vec<BackendBox>) -> BackendManager {
        return BackendManager { backends };
    }

    pub fn get(&self, provider: Provider) -> Result<&BackendBox, ChatError> {
        if let Some(backend) = self
            .backends
            .iter()
            .find(|backend| return backend.name() == provider)
        {
            return Ok(backend);
        }

        return Err(ChatError::ModelClient(BackendError::new(
            BackendErrorKind::Other,
            format!("No backend implemented for {}", provider.label()),
        )));
    }

    /// Providers that have a credential configured.
    pub fn available(&self) -> Vec<Provider> {
        return self
            .backends
            .iter()
            .filter(|backend| return backend.has_credentials())
            .map(|backend| return backend.name())
            .collect();
    }
}

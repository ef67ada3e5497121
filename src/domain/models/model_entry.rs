use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Provider {
    OpenAI,
    Gemini,
}

impl Provider {
    pub fn label(&self) -> &'static str {
        match self {
            Provider::OpenAI => return "OpenAI",
            Provider::Gemini => return "Google",
        }
    }

    /// Environment variable holding the API credential for the provider.
    pub fn credential_env(&self) -> &'static str {
        match self {
            Provider::OpenAI => return "OPENAI_API_KEY",
            Provider::Gemini => return "GEMINI_API_KEY",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelEntry {
    pub id: &'static str,
    pub provider: Provider,
    pub display_name: &'static str,
}

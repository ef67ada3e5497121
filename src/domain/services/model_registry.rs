#[cfg(test)]
#[path = "model_registry_test.rs"]
mod tests;

use crate::domain::models::ChatError;
use crate::domain::models::ModelEntry;
use crate::domain::models::Provider;

static MODELS: [ModelEntry; 6] = [
    ModelEntry {
        id: "gpt-3.5-turbo",
        provider: Provider::OpenAI,
        display_name: "GPT-3.5 Turbo",
    },
    ModelEntry {
        id: "gpt-4",
        provider: Provider::OpenAI,
        display_name: "GPT-4",
    },
    ModelEntry {
        id: "gpt-4-turbo",
        provider: Provider::OpenAI,
        display_name: "GPT-4 Turbo",
    },
    ModelEntry {
        id: "gemini-pro",
        provider: Provider::Gemini,
        display_name: "Gemini Pro",
    },
    ModelEntry {
        id: "gemini-pro-vision",
        provider: Provider::Gemini,
        display_name: "Gemini Pro Vision",
    },
    ModelEntry {
        id: "gemini-1.5-flash",
        provider: Provider::Gemini,
        display_name: "Gemini 1.5 Flash",
    },
];

pub struct ModelRegistry {}

impl ModelRegistry {
    pub fn resolve(model_id: &str) -> Result<&'static ModelEntry, ChatError> {
        if let Some(entry) = MODELS.iter().find(|entry| return entry.id == model_id) {
            return Ok(entry);
        }

        return Err(ChatError::UnknownModel {
            model: model_id.to_string(),
            supported: ModelRegistry::ids().join(", "),
        });
    }

    /// All models, grouped by provider in display order.
    pub fn list_all() -> impl Iterator<Item = &'static ModelEntry> {
        return MODELS.iter();
    }

    pub fn ids() -> Vec<&'static str> {
        return MODELS.iter().map(|entry| return entry.id).collect();
    }
}

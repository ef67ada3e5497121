#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;

use super::ModelRegistry;
use crate::configuration::Config;
use crate::domain::models::ChatError;
use crate::domain::models::Message;
use crate::domain::models::Role;
use crate::domain::models::Session;
use crate::domain::models::TokenUsage;

fn normalize_system_message(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }

    return Some(text.to_string());
}

/// Owns the one live `Session`. Every mutation of the transcript, the active
/// model, the system message and the token totals goes through here.
pub struct Conversation {
    session: Session,
}

impl Conversation {
    pub fn new(model_id: &str, system_message: &str) -> Result<Conversation, ChatError> {
        let entry = ModelRegistry::resolve(model_id)?;

        return Ok(Conversation {
            session: Session::new(entry.id, normalize_system_message(system_message)),
        });
    }

    pub fn from_config(config: &Config) -> Result<Conversation, ChatError> {
        return Conversation::new(&config.model, &config.system);
    }

    pub fn messages(&self) -> &[Message] {
        return &self.session.messages;
    }

    pub fn model(&self) -> &str {
        return &self.session.current_model;
    }

    pub fn system_message(&self) -> Option<&str> {
        return self.session.system_message.as_deref();
    }

    pub fn append_user(&mut self, text: &str) {
        self.session.messages.push(Message::new(Role::User, text));
    }

    pub fn append_assistant(&mut self, text: &str, usage: TokenUsage) -> Result<(), ChatError> {
        if !usage.is_valid() {
            return Err(ChatError::InvalidUsage { usage });
        }

        self.session.token_totals = self.session.token_totals.add(&usage);
        self.session
            .messages
            .push(Message::new(Role::Assistant, text));

        return Ok(());
    }

    /// Drops the transcript and token totals. The model and system message
    /// carry over.
    pub fn clear(&mut self) {
        self.session.messages.clear();
        self.session.token_totals = TokenUsage::default();
    }

    pub fn set_system_message(&mut self, text: &str) {
        self.session.system_message = normalize_system_message(text);
    }

    /// Token totals are kept across model switches.
    pub fn set_model(&mut self, model_id: &str) -> Result<(), ChatError> {
        let entry = ModelRegistry::resolve(model_id)?;
        self.session.current_model = entry.id.to_string();

        return Ok(());
    }

    /// The exact message sequence to hand to a backend: the system message
    /// first when set, then the transcript in order.
    pub fn build_prompt(&self) -> Vec<Message> {
        let mut prompt = Vec::with_capacity(self.session.messages.len() + 1);
        if let Some(system_message) = &self.session.system_message {
            prompt.push(Message::new(Role::System, system_message));
        }
        prompt.extend(self.session.messages.iter().cloned());

        return prompt;
    }

    pub fn usage_snapshot(&self) -> TokenUsage {
        return self.session.token_totals;
    }

    pub fn snapshot(&self) -> Session {
        return self.session.clone();
    }

    /// Swaps in a loaded session. Nothing changes unless the session's model
    /// is known and its totals are sane.
    pub fn restore(&mut self, session: Session) -> Result<(), ChatError> {
        ModelRegistry::resolve(&session.current_model)?;
        if !session.token_totals.is_valid() {
            return Err(ChatError::InvalidUsage {
                usage: session.token_totals,
            });
        }

        self.session = session;
        return Ok(());
    }
}

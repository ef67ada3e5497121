use super::Message;
use super::TokenUsage;

/// Full mutable state of one conversation. The system message lives outside
/// of `messages` so it can be swapped without rewriting history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub messages: Vec<Message>,
    pub current_model: String,
    pub system_message: Option<String>,
    pub token_totals: TokenUsage,
}

impl Session {
    pub fn new(current_model: &str, system_message: Option<String>) -> Session {
        return Session {
            messages: vec![],
            current_model: current_model.to_string(),
            system_message,
            token_totals: TokenUsage::default(),
        };
    }
}

use super::Message;
use super::ModelEntry;
use super::TokenUsage;

#[derive(Debug)]
pub enum Event {
    AssistantReply(String),
    Error(String),
    Help(String),
    History(Option<String>, Vec<Message>),
    Info(String),
    ModelList(String, Vec<&'static ModelEntry>),
    TokenUsage(TokenUsage),
}

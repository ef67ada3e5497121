#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::sync::Notify;
use tokio::time;

use super::Conversation;
use super::ModelRegistry;
use super::SessionSummary;
use super::Sessions;
use crate::domain::models::BackendError;
use crate::domain::models::BackendErrorKind;
use crate::domain::models::BackendResponse;
use crate::domain::models::ChatError;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::Selector;
use crate::domain::models::SlashCommand;
use crate::infrastructure::backends::BackendManager;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /help - Show this help menu.
- /exit /quit - Exit the chat.
- /clear - Clear the conversation history and token totals.
- /save [NAME] - Save the conversation. Generates a timestamped name when NAME is omitted.
- /load - Pick a saved conversation to continue.
- /model [MODEL_ID] - Switch to another model. Token totals carry over.
- /models - List all available models.
- /system [TEXT] - Set the system message used from the next message on. Omit TEXT to clear it.
- /tokens - Show token usage for this conversation.
- /history - Show the conversation history.

HOTKEYS:
- CTRL+C - Cancel a pending response. Ignored at an empty prompt.
- CTRL+D - Exit the chat.
        "#;

    return text.trim().to_string();
}

/// One line per saved conversation, used for the `/load` picker and
/// `sessions list`.
pub fn format_summary(summary: &SessionSummary) -> String {
    let mut res = format!(
        "- (ID: {}) {}, Model: {}, Messages: {}, Tokens: {}",
        summary.id,
        summary.formatted_time(),
        summary.model,
        summary.message_count,
        summary.total_tokens
    );

    if let Some(line) = &summary.first_line {
        res = format!("{res}, {line}");
    }

    return res;
}

/// Runs every line the user enters against the live conversation and reports
/// back through `Event`s. Failures are reported, never returned; the only
/// errors bubbling up are a closed event channel or a broken selector.
pub struct ActionsService {
    conversation: Conversation,
    sessions: Sessions,
    backends: BackendManager,
    selector: Box<dyn Selector>,
    timeout: Duration,
    interrupt: Arc<Notify>,
    tx: mpsc::UnboundedSender<Event>,
}

impl ActionsService {
    pub fn new(
        conversation: Conversation,
        sessions: Sessions,
        backends: BackendManager,
        selector: Box<dyn Selector>,
        timeout: Duration,
        interrupt: Arc<Notify>,
        tx: mpsc::UnboundedSender<Event>,
    ) -> ActionsService {
        return ActionsService {
            conversation,
            sessions,
            backends,
            selector,
            timeout,
            interrupt,
            tx,
        };
    }

    pub fn conversation(&self) -> &Conversation {
        return &self.conversation;
    }

    fn error(&self, err: impl ToString) -> Result<()> {
        self.tx.send(Event::Error(err.to_string()))?;
        return Ok(());
    }

    fn info(&self, text: impl ToString) -> Result<()> {
        self.tx.send(Event::Info(text.to_string()))?;
        return Ok(());
    }

    /// Handles one line of input. Returns true when the user asked to quit.
    pub async fn handle(&mut self, line: &str) -> Result<bool> {
        let command = match SlashCommand::parse(line) {
            Some(command) => command,
            None => {
                self.chat(line).await?;
                return Ok(false);
            }
        };

        tracing::debug!(command = ?command, "Slash command");

        match command {
            SlashCommand::Help => {
                self.tx.send(Event::Help(help_text()))?;
            }
            SlashCommand::Quit => {
                return Ok(true);
            }
            SlashCommand::Clear => {
                self.conversation.clear();
                self.info("Conversation cleared.")?;
            }
            SlashCommand::Save(name) => {
                self.save(name.as_deref().unwrap_or_default()).await?;
            }
            SlashCommand::Load => {
                self.load_interactive().await?;
            }
            SlashCommand::Model(model_id) => {
                self.model_set(&model_id)?;
            }
            SlashCommand::Models => {
                self.tx.send(Event::ModelList(
                    self.conversation.model().to_string(),
                    ModelRegistry::list_all().collect(),
                ))?;
            }
            SlashCommand::System(text) => {
                self.conversation.set_system_message(&text);
                if self.conversation.system_message().is_some() {
                    self.info("System message updated. It applies from your next message.")?;
                } else {
                    self.info("System message cleared.")?;
                }
            }
            SlashCommand::Tokens => {
                self.tx
                    .send(Event::TokenUsage(self.conversation.usage_snapshot()))?;
            }
            SlashCommand::History => {
                self.tx.send(Event::History(
                    self.conversation.system_message().map(|text| return text.to_string()),
                    self.conversation.messages().to_vec(),
                ))?;
            }
            SlashCommand::Unknown(name) => {
                self.error(format!(
                    "Unknown command: {name}. Type /help to see the available commands."
                ))?;
            }
            SlashCommand::Invalid(message) => {
                self.error(message)?;
            }
        }

        return Ok(false);
    }

    async fn save(&self, name: &str) -> Result<()> {
        match self.sessions.save(&self.conversation.snapshot(), name).await {
            Ok(path) => {
                self.info(format!("Conversation saved to {}", path.display()))?;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to save conversation");
                self.error(err)?;
            }
        }

        return Ok(());
    }

    /// Loads a conversation by name or path, replacing the current one only
    /// when the file is valid.
    pub async fn load_from(&mut self, source: &str) -> Result<()> {
        let res = match self.sessions.load(source).await {
            Ok(session) => self.conversation.restore(session),
            Err(err) => Err(err),
        };

        match res {
            Ok(()) => {
                self.info(format!(
                    "Loaded conversation {source} ({} messages, model {})",
                    self.conversation.messages().len(),
                    self.conversation.model()
                ))?;
            }
            Err(err) => {
                tracing::error!(error = %err, source = source, "Failed to load conversation");
                self.error(err)?;
            }
        }

        return Ok(());
    }

    async fn load_interactive(&mut self) -> Result<()> {
        let summaries = match self.sessions.summaries().await {
            Ok(summaries) => summaries,
            Err(err) => {
                self.error(err)?;
                return Ok(());
            }
        };

        if summaries.is_empty() {
            self.info("No saved conversations found.")?;
            return Ok(());
        }

        let options = summaries
            .iter()
            .map(|summary| return format_summary(summary))
            .collect::<Vec<String>>();

        let idx = match self
            .selector
            .select("Which conversation would you like to load?", &options)?
        {
            Some(idx) if idx < summaries.len() => idx,
            _ => {
                self.info("Load cancelled.")?;
                return Ok(());
            }
        };

        let path = summaries[idx].path.to_string_lossy().to_string();
        return self.load_from(&path).await;
    }

    fn model_set(&mut self, model_id: &str) -> Result<()> {
        if let Err(err) = self.conversation.set_model(model_id) {
            self.error(err)?;
            return Ok(());
        }

        let entry = ModelRegistry::resolve(self.conversation.model())?;
        let mut text = format!(
            "Switched to {} ({}) from {}.",
            entry.display_name,
            entry.id,
            entry.provider.label()
        );
        if let Ok(backend) = self.backends.get(entry.provider) {
            if !backend.has_credentials() {
                text = format!(
                    "{text} No API key is set for {}, set {} to chat with it.",
                    entry.provider.label(),
                    entry.provider.credential_env()
                );
            }
        }

        self.info(text)?;
        return Ok(());
    }

    async fn complete(&self, prompt: &[Message]) -> Result<BackendResponse, ChatError> {
        let entry = ModelRegistry::resolve(self.conversation.model())?;
        let backend = self.backends.get(entry.provider)?;
        if !backend.has_credentials() {
            return Err(ChatError::ModelClient(BackendError::new(
                BackendErrorKind::Auth,
                format!(
                    "No API key configured for {}. Set {} to use {}.",
                    entry.provider.label(),
                    entry.provider.credential_env(),
                    entry.id
                ),
            )));
        }

        let res = tokio::select! {
            res = backend.get_completion(entry.id, prompt) => res,
            _ = time::sleep(self.timeout) => Err(BackendError::new(
                BackendErrorKind::Timeout,
                format!("No response after {} ms", self.timeout.as_millis()),
            )),
            _ = self.interrupt.notified() => Err(BackendError::new(
                BackendErrorKind::Interrupted,
                "Request cancelled",
            )),
        };

        return res.map_err(ChatError::from);
    }

    /// A failed turn keeps the user message in history but adds no reply.
    async fn chat(&mut self, text: &str) -> Result<()> {
        self.conversation.append_user(text);
        let prompt = self.conversation.build_prompt();

        let res = match self.complete(&prompt).await {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = %err, model = self.conversation.model(), "Chat turn failed");
                self.error(err)?;
                return Ok(());
            }
        };

        if let Err(err) = self
            .conversation
            .append_assistant(&res.content, res.usage)
        {
            tracing::error!(error = %err, "Backend reported invalid usage");
            self.error(err)?;
            return Ok(());
        }

        self.tx.send(Event::AssistantReply(res.content))?;

        return Ok(());
    }
}

#[cfg(test)]
#[path = "sessions_test.rs"]
mod tests;

use std::io;
use std::path;
use std::path::Path;

use chrono::DateTime;
use chrono::Local;
use chrono::NaiveDateTime;
use chrono::SecondsFormat;
use chrono::TimeZone;
use chrono::Utc;
use futures::stream;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use tokio::fs;

use super::ModelRegistry;
use crate::domain::models::ChatError;
use crate::domain::models::Message;
use crate::domain::models::Role;
use crate::domain::models::Session;
use crate::domain::models::TokenUsage;

const EXTENSION: &str = "json";

/// On-disk shape of a saved conversation. Only `current_model` and `messages`
/// are required, anything unrecognised is ignored. The aliases accept files
/// written by the earlier `conversation`/`model`/`token_usage` layout.
#[derive(Serialize, Deserialize)]
struct SessionRecord {
    #[serde(default)]
    version: String,
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    provider: String,
    #[serde(alias = "model")]
    current_model: String,
    #[serde(default)]
    system_message: Option<String>,
    #[serde(default, alias = "token_usage")]
    token_totals: TokenUsage,
    #[serde(alias = "conversation")]
    messages: Vec<Message>,
}

impl SessionRecord {
    fn from_session(session: &Session) -> SessionRecord {
        let provider = ModelRegistry::resolve(&session.current_model)
            .map(|entry| return entry.provider.to_string())
            .unwrap_or_default();

        return SessionRecord {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false),
            provider,
            current_model: session.current_model.to_string(),
            system_message: session.system_message.clone(),
            token_totals: session.token_totals,
            messages: session.messages.clone(),
        };
    }

    /// System-role entries never live in the transcript. Older files stored
    /// the system message inline, so the first one found is lifted out.
    fn into_session(self) -> Session {
        let mut system_message = self.system_message;
        let mut messages = Vec::with_capacity(self.messages.len());
        for message in self.messages {
            if message.role == Role::System {
                if system_message.is_none() && !message.content.trim().is_empty() {
                    system_message = Some(message.content);
                }
                continue;
            }
            messages.push(message);
        }

        return Session {
            messages,
            current_model: self.current_model,
            system_message,
            token_totals: self.token_totals,
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: String,
    pub path: path::PathBuf,
    pub timestamp: String,
    pub model: String,
    pub provider: String,
    pub message_count: usize,
    pub total_tokens: i64,
    pub first_line: Option<String>,
}

impl SessionSummary {
    fn new(id: &str, path: &Path, record: &SessionRecord) -> SessionSummary {
        let first_line = record
            .messages
            .iter()
            .find(|message| return message.role == Role::User)
            .map(|message| return message.headline(70));

        let mut provider = record.provider.to_string();
        if provider.is_empty() {
            if let Ok(entry) = ModelRegistry::resolve(&record.current_model) {
                provider = entry.provider.to_string();
            }
        }

        return SessionSummary {
            id: id.to_string(),
            path: path.to_path_buf(),
            timestamp: record.timestamp.to_string(),
            model: record.current_model.to_string(),
            provider,
            message_count: record
                .messages
                .iter()
                .filter(|message| return message.role != Role::System)
                .count(),
            total_tokens: record.token_totals.total_tokens,
            first_line,
        };
    }

    /// Saved-at time. Older files store a naive local time without an offset.
    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        if let Ok(time) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(time.with_timezone(&Utc));
        }

        let naive = NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
        return Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|time| return time.with_timezone(&Utc));
    }

    /// Saved-at time in local time, or the raw value when it isn't RFC 3339.
    pub fn formatted_time(&self) -> String {
        if let Ok(time) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return time
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string();
        }
        if self.timestamp.is_empty() {
            return "Unknown".to_string();
        }

        return self.timestamp.to_string();
    }
}

fn session_id(path: &Path) -> Option<String> {
    if path.extension()?.to_str()? != EXTENSION {
        return None;
    }

    return Some(path.file_stem()?.to_string_lossy().to_string());
}

pub struct Sessions {
    pub dir: path::PathBuf,
}

impl Sessions {
    pub fn new(dir: path::PathBuf) -> Sessions {
        return Sessions { dir };
    }

    pub fn create_id() -> String {
        return format!("conversation_{}", Local::now().format("%Y%m%d_%H%M%S"));
    }

    /// A bare name lands in the conversations directory with a `.json`
    /// extension, anything that looks like a path is used as is.
    pub fn resolve_path(&self, name: &str) -> path::PathBuf {
        let path = Path::new(name);
        if path.is_absolute() || path.components().count() > 1 {
            return path.to_path_buf();
        }

        if session_id(path).is_some() {
            return self.dir.join(name);
        }

        return self.dir.join(format!("{name}.{EXTENSION}"));
    }

    async fn read_record(&self, path: &Path) -> Result<SessionRecord, ChatError> {
        let payload = match fs::read_to_string(path).await {
            Ok(payload) => payload,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ChatError::IoNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(err) => return Err(ChatError::io_read(path, err)),
        };

        let record: SessionRecord = serde_json::from_str(&payload).map_err(|source| {
            return ChatError::CorruptSession {
                path: path.to_path_buf(),
                source,
            };
        })?;

        return Ok(record);
    }

    /// Lazily walks the conversations directory and yields the id of every
    /// saved conversation. Each call starts a fresh walk. A directory that
    /// doesn't exist yet is treated as empty.
    pub async fn list_available(&self) -> Result<BoxStream<'static, String>, ChatError> {
        let dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => Some(dir),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => return Err(ChatError::io_read(&self.dir, err)),
        };

        let ids = stream::unfold(dir, |dir| {
            return async move {
                let mut dir = dir?;
                loop {
                    match dir.next_entry().await {
                        Ok(Some(entry)) => {
                            if let Some(id) = session_id(&entry.path()) {
                                return Some((id, Some(dir)));
                            }
                        }
                        Ok(None) => return None,
                        Err(err) => {
                            tracing::warn!(error = ?err, "Stopped reading conversations directory");
                            return None;
                        }
                    }
                }
            };
        });

        return Ok(ids.boxed());
    }

    /// Summaries of every readable saved conversation, newest first.
    pub async fn summaries(&self) -> Result<Vec<SessionSummary>, ChatError> {
        let ids = self.list_available().await?.collect::<Vec<String>>().await;

        let mut summaries: Vec<SessionSummary> = vec![];
        for id in ids {
            let path = self.resolve_path(&id);
            match self.read_record(&path).await {
                Ok(record) => summaries.push(SessionSummary::new(&id, &path, &record)),
                Err(err) => {
                    tracing::warn!(error = %err, id = %id, "Skipping unreadable conversation");
                }
            }
        }

        // Unparseable timestamps sort last.
        summaries.sort_by(|a, b| {
            return (b.saved_at(), &b.id).cmp(&(a.saved_at(), &a.id));
        });

        return Ok(summaries);
    }

    pub async fn load(&self, source: &str) -> Result<Session, ChatError> {
        let path = self.resolve_path(source);
        let record = self.read_record(&path).await?;
        tracing::debug!(path = ?path, messages = record.messages.len(), "Loaded conversation");

        return Ok(record.into_session());
    }

    /// Writes the session, replacing whatever is at the destination. An empty
    /// name gets a timestamped one.
    pub async fn save(&self, session: &Session, name: &str) -> Result<path::PathBuf, ChatError> {
        let mut name = name.trim().to_string();
        if name.is_empty() {
            name = Sessions::create_id();
        }

        let path = self.resolve_path(&name);
        let payload = serde_json::to_string_pretty(&SessionRecord::from_session(session))
            .map_err(|err| {
                return ChatError::io_write(&path, io::Error::new(io::ErrorKind::InvalidData, err));
            })?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|err| return ChatError::io_write(parent, err))?;
            }
        }

        fs::write(&path, payload.as_bytes())
            .await
            .map_err(|err| return ChatError::io_write(&path, err))?;

        tracing::debug!(path = ?path, messages = session.messages.len(), "Saved conversation");

        return Ok(path);
    }

    pub async fn delete(&self, id: &str) -> Result<(), ChatError> {
        let path = self.resolve_path(id);
        if !path.exists() {
            return Err(ChatError::IoNotFound { path });
        }

        fs::remove_file(&path)
            .await
            .map_err(|err| return ChatError::io_write(&path, err))?;

        return Ok(());
    }

    /// Removes every saved conversation but leaves the directory and any
    /// other files in it alone.
    pub async fn delete_all(&self) -> Result<usize, ChatError> {
        let ids = self.list_available().await?.collect::<Vec<String>>().await;
        for id in &ids {
            self.delete(id).await?;
        }

        return Ok(ids.len());
    }
}

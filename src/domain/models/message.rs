#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use chrono::DateTime;
use chrono::Utc;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Role;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Message {
        return Message {
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
        };
    }

    /// First line of the message, cut down to `max` characters for list views.
    pub fn headline(&self, max: usize) -> String {
        let line = self.content.split('\n').next().unwrap_or_default();
        if line.chars().count() <= max {
            return line.to_string();
        }

        let cut = line.chars().take(max.saturating_sub(3)).collect::<String>();
        return format!("{cut}...");
    }
}

use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Label used when printing the transcript.
    pub fn label(&self) -> &'static str {
        match self {
            Role::System => return "System",
            Role::User => return "You",
            Role::Assistant => return "AI",
        }
    }
}

#[cfg(test)]
#[path = "usage_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

/// Token counts as reported by a model backend. Counts are signed so that a
/// misbehaving backend reporting negative values can be rejected instead of
/// silently wrapping.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: i64,
    #[serde(default)]
    pub completion_tokens: i64,
    #[serde(default)]
    pub total_tokens: i64,
}

impl TokenUsage {
    pub fn new(prompt_tokens: i64, completion_tokens: i64, total_tokens: i64) -> TokenUsage {
        return TokenUsage {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        };
    }

    pub fn is_valid(&self) -> bool {
        return self.prompt_tokens >= 0 && self.completion_tokens >= 0 && self.total_tokens >= 0;
    }

    pub fn is_zero(&self) -> bool {
        return *self == TokenUsage::default();
    }

    pub fn add(&self, other: &TokenUsage) -> TokenUsage {
        return TokenUsage {
            prompt_tokens: self.prompt_tokens.saturating_add(other.prompt_tokens),
            completion_tokens: self.completion_tokens.saturating_add(other.completion_tokens),
            total_tokens: self.total_tokens.saturating_add(other.total_tokens),
        };
    }
}

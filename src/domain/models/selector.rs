use anyhow::Result;

/// Picks one entry out of a list shown to the user. Returns `None` when the
/// user backs out.
pub trait Selector {
    fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>>;
}

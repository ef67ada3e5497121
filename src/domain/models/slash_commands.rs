#[cfg(test)]
#[path = "slash_commands_test.rs"]
mod tests;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Quit,
    Clear,
    Save(Option<String>),
    Load,
    Model(String),
    Models,
    System(String),
    Tokens,
    History,
    Unknown(String),
    Invalid(String),
}

impl SlashCommand {
    /// Returns `None` when the text is a chat message rather than a command.
    pub fn parse(text: &str) -> Option<SlashCommand> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }

        let (prefix, args) = match text.split_once(char::is_whitespace) {
            Some((prefix, args)) => (prefix, args.trim()),
            None => (text, ""),
        };

        let cmd = match prefix.to_lowercase().as_str() {
            "/help" => SlashCommand::Help,
            "/exit" | "/quit" => SlashCommand::Quit,
            "/clear" => SlashCommand::Clear,
            "/save" => {
                if args.is_empty() {
                    SlashCommand::Save(None)
                } else {
                    SlashCommand::Save(Some(args.to_string()))
                }
            }
            "/load" => SlashCommand::Load,
            "/model" => {
                if args.is_empty() {
                    SlashCommand::Invalid(
                        "You must specify a model name with `/model`. Run `/models` to see them all."
                            .to_string(),
                    )
                } else {
                    SlashCommand::Model(args.to_string())
                }
            }
            "/models" => SlashCommand::Models,
            "/system" => SlashCommand::System(args.to_string()),
            "/tokens" => SlashCommand::Tokens,
            "/history" => SlashCommand::History,
            _ => SlashCommand::Unknown(prefix.to_string()),
        };

        return Some(cmd);
    }
}

use super::SlashCommand;

#[test]
fn it_parse_empty_string() {
    assert!(SlashCommand::parse("").is_none());
}
#[test]
fn it_parse_space_only() {
    assert!(SlashCommand::parse(" ").is_none());
}
#[test]
fn it_parse_chat_text() {
    assert!(SlashCommand::parse("Hello there").is_none());
}
#[test]
fn it_parse_invalid_prefix() {
    assert!(SlashCommand::parse("!quit").is_none());
}
#[test]
fn it_parse_single_slash() {
    assert_eq!(
        SlashCommand::parse("/"),
        Some(SlashCommand::Unknown("/".to_string()))
    );
}
#[test]
fn it_parse_unknown() {
    assert_eq!(
        SlashCommand::parse("/unknown arg"),
        Some(SlashCommand::Unknown("/unknown".to_string()))
    );
}

#[test]
fn it_is_help() {
    assert_eq!(SlashCommand::parse("/help"), Some(SlashCommand::Help));
}
#[test]
fn it_is_quit() {
    assert_eq!(SlashCommand::parse("/quit"), Some(SlashCommand::Quit));
}
#[test]
fn it_is_exit() {
    assert_eq!(SlashCommand::parse("/exit"), Some(SlashCommand::Quit));
}
#[test]
fn it_is_not_quit() {
    assert_ne!(SlashCommand::parse("/clear"), Some(SlashCommand::Quit));
}
#[test]
fn it_ignores_case_and_padding() {
    assert_eq!(SlashCommand::parse("  /CLEAR  "), Some(SlashCommand::Clear));
}

#[test]
fn it_is_save_with_name() {
    assert_eq!(
        SlashCommand::parse("/save my chat"),
        Some(SlashCommand::Save(Some("my chat".to_string())))
    );
}
#[test]
fn it_is_save_without_name() {
    assert_eq!(SlashCommand::parse("/save"), Some(SlashCommand::Save(None)));
}
#[test]
fn it_is_load() {
    assert_eq!(SlashCommand::parse("/load"), Some(SlashCommand::Load));
}

#[test]
fn it_is_model_set() {
    assert_eq!(
        SlashCommand::parse("/model gpt-4"),
        Some(SlashCommand::Model("gpt-4".to_string()))
    );
}
#[test]
fn it_is_model_set_without_name() {
    let cmd = SlashCommand::parse("/model").unwrap();
    assert!(matches!(cmd, SlashCommand::Invalid(_)));
}
#[test]
fn it_is_model_list() {
    assert_eq!(SlashCommand::parse("/models"), Some(SlashCommand::Models));
}

#[test]
fn it_is_system() {
    assert_eq!(
        SlashCommand::parse("/system You are terse."),
        Some(SlashCommand::System("You are terse.".to_string()))
    );
}
#[test]
fn it_is_system_without_text() {
    assert_eq!(
        SlashCommand::parse("/system"),
        Some(SlashCommand::System("".to_string()))
    );
}

#[test]
fn it_is_tokens() {
    assert_eq!(SlashCommand::parse("/tokens"), Some(SlashCommand::Tokens));
}
#[test]
fn it_is_history() {
    assert_eq!(SlashCommand::parse("/history"), Some(SlashCommand::History));
}

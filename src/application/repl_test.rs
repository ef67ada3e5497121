use chrono::TimeZone;
use chrono::Utc;

use super::format_event;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::Role;
use crate::domain::models::TokenUsage;
use crate::domain::services::ModelRegistry;

#[test]
fn it_formats_replies_and_errors() {
    insta::assert_snapshot!(format_event(&Event::AssistantReply("hello".to_string())), @"AI: hello");
    insta::assert_snapshot!(format_event(&Event::Error("rate limited".to_string())), @"Error: rate limited");
    insta::assert_snapshot!(format_event(&Event::Info("Conversation cleared.".to_string())), @"Conversation cleared.");
}

#[test]
fn it_formats_token_usage() {
    let res = format_event(&Event::TokenUsage(TokenUsage::new(5, 1, 6)));
    assert_eq!(
        res,
        "Token usage:\n  Prompt tokens: 5\n  Completion tokens: 1\n  Total tokens: 6"
    );
}

#[test]
fn it_formats_model_lists() {
    let res = format_event(&Event::ModelList(
        "gemini-pro".to_string(),
        ModelRegistry::list_all().collect(),
    ));

    let lines = res.lines().collect::<Vec<&str>>();
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[0], "OpenAI models:");
    assert_eq!(lines[1], "  - gpt-3.5-turbo (GPT-3.5 Turbo)");
    assert_eq!(lines[4], "Google models:");
    assert_eq!(lines[5], "  - gemini-pro (Gemini Pro) [current]");
}

#[test]
fn it_formats_empty_history() {
    let res = format_event(&Event::History(None, vec![]));
    insta::assert_snapshot!(res, @"No messages yet.");
}

#[test]
fn it_formats_history_in_order() {
    let mut first = Message::new(Role::User, "hi");
    first.timestamp = Utc.with_ymd_and_hms(2026, 10, 18, 10, 0, 0).unwrap();
    let mut second = Message::new(Role::Assistant, "hello");
    second.timestamp = Utc.with_ymd_and_hms(2026, 10, 18, 10, 0, 1).unwrap();

    let res = format_event(&Event::History(
        Some("You are terse.".to_string()),
        vec![first, second],
    ));

    let lines = res.lines().collect::<Vec<&str>>();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "System: You are terse.");
    assert!(lines[1].ends_with("] You: hi"));
    assert!(lines[2].ends_with("] AI: hello"));
}

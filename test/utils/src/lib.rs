/// A conversation saved by the older layout, with the system message stored
/// inline and no per-message timestamps.
pub fn legacy_session_fixture() -> &'static str {
    return r#"
{
  "timestamp": "2024-03-01T09:30:12.123456",
  "model": "gpt-4",
  "provider": "OpenAI",
  "token_usage": {
    "prompt_tokens": 10,
    "completion_tokens": 20,
    "total_tokens": 30
  },
  "conversation": [
    {"role": "system", "content": "You are a helpful AI assistant."},
    {"role": "user", "content": "What is Rust?"},
    {"role": "assistant", "content": "A systems programming language."}
  ]
}
"#
    .trim();
}

/// A conversation in the current layout carrying fields this version doesn't
/// know about.
pub fn session_file_fixture() -> &'static str {
    return r#"
{
  "version": "9.9.9",
  "timestamp": "2026-10-18T10:00:00+00:00",
  "provider": "gemini",
  "current_model": "gemini-pro",
  "system_message": "You are terse.",
  "labels": ["work", "later"],
  "messages": [
    {"role": "user", "content": "hi", "timestamp": "2026-10-18T10:00:00Z", "attachments": []},
    {"role": "assistant", "content": "hello", "timestamp": "2026-10-18T10:00:01Z"}
  ]
}
"#
    .trim();
}

#[cfg(test)]
#[path = "repl_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use chrono::Local;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use owo_colors::OwoColorize;
use owo_colors::Stream;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::mpsc;
use tokio::sync::Notify;

use crate::configuration::Config;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::Role;
use crate::domain::models::Selector;
use crate::domain::models::SlashCommand;
use crate::domain::services::actions::ActionsService;
use crate::domain::services::Conversation;
use crate::domain::services::Sessions;
use crate::infrastructure::backends::BackendManager;

pub struct DialoguerSelector {}

impl Selector for DialoguerSelector {
    fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>> {
        let idx = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(0)
            .items(items)
            .interact_opt()?;

        return Ok(idx);
    }
}

fn format_message(message: &Message) -> String {
    let time = message.timestamp.with_timezone(&Local).format("%H:%M:%S");
    return format!("[{time}] {}: {}", message.role.label(), message.content);
}

/// Plain text rendering of an event. Colors are added when printing.
pub fn format_event(event: &Event) -> String {
    match event {
        Event::AssistantReply(text) => {
            return format!("{}: {text}", Role::Assistant.label());
        }
        Event::Error(text) => return format!("Error: {text}"),
        Event::Help(text) => return text.to_string(),
        Event::Info(text) => return text.to_string(),
        Event::History(system_message, messages) => {
            if system_message.is_none() && messages.is_empty() {
                return "No messages yet.".to_string();
            }

            let mut lines = vec![];
            if let Some(text) = system_message {
                lines.push(format!("{}: {text}", Role::System.label()));
            }
            lines.extend(messages.iter().map(format_message));

            return lines.join("\n");
        }
        Event::ModelList(current, models) => {
            let mut lines = vec![];
            let mut provider = None;
            for entry in models {
                if provider != Some(entry.provider) {
                    provider = Some(entry.provider);
                    lines.push(format!("{} models:", entry.provider.label()));
                }

                let mut line = format!("  - {} ({})", entry.id, entry.display_name);
                if entry.id == current.as_str() {
                    line = format!("{line} [current]");
                }
                lines.push(line);
            }

            return lines.join("\n");
        }
        Event::TokenUsage(usage) => {
            return [
                "Token usage:".to_string(),
                format!("  Prompt tokens: {}", usage.prompt_tokens),
                format!("  Completion tokens: {}", usage.completion_tokens),
                format!("  Total tokens: {}", usage.total_tokens),
            ]
            .join("\n");
        }
    }
}

fn print_event(event: &Event) {
    let text = format_event(event);
    match event {
        Event::AssistantReply(_) => {
            println!(
                "{}\n",
                text.if_supports_color(Stream::Stdout, |text| return text.green())
            );
        }
        Event::Error(_) => {
            eprintln!(
                "{}",
                text.if_supports_color(Stream::Stderr, |text| return text.red())
            );
        }
        Event::Info(_) => {
            println!(
                "{}",
                text.if_supports_color(Stream::Stdout, |text| return text.cyan())
            );
        }
        _ => println!("{text}"),
    }
}

fn drain_events(rx: &mut mpsc::UnboundedReceiver<Event>) {
    while let Ok(event) = rx.try_recv() {
        print_event(&event);
    }
}

fn print_welcome(conversation: &Conversation, backends: &BackendManager) {
    let providers = backends
        .available()
        .iter()
        .map(|provider| return provider.label())
        .collect::<Vec<&str>>()
        .join(", ");

    println!(
        "{}",
        format!("termchat {}", env!("CARGO_PKG_VERSION"))
            .if_supports_color(Stream::Stdout, |text| return text.bold())
    );
    println!("Model: {}", conversation.model());
    println!("Providers with API keys: {providers}");
    println!("Type /help for commands, /quit to exit\n");
}

/// Runs the chat loop until the user quits.
pub async fn start(config: Config) -> Result<()> {
    let backends = BackendManager::new(&config);
    if backends.available().is_empty() {
        bail!("No API keys found. Set OPENAI_API_KEY or GEMINI_API_KEY to start chatting.");
    }

    let conversation = Conversation::from_config(&config)?;
    print_welcome(&conversation, &backends);

    let interrupt = Arc::new(Notify::new());
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let mut service = ActionsService::new(
        conversation,
        Sessions::new(config.sessions_dir.clone()),
        backends,
        Box::new(DialoguerSelector {}),
        config.request_timeout,
        interrupt.clone(),
        tx,
    );

    // Nobody waits on the notify at the prompt, so Ctrl+C there is dropped.
    let listener = tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            interrupt.notify_waiters();
        }
    });

    if let Some(source) = &config.load {
        service.load_from(source).await?;
        drain_events(&mut rx);
    }

    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline("You: ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                if SlashCommand::parse(line).is_none() {
                    println!(
                        "{}",
                        "Thinking...".if_supports_color(Stream::Stdout, |text| return text.dimmed())
                    );
                }

                let quit = service.handle(line).await?;
                drain_events(&mut rx);
                if quit {
                    println!("Goodbye!");
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                listener.abort();
                bail!(format!("Input error: {err}"));
            }
        }
    }

    listener.abort();
    return Ok(());
}

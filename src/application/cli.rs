use std::env;
use std::io;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgGroup;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use owo_colors::OwoColorize;
use owo_colors::Stream;
use strum::VariantNames;
use tokio::fs;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::services::actions::format_summary;
use crate::domain::services::actions::help_text;
use crate::domain::services::ModelRegistry;
use crate::domain::services::Sessions;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

async fn print_sessions_list(sessions: &Sessions) -> Result<()> {
    let summaries = sessions
        .summaries()
        .await?
        .iter()
        .map(|summary| {
            return format_summary(summary);
        })
        .collect::<Vec<String>>();

    if summaries.is_empty() {
        println!("There are no saved conversations. Use /save during a chat to keep one.");
    } else {
        println!("{}", summaries.join("\n"));
    }

    return Ok(());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default_value(ConfigKey::ConfigFile);
    let config_file_path = std::path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    fs::write(&config_file_path, Config::serialize_default(&build())).await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for termchat")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running termchat with environment variable RUST_LOG=termchat")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn subcommand_sessions_delete() -> Command {
    return Command::new("delete")
        .about("Delete one or all saved conversations.")
        .arg(
            clap::Arg::new("session-id")
                .short('i')
                .long("id")
                .help("Conversation ID")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("all")
                .long("all")
                .help("Delete all saved conversations.")
                .action(ArgAction::SetTrue),
        )
        .group(
            ArgGroup::new("delete-args")
                .args(["session-id", "all"])
                .required(true),
        );
}

fn subcommand_sessions() -> Command {
    return Command::new("sessions")
        .about("Manage saved conversations.")
        .arg_required_else_help(true)
        .subcommand(Command::new("dir").about("Print the conversations directory path."))
        .subcommand(
            Command::new("list")
                .about("List all saved conversations with their ids, models and token totals."),
        )
        .subcommand(subcommand_sessions_delete());
}

fn arg_model() -> Arg {
    return Arg::new(ConfigKey::Model.to_string())
        .short('m')
        .long(ConfigKey::Model.to_string())
        .env("TERMCHAT_MODEL")
        .num_args(1)
        .help(format!(
            "The model to start chatting with. [default: {}]",
            Config::default_value(ConfigKey::Model)
        ))
        .value_parser(PossibleValuesParser::new(ModelRegistry::ids()));
}

fn arg_system() -> Arg {
    return Arg::new(ConfigKey::System.to_string())
        .short('s')
        .long(ConfigKey::System.to_string())
        .env("TERMCHAT_SYSTEM")
        .num_args(1)
        .help(format!(
            "The system message sent ahead of every conversation. [default: {}]",
            Config::default_value(ConfigKey::System)
        ));
}

fn arg_load() -> Arg {
    return Arg::new(ConfigKey::Load.to_string())
        .short('l')
        .long(ConfigKey::Load.to_string())
        .num_args(1)
        .help("Name or path of a saved conversation to continue.");
}

fn subcommand_chat() -> Command {
    return Command::new("chat")
        .about("Start a new chat. This is the default when no subcommand is given.")
        .arg(arg_model())
        .arg(arg_system())
        .arg(arg_load());
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") || line.starts_with("HOTKEYS:") {
                return format!("CHAT {line}")
                    .if_supports_color(Stream::Stdout, |text| {
                        return text.bold().underline().to_string();
                    })
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("termchat")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_chat())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .subcommand(subcommand_sessions())
        .arg(arg_model())
        .arg(arg_system())
        .arg(arg_load())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("TERMCHAT_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default_value(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::SessionsDir.to_string())
                .long(ConfigKey::SessionsDir.to_string())
                .env("TERMCHAT_SESSIONS_DIR")
                .num_args(1)
                .help(format!("Directory saved conversations are written to and loaded from. [default: {}]", Config::default_value(ConfigKey::SessionsDir)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::RequestTimeout.to_string())
                .long(ConfigKey::RequestTimeout.to_string())
                .env("TERMCHAT_REQUEST_TIMEOUT")
                .num_args(1)
                .help(format!("Time to wait in milliseconds for a model to reply before giving up. [default: {}]", Config::default_value(ConfigKey::RequestTimeout)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::OpenAiURL.to_string())
                .long(ConfigKey::OpenAiURL.to_string())
                .env("TERMCHAT_OPENAI_URL")
                .num_args(1)
                .help(format!("OpenAI API URL. Can be swapped to a compatible proxy. [default: {}]", Config::default_value(ConfigKey::OpenAiURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::OpenAiToken.to_string())
                .long(ConfigKey::OpenAiToken.to_string())
                .env("OPENAI_API_KEY")
                .hide_env_values(true)
                .num_args(1)
                .help("OpenAI API token used for GPT models.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::GeminiURL.to_string())
                .long(ConfigKey::GeminiURL.to_string())
                .env("TERMCHAT_GEMINI_URL")
                .num_args(1)
                .help(format!("Google Gemini API URL. [default: {}]", Config::default_value(ConfigKey::GeminiURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::GeminiToken.to_string())
                .long(ConfigKey::GeminiToken.to_string())
                .env("GEMINI_API_KEY")
                .hide_env_values(true)
                .num_args(1)
                .help("Google Gemini API token used for Gemini models.")
                .global(true),
        );
}

async fn load_config(matches: &ArgMatches, subcmd_matches: Option<&ArgMatches>) -> Result<Config> {
    let mut all_matches = vec![matches];
    if let Some(subcmd_matches) = subcmd_matches {
        all_matches.push(subcmd_matches);
    }

    return Config::load(&build(), all_matches).await;
}

/// Parses the command line. Returns the config to start a chat with, or
/// `None` when a subcommand already did all the work.
pub async fn parse() -> Result<Option<Config>> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    let log_dir = env::var("TERMCHAT_LOG_DIR").unwrap_or_else(|_| {
                        return dirs::cache_dir()
                            .unwrap_or_default()
                            .join("termchat")
                            .to_string_lossy()
                            .to_string();
                    });
                    println!(
                        "{}",
                        std::path::Path::new(&log_dir).join("debug.log").display()
                    );
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(None);
        }
        Some(("chat", subcmd_matches)) => {
            return Ok(Some(load_config(&matches, Some(subcmd_matches)).await?));
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(None);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(None);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(&build()));
                return Ok(None);
            }
            Some(("path", _)) => {
                println!("{}", Config::default_value(ConfigKey::ConfigFile));
                return Ok(None);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(None);
            }
        },
        Some(("sessions", subcmd_matches)) => {
            let config = load_config(&matches, Some(subcmd_matches)).await?;
            let sessions = Sessions::new(config.sessions_dir);

            match subcmd_matches.subcommand() {
                Some(("dir", _)) => {
                    println!("{}", sessions.dir.display());
                }
                Some(("list", _)) => {
                    print_sessions_list(&sessions).await?;
                }
                Some(("delete", delete_matches)) => {
                    if let Some(session_id) = delete_matches.get_one::<String>("session-id") {
                        sessions.delete(session_id).await?;
                        println!("Deleted conversation {session_id}");
                    } else if delete_matches.get_flag("all") {
                        let count = sessions.delete_all().await?;
                        println!("Deleted {count} saved conversations");
                    } else {
                        subcommand_sessions_delete().print_long_help()?;
                    }
                }
                _ => {
                    subcommand_sessions().print_long_help()?;
                }
            }

            return Ok(None);
        }
        _ => {
            return Ok(Some(load_config(&matches, None).await?));
        }
    }
}

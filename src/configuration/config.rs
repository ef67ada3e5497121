#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::collections::HashMap;
use std::path;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    Model,
    System,
    Load,
    ConfigFile,
    SessionsDir,
    #[strum(serialize = "openai-token")]
    OpenAiToken,
    #[strum(serialize = "openai-url")]
    OpenAiURL,
    GeminiToken,
    GeminiURL,
    RequestTimeout,
}

/// Everything a chat needs to start, resolved from defaults, the config file
/// and the command line in that order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub model: String,
    pub system: String,
    pub load: Option<String>,
    pub config_file: path::PathBuf,
    pub sessions_dir: path::PathBuf,
    pub openai_token: String,
    pub openai_url: String,
    pub gemini_token: String,
    pub gemini_url: String,
    pub request_timeout: Duration,
}

impl Config {
    pub fn default_value(key: ConfigKey) -> String {
        let config_path = dirs::config_dir()
            .unwrap_or_default()
            .join("termchat/config.toml");
        let sessions_path = dirs::data_dir()
            .unwrap_or_default()
            .join("termchat/conversations");

        let res = match key {
            ConfigKey::Model => "gpt-3.5-turbo",
            ConfigKey::System => "You are a helpful AI assistant.",
            ConfigKey::OpenAiToken => "",
            ConfigKey::OpenAiURL => "https://api.openai.com",
            ConfigKey::GeminiToken => "",
            ConfigKey::GeminiURL => "https://generativelanguage.googleapis.com",
            ConfigKey::RequestTimeout => "60000",

            // Special
            ConfigKey::Load => "",
            ConfigKey::ConfigFile => return config_path.to_string_lossy().to_string(),
            ConfigKey::SessionsDir => return sessions_path.to_string_lossy().to_string(),
        };

        return res.to_string();
    }

    fn from_values(values: &HashMap<ConfigKey, String>) -> Result<Config> {
        let get = |key: ConfigKey| {
            return values
                .get(&key)
                .map(|val| return val.to_string())
                .unwrap_or_default();
        };

        let timeout = get(ConfigKey::RequestTimeout);
        let timeout_ms = match timeout.parse::<u64>() {
            Ok(val) if val > 0 => val,
            _ => bail!(format!(
                "Invalid value for '{}': {timeout}\nExpected a positive number of milliseconds",
                ConfigKey::RequestTimeout
            )),
        };

        let load = get(ConfigKey::Load);

        return Ok(Config {
            model: get(ConfigKey::Model),
            system: get(ConfigKey::System),
            load: if load.is_empty() { None } else { Some(load) },
            config_file: path::PathBuf::from(get(ConfigKey::ConfigFile)),
            sessions_dir: path::PathBuf::from(get(ConfigKey::SessionsDir)),
            openai_token: get(ConfigKey::OpenAiToken),
            openai_url: get(ConfigKey::OpenAiURL).trim_end_matches('/').to_string(),
            gemini_token: get(ConfigKey::GeminiToken),
            gemini_url: get(ConfigKey::GeminiURL).trim_end_matches('/').to_string(),
            request_timeout: Duration::from_millis(timeout_ms),
        });
    }

    pub async fn load(cmd: &Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<Config> {
        let mut values = ConfigKey::iter()
            .map(|key| return (key, Config::default_value(key)))
            .collect::<HashMap<ConfigKey, String>>();

        let mut config_file = Config::default_value(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }
        values.insert(ConfigKey::ConfigFile, config_file.to_string());

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(&config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                if key == ConfigKey::ConfigFile {
                    continue;
                }

                if let Some(val) = doc.get(&key.to_string()) {
                    // Use clap value parsers to do validation.
                    let mut possible_values = vec![];
                    if let Some(arg) = cmd
                        .get_arguments()
                        .find(|e| return e.get_long() == Some(key.to_string().as_str()))
                    {
                        possible_values = arg
                            .get_possible_values()
                            .iter()
                            .map(|e| return e.get_name().to_string())
                            .collect::<Vec<String>>();
                    }

                    if let Some(val_int) = val.as_integer() {
                        values.insert(key, val_int.to_string());
                    } else if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        if !possible_values.is_empty()
                            && !possible_values.contains(&val_str.to_string())
                        {
                            bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}", possible_values.join(", ")));
                        }
                        values.insert(key, val_str.to_string());
                    } else {
                        bail!(format!(
                            "config.toml has an invalid value for key '{key}': {val}"
                        ));
                    }
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    values.insert(key, val.to_string());
                }
            }
        }

        let config = Config::from_values(&values)?;

        tracing::debug!(
            model = config.model,
            load = ?config.load,
            config_file = ?config.config_file,
            sessions_dir = ?config.sessions_dir,
            openai_url = config.openai_url,
            gemini_url = config.gemini_url,
            request_timeout = ?config.request_timeout,
            "config"
        );

        return Ok(config);
    }

    pub fn serialize_default(cmd: &Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile || key == ConfigKey::Load {
                    return None;
                }

                let arg = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))?;

                let mut description = arg
                    .get_help()
                    .map(|help| return help.to_string())
                    .unwrap_or_default()
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                if !arg.get_possible_values().is_empty() {
                    let possible_values = arg
                        .get_possible_values()
                        .iter()
                        .map(|e| return e.get_name().to_string())
                        .collect::<Vec<String>>()
                        .join(", ");
                    description = format!("{description} [possible values: {possible_values}]");
                }

                let mut val = Config::default_value(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<i64>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = {val:?}");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}

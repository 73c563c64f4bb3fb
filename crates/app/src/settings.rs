//! Application settings, read from `settings.toml` with environment
//! overrides (`ORGANIZZE_BOT_TELEGRAM__TOKEN` and friends). Credentials
//! live here and are never logged.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level filter, e.g. "info" or "debug".
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Organizze {
    pub email: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
    /// Chats allowed to use the bot. Empty denies everyone.
    #[serde(default)]
    pub allowed_chat_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct Assistant {
    pub api_key: String,
    /// Gemini model name; a default is used when absent.
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub organizze: Organizze,
    pub telegram: Telegram,
    pub assistant: Assistant,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("ORGANIZZE_BOT").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

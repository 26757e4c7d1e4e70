use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::level_filters::LevelFilter;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Empty means every user may talk to the bot
    #[serde(default)]
    pub allowed_user_ids: Vec<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load from a TOML file, then apply `BOT_TOKEN` / `LOG_LEVEL` from the environment.
    /// A missing file is not an error; the environment alone can configure the bot.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = lookup("BOT_TOKEN").filter(|t| !t.trim().is_empty()) {
            self.telegram.bot_token = token;
        }
        if let Some(level) = lookup("LOG_LEVEL").filter(|l| !l.trim().is_empty()) {
            self.logging.level = level;
        }
        self
    }

    /// The configured level as a tracing filter. Accepts `INFO` as well as `info`,
    /// and the `WARNING` / `CRITICAL` / `FATAL` spellings used by other loggers.
    pub fn log_level(&self) -> Result<LevelFilter> {
        let level = self.logging.level.trim().to_lowercase();
        let level = match level.as_str() {
            "" => default_log_level(),
            "warning" => "warn".to_string(),
            "critical" | "fatal" => "error".to_string(),
            _ => level,
        };
        level
            .parse::<LevelFilter>()
            .with_context(|| format!("Invalid log level '{}'", self.logging.level))
    }

    /// Filter directive for tracing-subscriber; an invalid level falls back to `info`
    /// and is reported by `validate`.
    pub fn log_directive(&self) -> String {
        self.log_level()
            .unwrap_or(LevelFilter::INFO)
            .to_string()
            .to_lowercase()
    }

    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            bail!("BOT_TOKEN not found in environment variables or config file");
        }
        self.log_level()?;
        Ok(())
    }
}

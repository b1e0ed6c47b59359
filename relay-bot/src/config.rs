//! Bot configuration.
//!
//! Read from a TOML file:
//!
//! ```toml
//! [secret]
//! token = "..."
//!
//! [relay]
//! guild_id = 1
//! input_channel = 10
//! output_channel = 20
//! prefix = "!"
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```
//!
//! The token may instead come from `RELAY_BOT_TOKEN` or `DISCORD_TOKEN`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use relay_commands::{TracingConfig, TracingFormat};
use serde::Deserialize;
use thiserror::Error;

use crate::client::{ChannelId, GuildId};

/// Environment variables checked for the bot token, in order
pub const TOKEN_ENV_VARS: &[&str] = &["RELAY_BOT_TOKEN", "DISCORD_TOKEN"];

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Specify a bot token either in the config file or with RELAY_BOT_TOKEN")]
    MissingToken,

    #[error("Command prefix must not be empty")]
    EmptyPrefix,

    #[error("Invalid log level '{0}'")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}")]
    InvalidLogFormat(String),
}

/// Complete bot configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub secret: SecretConfig,

    pub relay: RelayConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Credentials
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretConfig {
    pub token: Option<String>,
}

/// Which server and channels the relay works with
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelayConfig {
    /// Server whose members may send questions
    pub guild_id: GuildId,

    /// Channel where moderators type commands
    pub input_channel: ChannelId,

    /// Channel receiving relayed direct messages
    pub output_channel: ChannelId,

    /// Marks a message in the input channel as a command
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_prefix() -> String {
    "!".to_string()
}

/// Log output settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Overrides RUST_LOG when set
    pub level: Option<String>,

    /// pretty, compact or json
    pub format: Option<String>,
}

impl BotConfig {
    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: BotConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        tracing::debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.relay.prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        self.tracing_config()?;
        Ok(())
    }

    /// Resolve the bot token from the environment, then the file
    pub fn token(&self) -> Result<String, ConfigError> {
        self.token_from(|name| std::env::var(name).ok())
    }

    /// Resolve the bot token with a custom environment lookup
    pub fn token_from<F>(&self, env: F) -> Result<String, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        TOKEN_ENV_VARS
            .iter()
            .find_map(|name| env(name).filter(|token| !token.is_empty()))
            .or_else(|| self.secret.token.clone().filter(|token| !token.is_empty()))
            .ok_or(ConfigError::MissingToken)
    }

    /// Translate the `[logging]` section into subscriber settings
    pub fn tracing_config(&self) -> Result<TracingConfig, ConfigError> {
        let mut config = TracingConfig::default();

        if let Some(level) = &self.logging.level {
            let level = tracing::Level::from_str(level)
                .map_err(|_| ConfigError::InvalidLogLevel(level.clone()))?;
            config.level = Some(level);
        }

        if let Some(format) = &self.logging.format {
            config.format = format.parse::<TracingFormat>().map_err(ConfigError::InvalidLogFormat)?;
        }

        Ok(config)
    }
}

impl FromStr for BotConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: BotConfig = toml::from_str(s).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
        [relay]
        guild_id = 1
        input_channel = 10
        output_channel = 20
    "#;

    #[test]
    fn test_defaults() {
        let config: BotConfig = MINIMAL.parse().unwrap();
        assert_eq!(config.relay.guild_id, GuildId(1));
        assert_eq!(config.relay.input_channel, ChannelId(10));
        assert_eq!(config.relay.output_channel, ChannelId(20));
        assert_eq!(config.relay.prefix, "!");
        assert!(config.secret.token.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [secret]
            token = "abc"

            [relay]
            guild_id = 1
            input_channel = 10
            output_channel = 20
            prefix = "?"

            [logging]
            level = "debug"
            format = "json"
            "#
        )
        .unwrap();

        let config = BotConfig::load(file.path()).unwrap();
        assert_eq!(config.relay.prefix, "?");
        assert_eq!(config.token_from(|_| None).unwrap(), "abc");

        let logging = config.tracing_config().unwrap();
        assert_eq!(logging.level, Some(tracing::Level::DEBUG));
        assert_eq!(logging.format, TracingFormat::Json);
    }

    #[test]
    fn test_missing_file() {
        let err = BotConfig::load("/nonexistent/relay.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_missing_relay_section() {
        let err = "[secret]\ntoken = \"abc\"".parse::<BotConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_env_token_wins_over_file() {
        let mut config: BotConfig = MINIMAL.parse().unwrap();
        config.secret.token = Some("from-file".into());

        let token = config
            .token_from(|name| (name == "DISCORD_TOKEN").then(|| "from-env".to_string()))
            .unwrap();
        assert_eq!(token, "from-env");

        let token = config
            .token_from(|name| match name {
                "RELAY_BOT_TOKEN" => Some("primary".to_string()),
                "DISCORD_TOKEN" => Some("secondary".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(token, "primary");
    }

    #[test]
    fn test_missing_token() {
        let config: BotConfig = MINIMAL.parse().unwrap();
        assert!(matches!(
            config.token_from(|_| None),
            Err(ConfigError::MissingToken)
        ));
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let err = format!("{}\nprefix = \"\"", MINIMAL)
            .parse::<BotConfig>()
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPrefix));
    }

    #[test]
    fn test_invalid_logging_rejected() {
        let err = format!("{}\n[logging]\nlevel = \"loud\"", MINIMAL)
            .parse::<BotConfig>()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(_)));

        let err = format!("{}\n[logging]\nformat = \"xml\"", MINIMAL)
            .parse::<BotConfig>()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogFormat(_)));
    }
}

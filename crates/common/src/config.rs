//! Static bot configuration, loaded once at startup.
//!
//! Settings are read from a TOML file, then `BOT_TOKEN`, `ADMIN_CHAT_ID` and
//! `DATA_DIR` from the environment (or `.env`) override the file values.
//! Startup must fail if anything required is still a placeholder.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::types::UserId;

const PLACEHOLDER_TOKEN: &str = "YOUR_BOT_TOKEN_HERE";
const PLACEHOLDER_PAYEE: &str = "your-upi-id@bank";
const PLACEHOLDER_CHANNEL_ID: i64 = -1001234567890;
const PLACEHOLDER_CHANNEL_LINK: &str = "https://t.me/+YOUR_CHANNEL_LINK";

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
    #[serde(default)]
    pub admin_chat_id: i64,
    /// Admin handle, with or without leading `@`
    #[serde(default)]
    pub admin_username: Option<String>,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub payment: PaymentConfig,
    pub channel: ChannelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    pub amount: u32,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// UPI id of the payee
    pub payee_id: String,
    pub merchant_name: String,
    #[serde(default = "default_window_minutes")]
    pub window_minutes: u32,
    #[serde(default)]
    pub approval_mode: ApprovalMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    /// Numeric id of the private channel
    pub id: i64,
    /// Shown to members whose personal link record is missing
    pub fallback_link: String,
    #[serde(default = "default_invite_hours")]
    pub invite_link_hours: u32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalMode {
    /// Confirming payment issues the invite link right away
    Auto,
    /// Confirming payment queues the order for the admin
    #[default]
    Manual,
}

fn default_bot_name() -> String {
    "Premium Membership Bot".to_owned()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_currency() -> String {
    "INR".to_owned()
}

fn default_window_minutes() -> u32 {
    60
}

fn default_invite_hours() -> u32 {
    24
}

impl Config {
    /// Load config from `path`, apply environment overrides and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        // missing .env is fine
        let _ = dotenvy::dotenv();

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }
    /// Path from `BOT_CONFIG`, or [`DEFAULT_CONFIG_PATH`]
    pub fn path_from_env() -> PathBuf {
        std::env::var("BOT_CONFIG").map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
    }
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }
    fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = var("BOT_TOKEN").filter(|s| !s.is_empty()) {
            self.bot_token = token;
        }
        if let Some(id) = var("ADMIN_CHAT_ID").filter(|s| !s.is_empty()) {
            self.admin_chat_id = id.parse().map_err(|_| ConfigError::InvalidEnvVar("ADMIN_CHAT_ID"))?;
        }
        if let Some(dir) = var("DATA_DIR").filter(|s| !s.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        Ok(())
    }
    /// Check that every required setting was replaced with a real value
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = vec![];

        if self.bot_token.is_empty() || self.bot_token == PLACEHOLDER_TOKEN {
            errors.push("bot_token is not set");
        }
        if self.admin_chat_id == 0 {
            errors.push("admin_chat_id is not set");
        }
        if self.payment.amount == 0 {
            errors.push("payment.amount must be positive");
        }
        if self.payment.payee_id.is_empty() || self.payment.payee_id == PLACEHOLDER_PAYEE {
            errors.push("payment.payee_id is not set");
        }
        if self.payment.merchant_name.is_empty() {
            errors.push("payment.merchant_name is not set");
        }
        if self.payment.window_minutes == 0 {
            errors.push("payment.window_minutes must be positive");
        }
        if self.channel.id == 0 || self.channel.id == PLACEHOLDER_CHANNEL_ID {
            errors.push("channel.id is not set");
        }
        if self.channel.fallback_link.is_empty() || self.channel.fallback_link == PLACEHOLDER_CHANNEL_LINK {
            errors.push("channel.fallback_link is not set");
        }
        if self.channel.invite_link_hours == 0 {
            errors.push("channel.invite_link_hours must be positive");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors.join(", ")))
        }
    }
    /// Admin is matched by numeric id, or by handle when one is configured
    pub fn is_admin(&self, user_id: UserId, username: Option<&str>) -> bool {
        if i64::try_from(user_id.0).is_ok_and(|id| id == self.admin_chat_id) {
            return true;
        }
        match (self.admin_handle(), username) {
            (Some(admin), Some(name)) => admin.eq_ignore_ascii_case(name.trim_start_matches('@')),
            _ => false,
        }
    }
    /// Admin username without `@`
    pub fn admin_handle(&self) -> Option<&str> {
        self.admin_username
            .as_deref()
            .map(|s| s.trim_start_matches('@'))
            .filter(|s| !s.is_empty())
    }
    /// Text shown to users to reach the admin
    pub fn admin_contact(&self) -> String {
        match self.admin_handle() {
            Some(handle) => format!("@{handle}"),
            None => "the admin".to_owned(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value in environment variable {0}")]
    InvalidEnvVar(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
        bot_token = "123:abc"
        admin_chat_id = 42
        admin_username = "@Owner"

        [payment]
        amount = 109
        payee_id = "shop@bank"
        merchant_name = "Shop"
        window_minutes = 10

        [channel]
        id = -100777
        fallback_link = "https://t.me/+real"
    "#;

    #[test]
    fn test_valid_config() {
        let config = Config::from_toml(VALID).unwrap();
        config.validate().unwrap();

        assert_eq!(config.payment.amount, 109);
        assert_eq!(config.payment.currency, "INR");
        assert_eq!(config.payment.approval_mode, ApprovalMode::Manual);
        assert_eq!(config.channel.invite_link_hours, 24);
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_placeholders_rejected() {
        let s = r#"
            bot_token = "YOUR_BOT_TOKEN_HERE"

            [payment]
            amount = 99
            payee_id = "your-upi-id@bank"
            merchant_name = "Shop"

            [channel]
            id = -1001234567890
            fallback_link = "https://t.me/+YOUR_CHANNEL_LINK"
        "#;
        let config = Config::from_toml(s).unwrap();
        let Err(ConfigError::Invalid(msg)) = config.validate() else {
            panic!("placeholder config passed validation");
        };
        for field in ["bot_token", "admin_chat_id", "payee_id", "channel.id", "fallback_link"] {
            assert!(msg.contains(field), "{field} not reported in: {msg}");
        }
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::from_toml(VALID).unwrap();
        config
            .apply_env(|key| match key {
                "BOT_TOKEN" => Some("999:zzz".to_owned()),
                "ADMIN_CHAT_ID" => Some("7".to_owned()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.bot_token, "999:zzz");
        assert_eq!(config.admin_chat_id, 7);

        let res = config.apply_env(|key| (key == "ADMIN_CHAT_ID").then(|| "abc".to_owned()));
        assert!(matches!(res, Err(ConfigError::InvalidEnvVar("ADMIN_CHAT_ID"))));
    }

    #[test]
    fn test_is_admin() {
        let config = Config::from_toml(VALID).unwrap();
        let table = [
            (42, None, true),
            (1, Some("owner"), true),
            (1, Some("@OWNER"), true),
            (1, Some("someone"), false),
            (1, None, false),
        ];
        for (i, &(id, username, expected)) in table.iter().enumerate() {
            assert_eq!(config.is_admin(UserId(id), username), expected, "test table[{i}]");
        }
    }
}

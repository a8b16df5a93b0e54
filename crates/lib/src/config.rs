//! Configuration types and loading.
//!
//! Config is loaded from an optional JSON file (e.g. `~/.gemline/config.json`) and environment.
//! Credentials (LINE channel token/secret, Gemini API key) normally come from the environment;
//! they are resolved once at startup into [`Credentials`] and the gateway refuses to start without them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_CONFIG_PATH: &str = "GEMLINE_CONFIG_PATH";
pub const ENV_LINE_CHANNEL_ACCESS_TOKEN: &str = "LINE_CHANNEL_ACCESS_TOKEN";
pub const ENV_LINE_CHANNEL_SECRET: &str = "LINE_CHANNEL_SECRET";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gateway server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// LINE Messaging API settings.
    #[serde(default)]
    pub line: LineConfig,

    /// Gemini settings.
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Gateway bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for HTTP (default 5000).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    5000
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// LINE channel config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineConfig {
    /// Long-lived channel access token. Overridden by LINE_CHANNEL_ACCESS_TOKEN env when set.
    pub channel_access_token: Option<String>,
    /// Channel secret used to verify X-Line-Signature. Overridden by LINE_CHANNEL_SECRET env when set.
    pub channel_secret: Option<String>,
    /// Messaging API base URL (default https://api.line.me).
    pub api_base: Option<String>,
}

/// Gemini config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiConfig {
    /// API key. Overridden by GEMINI_API_KEY env when set.
    pub api_key: Option<String>,
    /// Model id passed to generateContent (default "gemini-pro"). Overridden by GEMINI_MODEL env.
    pub model: Option<String>,
    /// API base URL (default https://generativelanguage.googleapis.com).
    pub api_base: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0} (set it in the environment or .env)")]
    Missing(&'static str),
}

/// Secrets resolved once at startup. Every field is non-empty.
#[derive(Clone)]
pub struct Credentials {
    pub channel_access_token: String,
    pub channel_secret: String,
    pub gemini_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("channel_access_token", &"<redacted>")
            .field("channel_secret", &"<redacted>")
            .field("gemini_api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Resolve all credentials (env overrides config). Fails on the first missing one.
    pub fn resolve(config: &Config) -> Result<Self, ConfigError> {
        Self::resolve_with(config, env_value)
    }

    fn resolve_with(
        config: &Config,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let required = |name: &'static str, value: Option<&String>| {
            resolve_value(&env, name, value).ok_or(ConfigError::Missing(name))
        };
        let channel_access_token = required(
            ENV_LINE_CHANNEL_ACCESS_TOKEN,
            config.line.channel_access_token.as_ref(),
        )?;
        let channel_secret = required(ENV_LINE_CHANNEL_SECRET, config.line.channel_secret.as_ref())?;
        let gemini_api_key = required(ENV_GEMINI_API_KEY, config.gemini.api_key.as_ref())?;
        Ok(Self {
            channel_access_token,
            channel_secret,
            gemini_api_key,
        })
    }
}

/// Non-empty trimmed env var.
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

fn config_value(value: Option<&String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Env var `name` when set and non-blank, else the non-blank config value.
fn resolve_value(
    env: impl Fn(&str) -> Option<String>,
    name: &str,
    value: Option<&String>,
) -> Option<String> {
    env(name).or_else(|| config_value(value))
}

/// Resolve the LINE channel secret: env LINE_CHANNEL_SECRET overrides config.
pub fn resolve_line_channel_secret(config: &Config) -> Option<String> {
    resolve_value(env_value, ENV_LINE_CHANNEL_SECRET, config.line.channel_secret.as_ref())
}

/// Resolve the Gemini model id: env GEMINI_MODEL, then config, else None (client default).
pub fn resolve_gemini_model(config: &Config) -> Option<String> {
    resolve_value(env_value, ENV_GEMINI_MODEL, config.gemini.model.as_ref())
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var(ENV_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".gemline").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, or the default path (or GEMLINE_CONFIG_PATH). Missing file => default config.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

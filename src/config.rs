//! Runtime configuration
//!
//! Everything the proxy needs is resolved once at startup and handed to the handler,
//! so nothing reads the process environment while a request is in flight.

use std::fmt;
use std::time::Duration;

pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";
pub const BASE_URL_VAR: &str = "OPENROUTER_BASE_URL";
pub const MODEL_VAR: &str = "OPENROUTER_MODEL";
pub const TIMEOUT_VAR: &str = "UPSTREAM_TIMEOUT_SECS";
pub const MAX_MESSAGES_VAR: &str = "MAX_FORWARDED_MESSAGES";
pub const HOST_VAR: &str = "HOST";
pub const PORT_VAR: &str = "PORT";

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidVar { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ConfigError::MissingVar(name) => write!(f, "Missing required environment variable {name}"),
            ConfigError::InvalidVar { name, value } => write!(f, "Invalid value for {name}: {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings for talking to the upstream chat-completion API.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Option<Duration>,
    /// Keep only the newest N caller messages when forwarding. `None` forwards everything.
    pub max_forwarded_messages: Option<usize>,
}

// Hand-written so the secret never reaches a log line.
impl fmt::Debug for ProxyConfig {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("max_forwarded_messages", &self.max_forwarded_messages)
            .finish()
    }
}

impl ProxyConfig {
    /// Creates a config with the default upstream and model.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: None,
            max_forwarded_messages: None,
        }
    }

    #[must_use]
    pub fn with_base_url(
        mut self,
        base_url: impl Into<String>,
    ) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_model(
        mut self,
        model: impl Into<String>,
    ) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_max_forwarded_messages(
        mut self,
        max: usize,
    ) -> Self {
        self.max_forwarded_messages = Some(max);
        self
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `OPENROUTER_API_KEY` is unset or a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or empty, or a numeric variable does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingVar(API_KEY_VAR))?;

        let mut config = Self::new(api_key);

        if let Some(base_url) = non_empty(lookup(BASE_URL_VAR)) {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(model) = non_empty(lookup(MODEL_VAR)) {
            config.model = model;
        }
        if let Some(secs) = parse_var::<u64>(TIMEOUT_VAR, lookup(TIMEOUT_VAR))? {
            config.timeout = Some(Duration::from_secs(secs));
        }
        config.max_forwarded_messages = parse_var::<usize>(MAX_MESSAGES_VAR, lookup(MAX_MESSAGES_VAR))?;

        Ok(config)
    }

    /// Full URL of the chat-completion endpoint.
    #[must_use]
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Bind address of the standalone server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but is not a valid port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// # Errors
    ///
    /// Returns an error if `PORT` is set but is not a valid port number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            host: non_empty(lookup(HOST_VAR)).unwrap_or(defaults.host),
            port: parse_var::<u16>(PORT_VAR, lookup(PORT_VAR))?.unwrap_or(defaults.port),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError> {
    match non_empty(value) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar { name, value: raw }),
    }
}

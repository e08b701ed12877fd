use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::info;

use crate::error::PulseError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Upstream search
    pub arctic_base_url: String,
    pub user_agent: String,

    // Summarizer
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Option<String>,

    // Politeness
    pub cache_ttl: Duration,
    pub throttle_interval: Duration,
    pub comment_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arctic_base_url: "https://arctic-shift.photon-reddit.com".to_string(),
            user_agent: "PulseScanner/1.0".to_string(),
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            openai_base_url: None,
            cache_ttl: Duration::from_secs(600),
            throttle_interval: Duration::from_secs(30),
            comment_delay: Duration::from_millis(200),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    /// Numeric variables that are set but unparseable are an error.
    pub fn from_env() -> Result<Self, PulseError> {
        let defaults = Self::default();
        Ok(Self {
            arctic_base_url: env::var("ARCTIC_BASE_URL").unwrap_or(defaults.arctic_base_url),
            user_agent: env::var("PULSE_USER_AGENT").unwrap_or(defaults.user_agent),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_model: env::var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_base_url: optional_env("OPENAI_BASE_URL"),
            cache_ttl: parsed_env::<u64>("PULSE_CACHE_TTL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            throttle_interval: parsed_env::<u64>("PULSE_THROTTLE_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.throttle_interval),
            comment_delay: parsed_env::<u64>("PULSE_COMMENT_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.comment_delay),
        })
    }

    /// Log the effective configuration with secrets masked.
    pub fn log_redacted(&self) {
        info!(
            arctic_base_url = self.arctic_base_url.as_str(),
            user_agent = self.user_agent.as_str(),
            openai_api_key = redact(self.openai_api_key.as_deref()),
            openai_model = self.openai_model.as_str(),
            cache_ttl_secs = self.cache_ttl.as_secs(),
            throttle_secs = self.throttle_interval.as_secs(),
            comment_delay_ms = self.comment_delay.as_millis() as u64,
            "Loaded configuration"
        );
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_env<T: FromStr>(key: &str) -> Result<Option<T>, PulseError> {
    match optional_env(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| PulseError::Config(format!("{key} must be a non-negative integer, got {raw:?}"))),
    }
}

fn redact(secret: Option<&str>) -> &'static str {
    match secret {
        Some(_) => "***",
        None => "<unset>",
    }
}

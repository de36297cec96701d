use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use super::ConfigError;
use crate::retry::RetryConfig;

pub const DEFAULT_ORIGIN: &str = "NYC";
pub const DEFAULT_LANGUAGE: &str = "English";
pub const DEFAULT_CURRENCY: &str = "EUR";
pub const DEFAULT_AMADEUS_BASE_URL: &str = "https://test.api.amadeus.com";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_SAMPLE_DATA_PATH: &str = "data/inspiration_sample.json";
pub const DEFAULT_IMAGE_THUMB_SIZE: u32 = 600;
pub const DEFAULT_HOTEL_CANDIDATE_LIMIT: usize = 20;

/// Which LLM backend drives the agents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackendKind {
    OpenAI,
    Anthropic,
}

impl LlmBackendKind {
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAI => "gpt-4o-mini",
            Self::Anthropic => "claude-sonnet-4-20250514",
        }
    }

    /// Environment variable holding this backend's API key
    pub fn api_key_var(self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for LlmBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAI => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
        }
    }
}

impl FromStr for LlmBackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(ConfigError::Invalid {
                name: "LLM_PROVIDER",
                value: other.to_string(),
                reason: "unknown provider (expected openai or anthropic)".to_string(),
            }),
        }
    }
}

/// Credentials and endpoint of the flight/hotel data provider
#[derive(Debug, Clone)]
pub struct AmadeusSettings {
    pub client_id: SecretString,
    pub client_secret: SecretString,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub backend: LlmBackendKind,
    pub model: String,
    pub api_key: SecretString,
}

#[derive(Debug, Clone)]
pub struct TelegramSettings {
    pub bot_token: SecretString,
    pub channel_id: String,
    pub api_base: String,
}

/// Fully resolved, read-only configuration for one pipeline run.
///
/// Built once by [`SettingsOverrides::build`] and then only passed around by reference.
#[derive(Debug, Clone)]
pub struct Settings {
    pub amadeus: AmadeusSettings,
    pub llm: LlmSettings,
    pub telegram: TelegramSettings,
    /// IATA code flights depart from
    pub origin: String,
    /// Full language name ("English", "Spanish", ...)
    pub language: String,
    pub currency: String,
    pub retry: RetryConfig,
    pub sample_data_path: PathBuf,
    pub image_thumb_size: u32,
    pub hotel_candidate_limit: usize,
}

/// One layer of optional settings.
///
/// Layers come from a TOML file, the environment, CLI flags or a multi-channel JSON entry
/// and are combined with [`merge`](Self::merge) before the final [`build`](Self::build).
/// Key names follow the multi-channel JSON format.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsOverrides {
    pub amadeus_client_id: Option<String>,
    pub amadeus_client_secret: Option<String>,
    pub amadeus_base_url: Option<String>,
    pub llm_provider: Option<String>,
    pub llm_model: Option<String>,
    pub openai_key: Option<String>,
    pub anthropic_key: Option<String>,
    pub telegram_bot_token: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub telegram_channel_id: Option<String>,
    pub telegram_api_base: Option<String>,
    pub origin: Option<String>,
    pub language: Option<String>,
    pub currency: Option<String>,
    pub max_retries: Option<u32>,
    pub min_wait: Option<u64>,
    pub max_wait: Option<u64>,
    pub sample_data_path: Option<PathBuf>,
    pub image_thumb_size: Option<u32>,
    pub hotel_candidate_limit: Option<usize>,
}

impl SettingsOverrides {
    /// Read overrides from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Read overrides through an arbitrary variable lookup
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            amadeus_client_id: var("AMADEUS_CLIENT_ID"),
            amadeus_client_secret: var("AMADEUS_CLIENT_SECRET"),
            amadeus_base_url: var("AMADEUS_BASE_URL"),
            llm_provider: var("LLM_PROVIDER"),
            llm_model: var("LLM_MODEL"),
            openai_key: var("OPENAI_API_KEY"),
            anthropic_key: var("ANTHROPIC_API_KEY"),
            telegram_bot_token: var("TELEGRAM_BOT_TOKEN"),
            telegram_channel_id: var("TELEGRAM_CHANNEL_ID"),
            telegram_api_base: var("TELEGRAM_API_BASE"),
            origin: var("ORIGIN"),
            language: var("LANGUAGE"),
            currency: var("CURRENCY"),
            max_retries: parse_var("MAX_RETRIES", var("MAX_RETRIES"))?,
            min_wait: parse_var("MIN_WAIT", var("MIN_WAIT"))?,
            max_wait: parse_var("MAX_WAIT", var("MAX_WAIT"))?,
            sample_data_path: var("SAMPLE_DATA_PATH").map(PathBuf::from),
            image_thumb_size: parse_var("IMAGE_THUMB_SIZE", var("IMAGE_THUMB_SIZE"))?,
            hotel_candidate_limit: parse_var(
                "HOTEL_CANDIDATE_LIMIT",
                var("HOTEL_CANDIDATE_LIMIT"),
            )?,
        })
    }

    /// Read overrides from a TOML settings file
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Layer `higher` on top of `self`; values present in `higher` win.
    pub fn merge(self, higher: Self) -> Self {
        Self {
            amadeus_client_id: higher.amadeus_client_id.or(self.amadeus_client_id),
            amadeus_client_secret: higher.amadeus_client_secret.or(self.amadeus_client_secret),
            amadeus_base_url: higher.amadeus_base_url.or(self.amadeus_base_url),
            llm_provider: higher.llm_provider.or(self.llm_provider),
            llm_model: higher.llm_model.or(self.llm_model),
            openai_key: higher.openai_key.or(self.openai_key),
            anthropic_key: higher.anthropic_key.or(self.anthropic_key),
            telegram_bot_token: higher.telegram_bot_token.or(self.telegram_bot_token),
            telegram_channel_id: higher.telegram_channel_id.or(self.telegram_channel_id),
            telegram_api_base: higher.telegram_api_base.or(self.telegram_api_base),
            origin: higher.origin.or(self.origin),
            language: higher.language.or(self.language),
            currency: higher.currency.or(self.currency),
            max_retries: higher.max_retries.or(self.max_retries),
            min_wait: higher.min_wait.or(self.min_wait),
            max_wait: higher.max_wait.or(self.max_wait),
            sample_data_path: higher.sample_data_path.or(self.sample_data_path),
            image_thumb_size: higher.image_thumb_size.or(self.image_thumb_size),
            hotel_candidate_limit: higher.hotel_candidate_limit.or(self.hotel_candidate_limit),
        }
    }

    /// Resolve defaults and validate required credentials.
    pub fn build(self) -> Result<Settings, ConfigError> {
        let backend = match self.llm_provider.as_deref() {
            Some(name) => name.parse()?,
            None => LlmBackendKind::OpenAI,
        };
        let llm_key = match backend {
            LlmBackendKind::OpenAI => self.openai_key,
            LlmBackendKind::Anthropic => self.anthropic_key,
        };

        let retry = RetryConfig::new(
            self.max_retries.unwrap_or(3),
            seconds_to_millis("MIN_WAIT", self.min_wait.unwrap_or(1))?,
            seconds_to_millis("MAX_WAIT", self.max_wait.unwrap_or(10))?,
        );
        if retry.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_RETRIES",
                value: "0".to_string(),
                reason: "at least one attempt is required".to_string(),
            });
        }
        if retry.initial_backoff > retry.max_backoff {
            return Err(ConfigError::Invalid {
                name: "MIN_WAIT",
                value: retry.initial_backoff.as_secs().to_string(),
                reason: "must not exceed MAX_WAIT".to_string(),
            });
        }

        let origin = self
            .origin
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_string())
            .trim()
            .to_uppercase();
        if origin.len() != 3 || !origin.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Invalid {
                name: "ORIGIN",
                value: origin,
                reason: "expected a three-letter IATA code".to_string(),
            });
        }

        Ok(Settings {
            amadeus: AmadeusSettings {
                client_id: required(self.amadeus_client_id, "AMADEUS_CLIENT_ID")?,
                client_secret: required(self.amadeus_client_secret, "AMADEUS_CLIENT_SECRET")?,
                base_url: trim_base(
                    self.amadeus_base_url
                        .unwrap_or_else(|| DEFAULT_AMADEUS_BASE_URL.to_string()),
                ),
            },
            llm: LlmSettings {
                backend,
                model: self
                    .llm_model
                    .unwrap_or_else(|| backend.default_model().to_string()),
                api_key: required(llm_key, backend.api_key_var())?,
            },
            telegram: TelegramSettings {
                bot_token: required(self.telegram_bot_token, "TELEGRAM_BOT_TOKEN")?,
                channel_id: self
                    .telegram_channel_id
                    .ok_or(ConfigError::Missing("TELEGRAM_CHANNEL_ID"))?,
                api_base: trim_base(
                    self.telegram_api_base
                        .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
                ),
            },
            origin,
            language: self
                .language
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            currency: self
                .currency
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
                .to_uppercase(),
            retry,
            sample_data_path: self
                .sample_data_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SAMPLE_DATA_PATH)),
            image_thumb_size: self.image_thumb_size.unwrap_or(DEFAULT_IMAGE_THUMB_SIZE),
            hotel_candidate_limit: self
                .hotel_candidate_limit
                .unwrap_or(DEFAULT_HOTEL_CANDIDATE_LIMIT),
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<SecretString, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
        .ok_or(ConfigError::Missing(name))
}

fn seconds_to_millis(name: &'static str, seconds: u64) -> Result<u64, ConfigError> {
    seconds.checked_mul(1000).ok_or_else(|| ConfigError::Invalid {
        name,
        value: seconds.to_string(),
        reason: "wait is too long".to_string(),
    })
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn parse_var<T: FromStr>(name: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError> {
    raw.map(|value| {
        value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value,
            reason: "not a valid number".to_string(),
        })
    })
    .transpose()
}

/// Channel ids are often written as bare numbers (`-1001234567890`) in JSON.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}

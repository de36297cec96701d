mod channels;
mod settings;

use std::path::PathBuf;

pub use channels::{CHANNELS_ENV_VAR, ChannelSource, load_channels, parse_channels};
pub use settings::{
    AmadeusSettings, DEFAULT_CURRENCY, DEFAULT_LANGUAGE, DEFAULT_ORIGIN, LlmBackendKind,
    LlmSettings, Settings, SettingsOverrides, TelegramSettings,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse channel configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid channel configuration: {0}")]
    ChannelFormat(String),

    #[error("no channel configurations found")]
    NoChannels,
}

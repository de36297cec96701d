use std::path::PathBuf;

use serde_json::Value;

use super::{ConfigError, SettingsOverrides};

/// Environment variable holding the multi-channel JSON
pub const CHANNELS_ENV_VAR: &str = "CHANNELS_CONFIG";

/// Where the multi-channel runner reads its channel list from
#[derive(Debug, Clone)]
pub enum ChannelSource {
    File(PathBuf),
    Env,
    Inline(String),
}

/// Load channel entries from a source.
pub fn load_channels(source: &ChannelSource) -> Result<Vec<SettingsOverrides>, ConfigError> {
    let json = match source {
        ChannelSource::File(path) => {
            std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?
        }
        ChannelSource::Env => std::env::var(CHANNELS_ENV_VAR)
            .map_err(|_| ConfigError::Missing(CHANNELS_ENV_VAR))?,
        ChannelSource::Inline(json) => json.clone(),
    };
    parse_channels(&json)
}

/// Parse a channel list: either a bare array or `{"channels": [...]}`.
pub fn parse_channels(json: &str) -> Result<Vec<SettingsOverrides>, ConfigError> {
    let value: Value = serde_json::from_str(json)?;

    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("channels") {
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                return Err(ConfigError::ChannelFormat(
                    "'channels' must be an array".to_string(),
                ));
            }
            None => {
                return Err(ConfigError::ChannelFormat(
                    "expected an array or an object with a 'channels' key".to_string(),
                ));
            }
        },
        _ => {
            return Err(ConfigError::ChannelFormat(
                "expected an array or an object with a 'channels' key".to_string(),
            ));
        }
    };

    if entries.is_empty() {
        return Err(ConfigError::NoChannels);
    }

    entries
        .into_iter()
        .map(|entry| serde_json::from_value(entry).map_err(ConfigError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_array() {
        let channels = parse_channels(
            r#"[
                {"telegram_channel_id": "@es", "origin": "MAD", "language": "Spanish", "currency": "EUR"},
                {"telegram_channel_id": -100200, "origin": "JFK"}
            ]"#,
        )
        .unwrap();

        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].language.as_deref(), Some("Spanish"));
        assert_eq!(channels[1].telegram_channel_id.as_deref(), Some("-100200"));
        assert_eq!(channels[1].language, None);
    }

    #[test]
    fn wrapped_object_with_credentials() {
        let channels = parse_channels(
            r#"{"channels": [{
                "telegram_bot_token": "123:abc",
                "telegram_channel_id": "@ru",
                "amadeus_client_id": "id",
                "amadeus_client_secret": "secret",
                "openai_key": "sk-test",
                "travelpayouts_token": "ignored"
            }]}"#,
        )
        .unwrap();

        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].openai_key.as_deref(), Some("sk-test"));
        assert_eq!(channels[0].amadeus_client_id.as_deref(), Some("id"));
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(matches!(
            parse_channels(r#"{"servers": []}"#),
            Err(ConfigError::ChannelFormat(_))
        ));
        assert!(matches!(
            parse_channels(r#"{"channels": {"a": 1}}"#),
            Err(ConfigError::ChannelFormat(_))
        ));
        assert!(matches!(parse_channels("42"), Err(ConfigError::ChannelFormat(_))));
        assert!(matches!(parse_channels("not json"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn empty_list_is_an_error() {
        assert!(matches!(parse_channels("[]"), Err(ConfigError::NoChannels)));
        assert!(matches!(
            parse_channels(r#"{"channels": []}"#),
            Err(ConfigError::NoChannels)
        ));
    }

    #[test]
    fn file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("channels.json");
        std::fs::write(&path, r#"[{"origin": "LIS"}]"#).unwrap();

        let channels = load_channels(&ChannelSource::File(path)).unwrap();
        assert_eq!(channels[0].origin.as_deref(), Some("LIS"));

        let missing = load_channels(&ChannelSource::File(dir.path().join("nope.json")));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }
}

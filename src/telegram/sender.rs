use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::time::Duration;

use super::DeliveryError;
use crate::config::TelegramSettings;

/// Sends HTML-formatted messages to one chat
#[async_trait]
pub trait ChatSender: Send + Sync {
    async fn send_message(&self, text: &str) -> Result<(), DeliveryError>;

    async fn send_photo(&self, photo_url: &str, caption: &str) -> Result<(), DeliveryError>;
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API client bound to a single channel
pub struct TelegramBot {
    http: Client,
    api_base: String,
    token: SecretString,
    chat_id: String,
}

impl TelegramBot {
    pub fn new(settings: &TelegramSettings) -> Result<Self, DeliveryError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            http,
            api_base: settings.api_base.clone(),
            token: settings.bot_token.clone(),
            chat_id: settings.channel_id.clone(),
        })
    }

    async fn call(&self, method: &'static str, mut body: Value) -> Result<(), DeliveryError> {
        body["chat_id"] = json!(self.chat_id);
        body["parse_mode"] = json!("HTML");

        let url = format!("{}/bot{}/{}", self.api_base, self.token.expose_secret(), method);
        let response = self.http.post(url).json(&body).send().await.map_err(|e| {
            // reqwest errors carry the URL, which embeds the bot token
            DeliveryError::Transport(e.without_url())
        })?;

        let status = response.status();
        let parsed: Option<ApiResponse> = response.json().await.ok();
        match parsed {
            Some(ApiResponse { ok: true, .. }) => Ok(()),
            Some(ApiResponse { description, .. }) => Err(DeliveryError::Rejected {
                method,
                description: description.unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            }),
            None => Err(DeliveryError::Rejected {
                method,
                description: format!("unreadable response (HTTP {})", status.as_u16()),
            }),
        }
    }
}

#[async_trait]
impl ChatSender for TelegramBot {
    async fn send_message(&self, text: &str) -> Result<(), DeliveryError> {
        self.call("sendMessage", json!({ "text": text })).await
    }

    async fn send_photo(&self, photo_url: &str, caption: &str) -> Result<(), DeliveryError> {
        self.call("sendPhoto", json!({ "photo": photo_url, "caption": caption }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server};

    use super::*;

    fn bot(api_base: String) -> TelegramBot {
        TelegramBot::new(&TelegramSettings {
            bot_token: SecretString::from("123:abc"),
            channel_id: "@travel".to_string(),
            api_base,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn send_message_posts_html_text() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .match_body(Matcher::PartialJson(json!({
                "chat_id": "@travel",
                "text": "<b>hi</b>",
                "parse_mode": "HTML"
            })))
            .with_status(200)
            .with_body(r#"{"ok": true, "result": {"message_id": 1}}"#)
            .create_async()
            .await;

        bot(server.url()).send_message("<b>hi</b>").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_photo_reports_description() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/bot123:abc/sendPhoto")
            .match_body(Matcher::PartialJson(json!({
                "photo": "https://example.com/a.jpg",
                "caption": "hello"
            })))
            .with_status(400)
            .with_body(
                r#"{"ok": false, "error_code": 400,
                    "description": "Bad Request: wrong type of the web page content"}"#,
            )
            .create_async()
            .await;

        let err = bot(server.url())
            .send_photo("https://example.com/a.jpg", "hello")
            .await
            .unwrap_err();

        match err {
            DeliveryError::Rejected { method, description } => {
                assert_eq!(method, "sendPhoto");
                assert!(description.contains("wrong type of the web page content"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

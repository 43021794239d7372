use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use super::Notifier;

const API_BASE: &str = "https://api.telegram.org";
const DEFAULT_CHAT_ID: &str = "-5223082150";

/// Bot-API notifier. The token is optional at construction so the rest of
/// the pipeline can run without credentials; `send` fails loudly instead.
pub struct TelegramNotifier {
    http: reqwest::Client,
    token: Option<String>,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn from_env() -> Self {
        Self::new(resolve_bot_token(), resolve_chat_id())
    }

    pub fn new(token: Option<String>, chat_id: String) -> Self {
        Self {
            http: crate::fetch::http_client(30),
            token,
            chat_id,
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        let Some(token) = self.token.as_deref() else {
            bail!("no Telegram bot token found");
        };

        #[derive(Serialize)]
        struct SendMessage<'a> {
            chat_id: &'a str,
            text: &'a str,
            parse_mode: &'a str,
        }

        let url = format!("{API_BASE}/bot{token}/sendMessage");
        let resp = self
            .http
            .post(&url)
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text: message,
                parse_mode: "Markdown",
            })
            .send()
            .await
            .context("Telegram request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Telegram API error {status}: {body}");
        }
        tracing::info!(chat_id = %self.chat_id, "Telegram notification sent");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}

/// `TELEGRAM_BOT_TOKEN` env var first, then the openclaw channel config.
fn resolve_bot_token() -> Option<String> {
    if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
        if !token.trim().is_empty() {
            return Some(token.trim().to_string());
        }
    }
    openclaw_channel_value("token")
}

/// `TELEGRAM_CHAT_ID` env var, then openclaw config, then the built-in
/// monitoring channel.
fn resolve_chat_id() -> String {
    if let Ok(id) = std::env::var("TELEGRAM_CHAT_ID") {
        if !id.trim().is_empty() {
            return id.trim().to_string();
        }
    }
    openclaw_channel_value("chat_id").unwrap_or_else(|| DEFAULT_CHAT_ID.to_string())
}

/// Reads one string out of `~/.openclaw/openclaw.json` at
/// `channels.telegram.<key>`.
fn openclaw_channel_value(key: &str) -> Option<String> {
    let path = crate::config::home_dir().join(".openclaw/openclaw.json");
    let content = std::fs::read_to_string(path).ok()?;
    let value: serde_json::Value = serde_json::from_str(&content).ok()?;
    value
        .get("channels")?
        .get("telegram")?
        .get(key)?
        .as_str()
        .map(|s| s.to_string())
}

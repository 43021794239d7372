use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{build_prompt, format_posts, Summarizer, MIN_ANALYZABLE_CHARS, NO_HIGHLIGHTS};
use crate::fetch::types::Post;

const API_URL: &str = "https://api.cerebras.ai/v1/chat/completions";
const MODEL: &str = "llama-3.3-70b";

/// Chat-completions client for the Cerebras inference API. Low temperature
/// and a bounded token budget: digests should be factual, not creative.
pub struct CerebrasClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

impl CerebrasClient {
    pub fn from_env() -> Self {
        Self::with_key(resolve_api_key())
    }

    /// Explicit key injection for tests; `None` makes every call a logged
    /// no-op.
    pub fn with_key(api_key: Option<String>) -> Self {
        Self {
            http: crate::fetch::http_client(60),
            api_key,
            model: MODEL.to_string(),
        }
    }
}

#[async_trait]
impl Summarizer for CerebrasClient {
    async fn summarize(&self, posts: &[Post]) -> Option<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::error!("no Cerebras API key found; analysis unavailable");
            return None;
        };

        let block = format_posts(posts);
        if block.chars().count() < MIN_ANALYZABLE_CHARS {
            tracing::warn!("not enough post content to analyze");
            return Some(NO_HIGHLIGHTS.to_string());
        }
        let prompt = build_prompt(&block);

        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            max_tokens: u32,
            temperature: f32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: Option<String>,
            #[serde(default)]
            reasoning: Option<String>,
        }

        let req = Req {
            model: &self.model,
            messages: vec![Msg {
                role: "user",
                content: &prompt,
            }],
            max_tokens: 1000,
            temperature: 0.3,
        };

        let resp = match self
            .http
            .post(API_URL)
            .bearer_auth(api_key)
            .json(&req)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = ?e, "Cerebras request failed");
                return None;
            }
        };

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Cerebras API error");
            return None;
        }

        let body: Resp = match resp.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(error = ?e, "malformed Cerebras response");
                return None;
            }
        };

        let Some(choice) = body.choices.into_iter().next() else {
            tracing::error!("Cerebras response had no choices");
            return None;
        };

        // Some models put the answer into `reasoning` and leave `content`
        // empty; content wins when both are present.
        let text = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .or(choice.message.reasoning)
            .unwrap_or_default();
        Some(text)
    }

    fn name(&self) -> &'static str {
        "cerebras"
    }
}

/// `CEREBRAS_API_KEY` env var first, then the key=value config file the
/// vendor tooling drops under the user's config dir.
fn resolve_api_key() -> Option<String> {
    if let Ok(key) = std::env::var("CEREBRAS_API_KEY") {
        if !key.trim().is_empty() {
            return Some(key.trim().to_string());
        }
    }
    let path = crate::config::home_dir().join(".config/cerebras/config");
    let content = std::fs::read_to_string(path).ok()?;
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("CEREBRAS_API_KEY=") {
            let key = rest.trim().trim_matches(|c| c == '"' || c == '\'');
            if !key.is_empty() {
                return Some(key.to_string());
            }
        }
    }
    None
}

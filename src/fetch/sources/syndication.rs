use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::fetch::types::{Post, PostSource};
use crate::fetch::{normalize_text, MAX_POSTS_PER_ACCOUNT, MAX_POST_CHARS, MIN_POST_CHARS};

/// The legacy embedded-timeline endpoint answers with a JSON envelope whose
/// `body` field is the rendered timeline HTML.
#[derive(Debug, Deserialize)]
struct Timeline {
    #[serde(default)]
    body: Option<String>,
}

/// Syndication timeline endpoint. Structured JSON envelope, so it outranks
/// the raw HTML scrape in the fallback chain.
pub struct SyndicationSource {
    base: String,
    client: reqwest::Client,
}

impl SyndicationSource {
    pub fn new(base: String) -> Self {
        Self {
            base,
            client: crate::fetch::http_client(15),
        }
    }

    /// Pull tweet paragraphs out of the envelope's rendered HTML.
    pub fn parse_timeline(account: &str, raw: &str) -> Result<Vec<Post>> {
        let t0 = std::time::Instant::now();
        let timeline: Timeline =
            serde_json::from_str(raw).context("parsing syndication timeline json")?;
        let html = timeline.body.unwrap_or_default();

        static RE_TWEET: OnceCell<regex::Regex> = OnceCell::new();
        let re = RE_TWEET.get_or_init(|| {
            regex::Regex::new(r#"(?is)<p[^>]*class="[^"]*timeline-Tweet-text[^"]*"[^>]*>(.*?)</p>"#)
                .unwrap()
        });

        let mut out = Vec::new();
        for cap in re.captures_iter(&html).take(MAX_POSTS_PER_ACCOUNT) {
            let text = normalize_text(&cap[1], MAX_POST_CHARS);
            if text.chars().count() <= MIN_POST_CHARS {
                continue;
            }
            out.push(Post {
                author: format!("@{account}"),
                text,
                url: format!("https://x.com/{account}"),
                timestamp: String::new(),
                source_id: Some("syndication".to_string()),
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("source_fetch_ms").record(ms);
        counter!("fetch_posts_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl PostSource for SyndicationSource {
    async fn fetch(&self, account: &str) -> Result<Vec<Post>> {
        let url = format!(
            "{}/timeline/profile?screen_name={}",
            self.base.trim_end_matches('/'),
            account
        );
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("syndication request")?;
        if !resp.status().is_success() {
            tracing::debug!(status = %resp.status(), account = %account, "syndication non-200");
            return Ok(Vec::new());
        }
        let body = resp.text().await.context("syndication body")?;
        Self::parse_timeline(account, &body)
    }

    fn name(&self) -> &'static str {
        "syndication"
    }
}

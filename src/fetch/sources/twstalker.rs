use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use once_cell::sync::OnceCell;

use crate::fetch::types::{Post, PostSource};
use crate::fetch::{normalize_text, MAX_POSTS_PER_ACCOUNT, MAX_POST_CHARS, MIN_POST_CHARS};

/// HTML scrape of the twstalker.com viewer. Last resort in the fallback
/// chain; no per-post links or timestamps survive this backend.
pub struct TwstalkerSource {
    base: String,
    client: reqwest::Client,
}

impl TwstalkerSource {
    pub fn new(base: String) -> Self {
        Self {
            base,
            client: crate::fetch::http_client(15),
        }
    }

    /// Extract tweet-content blocks from a profile page.
    pub fn parse_page(account: &str, html: &str) -> Vec<Post> {
        let t0 = std::time::Instant::now();

        static RE_TWEET: OnceCell<regex::Regex> = OnceCell::new();
        let re = RE_TWEET.get_or_init(|| {
            regex::Regex::new(r#"(?is)<div[^>]*class="[^"]*tweet-content[^"]*"[^>]*>(.*?)</div>"#)
                .unwrap()
        });

        let mut out = Vec::new();
        for cap in re.captures_iter(html).take(MAX_POSTS_PER_ACCOUNT) {
            let text = normalize_text(&cap[1], MAX_POST_CHARS);
            if text.chars().count() <= MIN_POST_CHARS {
                continue;
            }
            out.push(Post {
                author: format!("@{account}"),
                text,
                url: format!("https://x.com/{account}"),
                timestamp: String::new(),
                source_id: Some("twstalker".to_string()),
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("source_fetch_ms").record(ms);
        counter!("fetch_posts_total").increment(out.len() as u64);
        out
    }
}

#[async_trait]
impl PostSource for TwstalkerSource {
    async fn fetch(&self, account: &str) -> Result<Vec<Post>> {
        let url = format!("{}/{}", self.base.trim_end_matches('/'), account);
        let resp = self
            .client
            .get(&url)
            .header("Accept", "text/html")
            .send()
            .await
            .context("twstalker request")?;
        if !resp.status().is_success() {
            tracing::debug!(status = %resp.status(), account = %account, "twstalker non-200");
            return Ok(Vec::new());
        }
        let body = resp.text().await.context("twstalker body")?;
        Ok(Self::parse_page(account, &body))
    }

    fn name(&self) -> &'static str {
        "twstalker"
    }
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::fetch::types::{Post, PostSource};
use crate::fetch::{normalize_text, MAX_POSTS_PER_ACCOUNT, MAX_POST_CHARS, MIN_POST_CHARS};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/// RSS feeds from alternate-frontend Nitter instances. Second in the
/// fallback chain; instances come and go, so several are configured.
pub struct NitterSource {
    instances: Vec<String>,
    client: reqwest::Client,
}

impl NitterSource {
    pub fn new(instances: Vec<String>) -> Self {
        Self {
            instances,
            client: crate::fetch::http_client(15),
        }
    }

    /// Parse one RSS document into posts for `account`. The `description`
    /// carries escaped HTML with the full text; `title` is the fallback.
    pub fn parse_feed(account: &str, xml: &str) -> Result<Vec<Post>> {
        let t0 = std::time::Instant::now();
        let rss: Rss = from_str(xml).context("parsing nitter rss xml")?;

        let mut out = Vec::new();
        for item in rss.channel.items.into_iter().take(MAX_POSTS_PER_ACCOUNT) {
            let raw = item
                .description
                .filter(|d| !d.trim().is_empty())
                .or(item.title)
                .unwrap_or_default();
            let text = normalize_text(&raw, MAX_POST_CHARS);
            if text.chars().count() <= MIN_POST_CHARS {
                continue;
            }

            out.push(Post {
                author: format!("@{account}"),
                text,
                url: item.link.unwrap_or_default(),
                timestamp: item.pub_date.unwrap_or_default(),
                source_id: Some("nitter".to_string()),
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("source_fetch_ms").record(ms);
        counter!("fetch_posts_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl PostSource for NitterSource {
    async fn fetch(&self, account: &str) -> Result<Vec<Post>> {
        for instance in &self.instances {
            let url = format!("{}/{}/rss", instance.trim_end_matches('/'), account);
            let resp = match self.client.get(&url).send().await {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!(error = ?e, instance = %instance, "nitter request failed");
                    continue;
                }
            };
            if !resp.status().is_success() {
                tracing::debug!(status = %resp.status(), instance = %instance, "nitter non-200");
                continue;
            }
            let body = resp.text().await.context("nitter body")?;
            if !body.contains("<item") {
                continue;
            }
            let posts = Self::parse_feed(account, &body)?;
            if !posts.is_empty() {
                return Ok(posts);
            }
        }
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "nitter"
    }
}

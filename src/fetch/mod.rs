// src/fetch/mod.rs
pub mod sources;
pub mod types;

use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

use crate::fetch::types::{Post, PostSource};

/// Hard cap on entries taken from one backend per account.
pub const MAX_POSTS_PER_ACCOUNT: usize = 10;
/// Posts at or under this many characters after markup stripping are noise
/// (bare links, "RT", etc.) and get dropped.
pub const MIN_POST_CHARS: usize = 20;
/// Per-post text cap applied by every adapter.
pub const MAX_POST_CHARS: usize = 1000;

/// One-time metrics registration for the fetch pipeline.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("fetch_posts_total", "Posts parsed from source adapters.");
        describe_counter!(
            "fetch_source_errors_total",
            "Source adapter fetch/parse errors."
        );
        describe_counter!(
            "fetch_account_misses_total",
            "Accounts where every source came back empty."
        );
        describe_histogram!(
            "source_fetch_ms",
            "Per-source fetch+parse time in milliseconds."
        );
    });
}

/// Normalize feed/scrape text: decode HTML entities, strip tags, collapse
/// whitespace, trim, cap at `max_chars` characters.
pub fn normalize_text(s: &str, max_chars: usize) -> String {
    // 1) HTML entity decode (feeds ship CDATA-escaped markup)
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 4) Length cap (characters, not bytes)
    if out.chars().count() > max_chars {
        out = out.chars().take(max_chars).collect();
    }

    out
}

/// Shared HTTP client builder for the scraping backends.
pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("Mozilla/5.0 (compatible; x-monitor/", env!("CARGO_PKG_VERSION"), ")"))
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .expect("reqwest client")
}

/// Fetch posts for every configured account, trying sources in priority
/// order and stopping at the first one that yields anything.
///
/// Output order is account order, then within-account fetch order; dedup
/// insertion and prompt ordering downstream rely on it. A fixed pause runs
/// after each account so the mirrors don't see a request burst.
pub async fn fetch_all(
    accounts: &[String],
    sources: &[Box<dyn PostSource>],
    pause: Duration,
) -> Vec<Post> {
    ensure_metrics_described();

    let mut all = Vec::new();
    for account in accounts {
        let mut posts = Vec::new();
        for source in sources {
            match source.fetch(account).await {
                Ok(batch) if !batch.is_empty() => {
                    tracing::info!(
                        account = %account,
                        source = source.name(),
                        count = batch.len(),
                        "fetched posts"
                    );
                    posts = batch;
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        error = ?e,
                        account = %account,
                        source = source.name(),
                        "source error"
                    );
                    counter!("fetch_source_errors_total").increment(1);
                }
            }
        }

        if posts.is_empty() {
            tracing::warn!(account = %account, "no posts from any source");
            counter!("fetch_account_misses_total").increment(1);
        } else {
            all.append(&mut posts);
        }

        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }
    all
}

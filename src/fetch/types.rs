// src/fetch/types.rs
use anyhow::Result;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Post {
    pub author: String,    // e.g., "@Raydium"
    pub text: String,      // normalized text, capped per backend
    pub url: String,       // entry link, or the profile page as fallback
    pub timestamp: String, // source-provided, kept opaque; empty when absent
    pub source_id: Option<String>, // producing backend, for diagnostics
}

#[async_trait::async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch the most recent posts for one account handle.
    /// `Ok(vec![])` and `Err(_)` both read as "no data here" to the
    /// fallback fetcher; `Err` is additionally logged and counted.
    async fn fetch(&self, account: &str) -> Result<Vec<Post>>;
    fn name(&self) -> &'static str;
}

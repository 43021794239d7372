pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Delivery channel for finished digests.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Wraps a digest in the scan header: bold title, italic UTC timestamp,
/// blank line, body.
pub fn format_scan_message(summary: &str, scanned_at: DateTime<Utc>) -> String {
    format!(
        "🔍 *X Monitor Scan*\n_{}_\n\n{}",
        scanned_at.format("%Y-%m-%d %H:%M UTC"),
        summary
    )
}

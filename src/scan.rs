use anyhow::Result;
use chrono::Utc;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;

use crate::analyze::{worth_posting, Summarizer};
use crate::config::MonitorConfig;
use crate::fetch::{fetch_all, types::PostSource};
use crate::notify::{format_scan_message, Notifier};
use crate::state::{ScanState, StateStore};

static METRICS_DESCRIBED: OnceCell<()> = OnceCell::new();

fn ensure_metrics_described() {
    METRICS_DESCRIBED.get_or_init(|| {
        describe_counter!("scan_runs_total", "Completed scan cycles.");
        describe_counter!("scan_new_posts_total", "Posts that passed dedup.");
        describe_counter!(
            "scan_notifications_total",
            "Digests delivered to the notifier."
        );
        describe_gauge!(
            "scan_last_run_ts",
            "Unix timestamp of the last completed scan."
        );
    });
}

/// How a scan cycle ended. Every variant still persists state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Every source failed for every account.
    NoData,
    /// Posts came back but all were already seen.
    NoNewPosts,
    /// The summarizer declined or produced nothing worth sending.
    NothingToReport,
    Posted,
    /// A digest was ready but delivery failed.
    NotifyFailed,
}

#[derive(Debug, Clone, Copy)]
pub struct ScanReport {
    pub fetched: usize,
    pub new_posts: usize,
    pub outcome: ScanOutcome,
}

/// One full monitoring pipeline: sources in fallback order, a dedup store,
/// a summarizer and a delivery channel.
pub struct Scanner {
    config: MonitorConfig,
    sources: Vec<Box<dyn PostSource>>,
    summarizer: Box<dyn Summarizer>,
    notifier: Box<dyn Notifier>,
    store: StateStore,
}

impl Scanner {
    pub fn new(
        config: MonitorConfig,
        sources: Vec<Box<dyn PostSource>>,
        summarizer: Box<dyn Summarizer>,
        notifier: Box<dyn Notifier>,
        store: StateStore,
    ) -> Self {
        Self {
            config,
            sources,
            summarizer,
            notifier,
            store,
        }
    }

    /// Runs one cycle. `force_post` summarizes the full fetch even when
    /// dedup finds nothing new.
    pub async fn run_scan(&self, force_post: bool) -> Result<ScanReport> {
        ensure_metrics_described();
        let mut state = self.store.load();

        let posts = fetch_all(
            &self.config.accounts,
            &self.sources,
            self.config.account_delay,
        )
        .await;
        let fetched = posts.len();
        if posts.is_empty() {
            tracing::warn!("no posts retrieved from any source");
            return self.finish(state, 0, 0, ScanOutcome::NoData);
        }

        let new_posts = state.filter_new(&posts);
        state.evict_overflow(self.config.seen_cap);
        counter!("scan_new_posts_total").increment(new_posts.len() as u64);
        tracing::info!(fetched, new = new_posts.len(), "dedup complete");

        if new_posts.is_empty() && !force_post {
            return self.finish(state, fetched, 0, ScanOutcome::NoNewPosts);
        }
        let batch = if new_posts.is_empty() {
            // Forced run with nothing new: feed the whole fetch through.
            posts.as_slice()
        } else {
            new_posts.as_slice()
        };

        let summary = self.summarizer.summarize(batch).await;
        if let Some(s) = summary.as_deref() {
            let preview: String = s.chars().take(200).collect();
            tracing::info!(summarizer = self.summarizer.name(), preview = %preview, "summary received");
        }

        let outcome = match summary {
            Some(s) if worth_posting(&s) => {
                let message = format_scan_message(&s, Utc::now());
                match self.notifier.send(&message).await {
                    Ok(()) => {
                        counter!("scan_notifications_total").increment(1);
                        tracing::info!(notifier = self.notifier.name(), "digest posted");
                        ScanOutcome::Posted
                    }
                    Err(e) => {
                        tracing::error!(error = ?e, "notification failed");
                        ScanOutcome::NotifyFailed
                    }
                }
            }
            _ => {
                tracing::info!("no significant highlights to post");
                ScanOutcome::NothingToReport
            }
        };
        self.finish(state, fetched, new_posts.len(), outcome)
    }

    /// Persists state and emits the cycle metrics. Called on every exit
    /// path so the last-scan timestamp always advances.
    fn finish(
        &self,
        mut state: ScanState,
        fetched: usize,
        new_posts: usize,
        outcome: ScanOutcome,
    ) -> Result<ScanReport> {
        state.touch();
        self.store.save(&state)?;
        counter!("scan_runs_total").increment(1);
        gauge!("scan_last_run_ts").set(Utc::now().timestamp() as f64);
        tracing::info!(?outcome, fetched, new_posts, "scan finished");
        Ok(ScanReport {
            fetched,
            new_posts,
            outcome,
        })
    }
}

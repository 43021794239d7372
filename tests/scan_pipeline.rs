// End-to-end scan cycles over stubbed sources, summarizer and notifier:
// outcome per branch, dedup across runs, state always persisted.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use x_monitor::analyze::Summarizer;
use x_monitor::notify::Notifier;
use x_monitor::{MonitorConfig, Post, PostSource, ScanOutcome, Scanner, StateStore};

struct StubSource {
    posts: Vec<Post>,
}

#[async_trait]
impl PostSource for StubSource {
    async fn fetch(&self, _account: &str) -> anyhow::Result<Vec<Post>> {
        Ok(self.posts.clone())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

struct RecordingSummarizer {
    reply: Option<String>,
    batches: Arc<Mutex<Vec<usize>>>,
}

#[async_trait]
impl Summarizer for RecordingSummarizer {
    async fn summarize(&self, posts: &[Post]) -> Option<String> {
        self.batches.lock().unwrap().push(posts.len());
        self.reply.clone()
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

struct RecordingNotifier {
    fail: bool,
    messages: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &str) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("channel down");
        }
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

const DIGEST: &str =
    "• Raydium shipped CLMM v2 with dynamic fees\n• Jupiter teased a perps integration";

fn sample_posts(n: usize) -> Vec<Post> {
    (0..n)
        .map(|i| Post {
            author: "@feed".to_string(),
            text: format!("pipeline sample post number {i} with plenty of descriptive text"),
            url: format!("https://x.com/feed/status/{i}"),
            timestamp: String::new(),
            source_id: Some("stub".to_string()),
        })
        .collect()
}

fn test_config(dir: &TempDir) -> MonitorConfig {
    let mut cfg = MonitorConfig::default();
    cfg.accounts = vec!["feed".to_string()];
    cfg.account_delay = Duration::ZERO;
    cfg.state_path = dir.path().join("state.json");
    cfg
}

struct Harness {
    scanner: Scanner,
    batches: Arc<Mutex<Vec<usize>>>,
    messages: Arc<Mutex<Vec<String>>>,
    state_path: std::path::PathBuf,
}

fn harness(dir: &TempDir, posts: Vec<Post>, reply: Option<&str>, notify_fails: bool) -> Harness {
    let cfg = test_config(dir);
    let state_path = cfg.state_path.clone();
    let batches = Arc::new(Mutex::new(Vec::new()));
    let messages = Arc::new(Mutex::new(Vec::new()));

    let scanner = Scanner::new(
        cfg,
        vec![Box::new(StubSource { posts }) as Box<dyn PostSource>],
        Box::new(RecordingSummarizer {
            reply: reply.map(|s| s.to_string()),
            batches: Arc::clone(&batches),
        }),
        Box::new(RecordingNotifier {
            fail: notify_fails,
            messages: Arc::clone(&messages),
        }),
        StateStore::new(state_path.clone()),
    );

    Harness {
        scanner,
        batches,
        messages,
        state_path,
    }
}

#[tokio::test]
async fn fresh_posts_get_posted_and_state_persists() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(&dir, sample_posts(5), Some(DIGEST), false);

    let report = h.scanner.run_scan(false).await.unwrap();
    assert_eq!(report.outcome, ScanOutcome::Posted);
    assert_eq!(report.fetched, 5);
    assert_eq!(report.new_posts, 5);

    let messages = h.messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("🔍 *X Monitor Scan*"));
    assert!(messages[0].ends_with(DIGEST));

    let state = StateStore::new(h.state_path.clone()).load();
    assert_eq!(state.seen_hashes.len(), 5);
    assert!(state.last_scan.is_some());
}

#[tokio::test]
async fn second_scan_never_reaches_the_summarizer() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(&dir, sample_posts(5), Some(DIGEST), false);

    h.scanner.run_scan(false).await.unwrap();
    let report = h.scanner.run_scan(false).await.unwrap();

    assert_eq!(report.outcome, ScanOutcome::NoNewPosts);
    assert_eq!(report.new_posts, 0);
    assert_eq!(h.batches.lock().unwrap().len(), 1);
    assert_eq!(h.messages.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn forced_scan_summarizes_the_full_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(&dir, sample_posts(5), Some(DIGEST), false);

    h.scanner.run_scan(false).await.unwrap();
    let report = h.scanner.run_scan(true).await.unwrap();

    assert_eq!(report.outcome, ScanOutcome::Posted);
    assert_eq!(report.new_posts, 0);
    // Second call saw every fetched post, not just the new ones.
    assert_eq!(*h.batches.lock().unwrap(), vec![5, 5]);
    assert_eq!(h.messages.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn sentinel_reply_is_not_posted() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(
        &dir,
        sample_posts(5),
        Some("No major highlights this hour."),
        false,
    );

    let report = h.scanner.run_scan(false).await.unwrap();
    assert_eq!(report.outcome, ScanOutcome::NothingToReport);
    assert!(h.messages.lock().unwrap().is_empty());

    // Dedup still advanced; the posts won't resurface next scan.
    let state = StateStore::new(h.state_path.clone()).load();
    assert_eq!(state.seen_hashes.len(), 5);
}

#[tokio::test]
async fn trivial_reply_is_not_posted() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(&dir, sample_posts(5), Some("ok"), false);

    let report = h.scanner.run_scan(false).await.unwrap();
    assert_eq!(report.outcome, ScanOutcome::NothingToReport);
    assert!(h.messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn declined_summary_is_not_posted() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(&dir, sample_posts(5), None, false);

    let report = h.scanner.run_scan(false).await.unwrap();
    assert_eq!(report.outcome, ScanOutcome::NothingToReport);
    assert!(h.messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_fetch_still_stamps_the_state() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(&dir, Vec::new(), Some(DIGEST), false);

    let report = h.scanner.run_scan(false).await.unwrap();
    assert_eq!(report.outcome, ScanOutcome::NoData);
    assert!(h.batches.lock().unwrap().is_empty());
    assert!(h.messages.lock().unwrap().is_empty());

    let state = StateStore::new(h.state_path.clone()).load();
    assert!(state.seen_hashes.is_empty());
    assert!(state.last_scan.is_some());
}

#[tokio::test]
async fn failed_delivery_still_persists_state() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(&dir, sample_posts(5), Some(DIGEST), true);

    let report = h.scanner.run_scan(false).await.unwrap();
    assert_eq!(report.outcome, ScanOutcome::NotifyFailed);

    // The fingerprints are kept, so delivery failures skip those posts for
    // good rather than retrying them forever.
    let state = StateStore::new(h.state_path.clone()).load();
    assert_eq!(state.seen_hashes.len(), 5);
}

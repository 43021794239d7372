// src/state.rs
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::fetch::types::Post;

/// Retained dedup window; oldest fingerprints age out first. A fingerprint
/// that ages out may legitimately re-surface its post in a later digest.
pub const DEFAULT_SEEN_CAP: usize = 500;

/// Characters of post text covered by the fingerprint. The truncation is
/// load-bearing: long posts sharing a 100-char prefix dedup together, and
/// widening it would change which posts the pipeline reports as new.
const FINGERPRINT_CHARS: usize = 100;

/// Stable dedup key for a post: SHA-256 hex over the leading text.
pub fn fingerprint(text: &str) -> String {
    let prefix: String = text.chars().take(FINGERPRINT_CHARS).collect();
    format!("{:x}", Sha256::digest(prefix.as_bytes()))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanState {
    #[serde(default)]
    pub seen_hashes: Vec<String>,
    #[serde(default)]
    pub last_scan: Option<String>,
}

impl ScanState {
    /// Keep the posts not seen before, appending their fingerprints as we
    /// go — an in-batch duplicate is kept exactly once, first occurrence
    /// wins.
    pub fn filter_new(&mut self, posts: &[Post]) -> Vec<Post> {
        let mut seen: HashSet<String> = self.seen_hashes.iter().cloned().collect();
        let mut fresh = Vec::new();
        for post in posts {
            let fp = fingerprint(&post.text);
            if seen.insert(fp.clone()) {
                self.seen_hashes.push(fp);
                fresh.push(post.clone());
            }
        }
        fresh
    }

    /// Truncate to the newest `cap` fingerprints, dropping the oldest.
    /// Runs after insertion so a scan's own fingerprints count against the
    /// window.
    pub fn evict_overflow(&mut self, cap: usize) {
        if self.seen_hashes.len() > cap {
            let excess = self.seen_hashes.len() - cap;
            self.seen_hashes.drain(0..excess);
        }
    }

    /// Refresh the last-scan stamp (UTC, RFC 3339).
    pub fn touch(&mut self) {
        self.last_scan =
            Some(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true));
    }
}

/// Single-document store for `ScanState` at a fixed path. One scan loads at
/// start and saves at end; there are no concurrent writers.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load persisted state. A missing or unreadable document yields a
    /// fresh default — a scan never fails because of a bad state file.
    pub fn load(&self) -> ScanState {
        match fs::read_to_string(&self.path) {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(state) => state,
                Err(e) => {
                    tracing::warn!(
                        error = ?e,
                        path = %self.path.display(),
                        "corrupt state file, starting fresh"
                    );
                    ScanState::default()
                }
            },
            Err(_) => ScanState::default(),
        }
    }

    /// Persist atomically: write a sibling temp file, then rename over the
    /// real one. Write failure is a real error and surfaces to the caller.
    pub fn save(&self, state: &ScanState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating state dir {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(state).context("serializing state")?;
        let tmp = self.path.with_extension("json.tmp");
        let mut f =
            fs::File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
        f.write_all(json.as_bytes()).context("writing state")?;
        fs::rename(&tmp, &self.path).context("renaming state into place")?;
        Ok(())
    }
}

/// Preferred absolute location when the container volume exists, else a
/// dot-dir under the user's home.
pub fn default_state_path() -> PathBuf {
    if Path::new("/data").exists() {
        PathBuf::from("/data/x-monitor-state.json")
    } else {
        crate::config::home_dir().join(".openclaw/skills/x-monitor/state.json")
    }
}

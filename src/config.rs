use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Path to an accounts file (TOML or JSON); overrides the local defaults.
pub const ENV_ACCOUNTS_PATH: &str = "X_MONITOR_ACCOUNTS";
/// Path to the scan-state file; overrides the platform default.
pub const ENV_STATE_PATH: &str = "X_MONITOR_STATE";

/// Watched handles when no accounts file is present.
pub const DEFAULT_ACCOUNTS: &[&str] = &[
    "Pumpfun",         // memecoin launchpad
    "Raydium",         // Solana AMM
    "MeteoraAG",       // dynamic liquidity
    "MarioNawfal",     // breaking news aggregator
    "RohOnChain",      // on-chain analysis
    "xDaily",          // platform updates
    "JupiterExchange", // swap aggregator
];

/// Runtime configuration for a scan. Everything has a working default so
/// the binary runs with no files at all.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub accounts: Vec<String>,
    pub rss_bridge_instances: Vec<String>,
    pub nitter_instances: Vec<String>,
    pub syndication_base: String,
    pub twstalker_base: String,
    pub seen_cap: usize,
    pub account_delay: Duration,
    pub state_path: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            accounts: DEFAULT_ACCOUNTS.iter().map(|s| s.to_string()).collect(),
            rss_bridge_instances: vec!["https://rss-bridge.org/bridge01/".to_string()],
            nitter_instances: vec![
                "https://nitter.poast.org".to_string(),
                "https://nitter.privacydev.net".to_string(),
            ],
            syndication_base: "https://cdn.syndication.twimg.com".to_string(),
            twstalker_base: "https://twstalker.com".to_string(),
            seen_cap: crate::state::DEFAULT_SEEN_CAP,
            account_delay: Duration::from_secs(2),
            state_path: crate::state::default_state_path(),
        }
    }
}

impl MonitorConfig {
    /// Defaults, then the accounts file (env path or local `config/`), then
    /// env overrides. An unreadable accounts file logs a warning and keeps
    /// the built-in list.
    pub fn load() -> Self {
        let mut cfg = Self::default();
        match load_accounts_default() {
            Ok(accounts) if !accounts.is_empty() => cfg.accounts = accounts,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = ?e, "accounts config unreadable; using defaults")
            }
        }
        if let Ok(path) = std::env::var(ENV_STATE_PATH) {
            if !path.trim().is_empty() {
                cfg.state_path = PathBuf::from(path.trim());
            }
        }
        cfg
    }
}

/// `X_MONITOR_ACCOUNTS` first, then `config/accounts.toml`, then
/// `config/accounts.json`. No file at all is not an error.
pub fn load_accounts_default() -> Result<Vec<String>> {
    if let Ok(path) = std::env::var(ENV_ACCOUNTS_PATH) {
        if !path.trim().is_empty() {
            return load_accounts_from(Path::new(path.trim()));
        }
    }
    for candidate in ["config/accounts.toml", "config/accounts.json"] {
        let path = Path::new(candidate);
        if path.exists() {
            return load_accounts_from(path);
        }
    }
    Ok(Vec::new())
}

pub fn load_accounts_from(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read accounts file {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str());
    let accounts = parse_accounts(&content, ext)
        .with_context(|| format!("failed to parse accounts file {}", path.display()))?;
    Ok(clean_list(accounts))
}

fn parse_accounts(content: &str, ext: Option<&str>) -> Result<Vec<String>> {
    match ext {
        Some("json") => parse_json(content),
        Some("toml") => parse_toml(content),
        _ => parse_toml(content).or_else(|_| parse_json(content)),
    }
}

fn parse_toml(content: &str) -> Result<Vec<String>> {
    #[derive(Deserialize)]
    struct TomlAccounts {
        accounts: Vec<String>,
    }
    let parsed: TomlAccounts = toml::from_str(content)?;
    Ok(parsed.accounts)
}

fn parse_json(content: &str) -> Result<Vec<String>> {
    Ok(serde_json::from_str(content)?)
}

/// Trims, strips a leading `@`, drops blanks, dedups case-insensitively
/// keeping first occurrence.
fn clean_list(raw: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in raw {
        let name = item.trim().trim_start_matches('@').to_string();
        if name.is_empty() {
            continue;
        }
        if seen.insert(name.to_ascii_lowercase()) {
            out.push(name);
        }
    }
    out
}

pub fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

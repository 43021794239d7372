// src/fetch/sources/mod.rs
pub mod nitter;
pub mod rss_bridge;
pub mod syndication;
pub mod twstalker;

use crate::config::MonitorConfig;
use crate::fetch::types::PostSource;

/// Build the adapter chain in fallback priority order: most structured and
/// reliable backend first, raw HTML scrape last.
pub fn default_sources(cfg: &MonitorConfig) -> Vec<Box<dyn PostSource>> {
    vec![
        Box::new(rss_bridge::RssBridgeSource::new(
            cfg.rss_bridge_instances.clone(),
        )),
        Box::new(nitter::NitterSource::new(cfg.nitter_instances.clone())),
        Box::new(syndication::SyndicationSource::new(
            cfg.syndication_base.clone(),
        )),
        Box::new(twstalker::TwstalkerSource::new(cfg.twstalker_base.clone())),
    ]
}

// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod state;

// Post retrieval (fallback source chain)
pub mod fetch;

// Summarization and delivery
pub mod analyze;
pub mod notify;

// Scan orchestration
pub mod scan;

// ---- Re-exports for stable public API ----
pub use crate::config::MonitorConfig;
pub use crate::fetch::types::{Post, PostSource};
pub use crate::scan::{ScanOutcome, ScanReport, Scanner};
pub use crate::state::{ScanState, StateStore};

//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (js `Date` on web via chrono's wasmbind)
//! - Storage (LocalStorage on web, in-memory natively)

pub mod storage;

use chrono::{DateTime, Utc};

pub use storage::{KeyValueStore, MemoryStore};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;

/// Current wall-clock time
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Seed for the id RNG, taken from the clock like the page-load seed
pub fn clock_seed() -> u64 {
    now().timestamp_millis() as u64
}

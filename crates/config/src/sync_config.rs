//! Sync loop configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning for the sync loop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    /// Fixed wait between cycles, also the adaptive fallback
    pub interval_minutes: u64,

    /// Derive waits from the airing schedule
    pub adaptive: bool,

    /// Number of recently added tracks remembered
    pub cache_size: usize,

    /// Remove tracks from the playlist once they leave the cache
    pub delete_evicted: bool,

    /// Retry budget for startup operations
    pub startup_budget_secs: u64,

    /// Retry budget for each remote call inside a cycle
    pub cycle_budget_secs: u64,

    /// Lower bound on adaptive waits
    pub min_interval_secs: u64,
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }

    pub fn startup_budget(&self) -> Duration {
        Duration::from_secs(self.startup_budget_secs)
    }

    pub fn cycle_budget(&self) -> Duration {
        Duration::from_secs(self.cycle_budget_secs)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_secs(self.min_interval_secs)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 5,
            adaptive: false,
            cache_size: 100,
            delete_evicted: false,
            startup_budget_secs: 300,
            cycle_budget_secs: 60,
            min_interval_secs: 10,
        }
    }
}

impl ConfigSection for SyncConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let results = vec![
            Validator::in_range(self.interval_minutes, 1, 1440, "sync.interval_minutes"),
            Validator::in_range(self.cache_size, 1, 10_000, "sync.cache_size"),
            Validator::in_range(self.startup_budget_secs, 1, 86_400, "sync.startup_budget_secs"),
            Validator::in_range(self.cycle_budget_secs, 1, 3_600, "sync.cycle_budget_secs"),
            Validator::in_range(self.min_interval_secs, 1, 3_600, "sync.min_interval_secs"),
        ];

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        self.interval_minutes = other.interval_minutes;
        self.adaptive = other.adaptive;
        self.cache_size = other.cache_size;
        self.delete_evicted = other.delete_evicted;
        self.startup_budget_secs = other.startup_budget_secs;
        self.cycle_budget_secs = other.cycle_budget_secs;
        self.min_interval_secs = other.min_interval_secs;
    }

    fn section_name(&self) -> &'static str {
        "sync"
    }
}

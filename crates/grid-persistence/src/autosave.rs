//! Unsaved-change tracking with optional debounced saving.
//!
//! Layout writes are synchronous and there is a single writer, so a debounce
//! only changes how often the blob is written, never what ends up in it.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// When a dirty table layout is written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveConfig {
    /// Save without an explicit request once the debounce has passed.
    pub enabled: bool,

    /// Quiet period after the last change before saving.
    /// Zero writes on every change.
    pub debounce_ms: u64,

    /// Save anyway once the oldest unsaved change is this old.
    pub max_delay_ms: u64,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 0,
            max_delay_ms: 30_000,
        }
    }
}

impl AutoSaveConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn with_debounce(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn should_save(&self, since_last_change_ms: u64, since_first_unsaved_ms: u64) -> bool {
        self.enabled
            && (since_last_change_ms >= self.debounce_ms
                || since_first_unsaved_ms >= self.max_delay_ms)
    }
}

/// Tracks whether the in-memory layout differs from the stored blob.
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    last_change: Option<Instant>,
    first_unsaved_change: Option<Instant>,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.first_unsaved_change.is_some()
    }

    pub fn mark_dirty(&mut self) {
        let now = Instant::now();
        self.last_change = Some(now);
        self.first_unsaved_change.get_or_insert(now);
    }

    pub fn mark_saved(&mut self) {
        self.first_unsaved_change = None;
    }

    /// Whether an automatic save is due under `config`.
    pub fn should_auto_save(&self, config: &AutoSaveConfig) -> bool {
        match (self.last_change, self.first_unsaved_change) {
            (Some(last), Some(first)) => config.should_save(
                last.elapsed().as_millis() as u64,
                first.elapsed().as_millis() as u64,
            ),
            _ => false,
        }
    }
}

//! Engine statistics
//!
//! Lock-free counters written by producers (submitted/dropped) and by the
//! worker (everything else). Readers take a [`StatsSnapshot`].

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct EngineStats {
    submitted: AtomicU64,
    dropped: AtomicU64,
    executed: AtomicU64,
    invalid_ids: AtomicU64,
    refused: AtomicU64,
    backend_panics: AtomicU64,
    playing: AtomicUsize,
}

/// Point-in-time copy of [`EngineStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Commands accepted by the channel
    pub submitted: u64,
    /// Commands discarded because the channel was full or the worker gone
    pub dropped: u64,
    /// Commands the worker has processed (including failed lookups)
    pub executed: u64,
    /// Stop/SetVolume/SetPitch commands whose play id was not registered
    pub invalid_ids: u64,
    /// Play/Loop commands the backend could not start
    pub refused: u64,
    /// Backend calls that panicked
    pub backend_panics: u64,
    /// Sounds currently in the worker's registry
    pub playing: usize,
}

impl EngineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_executed(&self) {
        self.executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid_id(&self) {
        self.invalid_ids.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_refused(&self) {
        self.refused.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_backend_panic(&self) {
        self.backend_panics.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_playing(&self, playing: usize) {
        self.playing.store(playing, Ordering::Release);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            executed: self.executed.load(Ordering::Relaxed),
            invalid_ids: self.invalid_ids.load(Ordering::Relaxed),
            refused: self.refused.load(Ordering::Relaxed),
            backend_panics: self.backend_panics.load(Ordering::Relaxed),
            playing: self.playing.load(Ordering::Acquire),
        }
    }
}

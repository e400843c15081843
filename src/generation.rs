//! Last-request-wins generation tokens.
//!
//! A caller that may start a new resolution before the previous one has
//! finished (the user picked another episode) keeps one [`Generations`] and
//! takes a [`GenerationTicket`] per resolution. Starting a new generation
//! makes every older ticket stale: the orchestrator stops trying providers
//! for a stale ticket, and [`GenerationTicket::accept`] drops any result
//! that arrives late.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared generation counter.
#[derive(Debug, Clone, Default)]
pub struct Generations {
    current: Arc<AtomicU64>,
}

impl Generations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, superseding all earlier tickets.
    pub fn begin(&self) -> GenerationTicket {
        let id = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        GenerationTicket {
            id,
            current: Arc::clone(&self.current),
        }
    }

    /// Mark every outstanding ticket stale without starting a resolution.
    pub fn invalidate(&self) {
        self.current.fetch_add(1, Ordering::AcqRel);
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }
}

/// Identifies one resolution's generation.
#[derive(Debug, Clone)]
pub struct GenerationTicket {
    id: u64,
    current: Arc<AtomicU64>,
}

impl GenerationTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// `false` once a newer generation has begun.
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.id
    }

    pub fn is_stale(&self) -> bool {
        !self.is_current()
    }

    /// Hand `value` back only if this ticket is still current.
    pub fn accept<T>(&self, value: T) -> Option<T> {
        self.is_current().then_some(value)
    }
}

//! Cooperative deferred-action scheduler
//!
//! Delayed visual steps are queued with the generation that was current
//! when they were scheduled. Bumping the generation turns everything
//! queued before it into a no-op without having to find and remove it.

use std::time::{Duration, Instant};

/// A queued action
#[derive(Clone, Debug)]
struct Deferred<A> {
    due: Instant,
    generation: u64,
    action: A,
}

/// Single-threaded timer queue polled by the host loop
#[derive(Clone, Debug)]
pub struct Scheduler<A> {
    generation: u64,
    pending: Vec<Deferred<A>>,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self {
            generation: 0,
            pending: Vec::new(),
        }
    }

    /// Queue `action` to fire `delay` after `now`; returns its generation
    pub fn schedule(&mut self, now: Instant, delay: Duration, action: A) -> u64 {
        self.pending.push(Deferred {
            due: now + delay,
            generation: self.generation,
            action,
        });
        self.generation
    }

    /// Make every queued action stale
    pub fn invalidate(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    /// Earliest due time among non-stale actions
    pub fn next_due(&self) -> Option<Instant> {
        self.pending
            .iter()
            .filter(|d| d.generation == self.generation)
            .map(|d| d.due)
            .min()
    }

    /// Remove and return every action due at `now`, oldest first
    ///
    /// Stale actions are dropped here and never returned.
    pub fn take_due(&mut self, now: Instant) -> Vec<(u64, A)> {
        let current = self.generation;
        let (mut due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|d| d.due <= now);
        self.pending = waiting;

        due.sort_by_key(|d| d.due);
        due.into_iter()
            .filter(|d| {
                let fresh = d.generation == current;
                if !fresh {
                    tracing::debug!("Dropping stale deferred action (generation {})", d.generation);
                }
                fresh
            })
            .map(|d| (d.generation, d.action))
            .collect()
    }
}

//! Host-driven scheduled continuations with explicit cancellation.
//!
//! Controllers never own real timers. The host advances a virtual clock and
//! each controller drains the continuations that came due, so every delayed
//! reveal or countdown tick runs to completion on the caller's thread.
use serde::{Deserialize, Serialize};

/// Handle for cancelling a scheduled continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerToken(u64);

#[derive(Debug, Clone)]
struct Scheduled<A> {
    token: TimerToken,
    due_ms: u64,
    action: A,
}

/// Pending continuations ordered by due time, then scheduling order.
#[derive(Debug, Clone)]
pub struct Scheduler<A> {
    now_ms: u64,
    next_token: u64,
    pending: Vec<Scheduled<A>>,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Scheduler<A> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now_ms: 0,
            next_token: 0,
            pending: Vec::new(),
        }
    }

    /// Current virtual time in milliseconds.
    #[must_use]
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Deadline `elapsed_ms` after the current time.
    #[must_use]
    pub const fn deadline_after(&self, elapsed_ms: u64) -> u64 {
        self.now_ms.saturating_add(elapsed_ms)
    }

    pub fn schedule(&mut self, delay_ms: u64, action: A) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        self.pending.push(Scheduled {
            token,
            due_ms: self.now_ms.saturating_add(delay_ms),
            action,
        });
        token
    }

    /// Cancel a continuation; returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        let before = self.pending.len();
        self.pending.retain(|entry| entry.token != token);
        self.pending.len() != before
    }

    /// Cancel every pending continuation, returning how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    #[must_use]
    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.pending.iter().any(|entry| entry.token == token)
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Pop the earliest continuation due at or before `deadline_ms`, moving
    /// the clock to its due time.
    pub fn poll(&mut self, deadline_ms: u64) -> Option<A> {
        let position = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due_ms <= deadline_ms)
            .min_by_key(|(_, entry)| (entry.due_ms, entry.token))
            .map(|(position, _)| position)?;
        let entry = self.pending.remove(position);
        self.now_ms = self.now_ms.max(entry.due_ms);
        Some(entry.action)
    }

    /// Move the clock to `deadline_ms` once nothing else is due.
    pub fn settle(&mut self, deadline_ms: u64) {
        self.now_ms = self.now_ms.max(deadline_ms);
    }
}

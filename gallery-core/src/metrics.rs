// SPDX-License-Identifier: MIT
//
// Gallery Gate: Question-Gated Access for Image Collections
//
// https://github.com/yourusername/gallery-gate

//! Metrics collection and reporting

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for gate activity
#[derive(Clone)]
pub struct GateMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    challenges_presented: AtomicU64,
    answers_correct: AtomicU64,
    answers_incorrect: AtomicU64,
    grants: AtomicU64,
    denials: AtomicU64,
    lockouts: AtomicU64,
}

/// Point-in-time view of the counters
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub challenges_presented: u64,
    pub answers_correct: u64,
    pub answers_incorrect: u64,
    pub grants: u64,
    pub denials: u64,
    pub lockouts: u64,
}

impl Default for GateMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl GateMetrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    pub fn record_challenge_presented(&self) {
        self.inner.challenges_presented.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_correct_answer(&self) {
        self.inner.answers_correct.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_incorrect_answer(&self) {
        self.inner.answers_incorrect.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_grant(&self) {
        self.inner.grants.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_denial(&self) {
        self.inner.denials.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lockout(&self) {
        self.inner.lockouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn grants(&self) -> u64 {
        self.inner.grants.load(Ordering::Relaxed)
    }

    pub fn lockouts(&self) -> u64 {
        self.inner.lockouts.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            challenges_presented: self.inner.challenges_presented.load(Ordering::Relaxed),
            answers_correct: self.inner.answers_correct.load(Ordering::Relaxed),
            answers_incorrect: self.inner.answers_incorrect.load(Ordering::Relaxed),
            grants: self.inner.grants.load(Ordering::Relaxed),
            denials: self.inner.denials.load(Ordering::Relaxed),
            lockouts: self.inner.lockouts.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = GateMetrics::new();

        metrics.record_challenge_presented();
        metrics.record_incorrect_answer();
        metrics.record_correct_answer();
        metrics.record_grant();
        metrics.record_grant();
        metrics.record_lockout();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.challenges_presented, 1);
        assert_eq!(snapshot.answers_incorrect, 1);
        assert_eq!(snapshot.answers_correct, 1);
        assert_eq!(snapshot.grants, 2);
        assert_eq!(snapshot.denials, 0);
        assert_eq!(snapshot.lockouts, 1);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = GateMetrics::new();
        let clone = metrics.clone();

        clone.record_grant();
        assert_eq!(metrics.grants(), 1);
    }
}

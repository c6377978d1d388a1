//! Access gate state machine for protected collections
//!
//! The gate is the single authority deciding, per collection id, whether the
//! caller may proceed, and it drives the challenge sequence to a pass or fail
//! outcome. Per collection the machine runs
//! `Idle -> Challenging(i) -> {Challenging(i+1) | Granted | LockedOut | Idle}`;
//! `Granted` and `LockedOut` are terminal with respect to persisted state.
//! Every answer outcome is a normal transition; nothing here is a fault.

use crate::events::{DenialReason, GateEvent};
use crate::metrics::GateMetrics;
use crate::registry::{Challenge, Collection, Registry};
use crate::store::{AccessStore, GateRecords};
use crate::{Error, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Working state of one active challenge sequence
///
/// Transient: created fresh when a sequence starts, discarded on grant,
/// lockout, or abandon. Never persisted.
#[derive(Debug, Clone)]
pub struct GateSession {
    pub collection_id: String,
    /// 0-based index into the collection's challenge sequence
    pub challenge_index: usize,
    /// Correlates log lines of one dialog session
    pub session_id: Uuid,
}

/// Read-only access summary for tile rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    /// Unprotected, always passes through
    Open,
    /// Protected, challenge sequence pending
    ChallengeRequired,
    /// Protected, previously granted
    Granted,
    /// Protected, wrong-answer budget exhausted
    LockedOut,
}

/// The access-gate state machine
pub struct AccessGate {
    registry: Arc<Registry>,
    records: GateRecords,
    metrics: GateMetrics,
    session: Option<GateSession>,
}

impl AccessGate {
    /// Create a gate over a registry and a persistence backend
    pub fn new(registry: Arc<Registry>, store: impl AccessStore + 'static) -> Self {
        Self::with_metrics(registry, store, GateMetrics::new())
    }

    /// Create a gate sharing an externally owned metrics handle
    pub fn with_metrics(
        registry: Arc<Registry>,
        store: impl AccessStore + 'static,
        metrics: GateMetrics,
    ) -> Self {
        Self {
            registry,
            records: GateRecords::new(store),
            metrics,
            session: None,
        }
    }

    pub fn metrics(&self) -> &GateMetrics {
        &self.metrics
    }

    /// The in-flight challenge session, if any
    pub fn active_session(&self) -> Option<&GateSession> {
        self.session.as_ref()
    }

    /// The challenge currently awaiting an answer, if any
    pub fn current_challenge(&self) -> Option<&Challenge> {
        let session = self.session.as_ref()?;
        self.registry
            .get(&session.collection_id)?
            .challenges
            .get(session.challenge_index)
    }

    /// Read-only status for one collection, without side effects
    pub fn status(&self, collection_id: &str) -> Result<CollectionStatus> {
        let collection = self.lookup(collection_id)?;

        if !collection.protected {
            return Ok(CollectionStatus::Open);
        }
        if self.records.is_granted(collection_id) {
            return Ok(CollectionStatus::Granted);
        }
        if self.records.failed_attempts(collection_id) >= collection.max_attempts {
            return Ok(CollectionStatus::LockedOut);
        }
        Ok(CollectionStatus::ChallengeRequired)
    }

    /// Decide pass-through, challenge, or lockout for a collection
    ///
    /// An unknown id is a caller bug, not a user-facing denial. Requesting
    /// access while another session is active replaces that session.
    pub fn request_access(&mut self, collection_id: &str) -> Result<GateEvent> {
        let registry = Arc::clone(&self.registry);
        let collection = match registry.get(collection_id) {
            Some(c) => c,
            None => {
                warn!(collection = %collection_id, "access requested for unknown collection");
                return Err(Error::UnknownCollection(collection_id.to_string()));
            }
        };

        if !collection.protected {
            debug!(collection = %collection_id, "unprotected, passing through");
            self.metrics.record_grant();
            return Ok(GateEvent::AccessGranted {
                collection_id: collection_id.to_string(),
            });
        }

        if self.records.is_granted(collection_id) {
            debug!(collection = %collection_id, "previously granted, no challenge");
            self.metrics.record_grant();
            return Ok(GateEvent::AccessGranted {
                collection_id: collection_id.to_string(),
            });
        }

        let failed = self.records.failed_attempts(collection_id);
        if failed >= collection.max_attempts {
            info!(collection = %collection_id, attempts = failed, "locked out, denying access");
            self.metrics.record_denial();
            return Ok(GateEvent::AccessDenied {
                reason: DenialReason::LockedOut,
            });
        }

        let session = GateSession {
            collection_id: collection_id.to_string(),
            challenge_index: 0,
            session_id: Uuid::new_v4(),
        };
        debug!(
            collection = %collection_id,
            session = %session.session_id,
            challenges = collection.challenges.len(),
            "starting challenge sequence"
        );
        self.session = Some(session);
        self.metrics.record_challenge_presented();
        Self::challenge_ready(collection, 0)
    }

    /// Validate the submitted answer for the current challenge
    ///
    /// Input is trimmed; an empty submission consumes no attempt. Comparison
    /// is byte equality, or Unicode-lowercase equality for case-insensitive
    /// challenges. Nothing else is normalized.
    pub fn submit_answer(&mut self, raw: &str) -> Result<GateEvent> {
        let (collection_id, index, session_id) = match &self.session {
            Some(s) => (s.collection_id.clone(), s.challenge_index, s.session_id),
            None => return Err(Error::NoActiveSession),
        };

        let registry = Arc::clone(&self.registry);
        let collection = registry.get(&collection_id).ok_or_else(|| {
            Error::Internal(format!(
                "active session references unknown collection '{}'",
                collection_id
            ))
        })?;
        let challenge = collection.challenges.get(index).ok_or_else(|| {
            Error::Internal(format!(
                "challenge index {} out of range for '{}'",
                index, collection_id
            ))
        })?;

        let answer = raw.trim();
        if answer.is_empty() {
            debug!(session = %session_id, "empty answer, no attempt consumed");
            return Ok(GateEvent::AnswerRequired);
        }

        let correct = if challenge.case_sensitive {
            answer == challenge.expected_answer
        } else {
            answer.to_lowercase() == challenge.expected_answer.to_lowercase()
        };

        if correct {
            self.metrics.record_correct_answer();
            let next = index + 1;

            if next < collection.challenges.len() {
                debug!(session = %session_id, index = next, "challenge passed, advancing");
                if let Some(session) = self.session.as_mut() {
                    session.challenge_index = next;
                }
                self.metrics.record_challenge_presented();
                return Self::challenge_ready(collection, next);
            }

            // Sequence exhausted in one unbroken pass
            self.records.grant(&collection_id);
            self.session = None;
            self.metrics.record_grant();
            info!(
                collection = %collection_id,
                session = %session_id,
                "challenge sequence passed, access granted"
            );
            return Ok(GateEvent::AccessGranted { collection_id });
        }

        self.metrics.record_incorrect_answer();
        let failed = self.records.record_failure(&collection_id);
        let remaining = collection.max_attempts.saturating_sub(failed);

        if remaining == 0 {
            self.session = None;
            self.metrics.record_lockout();
            warn!(
                collection = %collection_id,
                session = %session_id,
                attempts = failed,
                "attempt limit reached, locking out"
            );
            return Ok(GateEvent::LockedOut);
        }

        debug!(
            session = %session_id,
            remaining,
            "wrong answer, re-presenting current challenge"
        );
        Ok(GateEvent::IncorrectAnswer { remaining })
    }

    /// Discard the in-memory session; persisted counters are untouched
    ///
    /// Returns whether a session was active. The next `request_access` for
    /// the same collection restarts the sequence at challenge 0.
    pub fn abandon(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                debug!(
                    collection = %session.collection_id,
                    session = %session.session_id,
                    "challenge session abandoned"
                );
                true
            }
            None => false,
        }
    }

    /// External reset: clear persisted grant and attempt state for one collection
    ///
    /// This is the only way out of lockout. Also drops a matching active
    /// session, if any.
    pub fn reset_collection(&mut self, collection_id: &str) -> Result<()> {
        self.lookup(collection_id)?;

        if self
            .session
            .as_ref()
            .is_some_and(|s| s.collection_id == collection_id)
        {
            self.session = None;
        }

        self.records.reset(collection_id);
        info!(collection = %collection_id, "persisted gate state cleared");
        Ok(())
    }

    fn lookup(&self, collection_id: &str) -> Result<&Collection> {
        self.registry.get(collection_id).ok_or_else(|| {
            warn!(collection = %collection_id, "unknown collection");
            Error::UnknownCollection(collection_id.to_string())
        })
    }

    fn challenge_ready(collection: &Collection, index: usize) -> Result<GateEvent> {
        let challenge = collection.challenges.get(index).ok_or_else(|| {
            Error::Internal(format!(
                "challenge index {} out of range for '{}'",
                index, collection.id
            ))
        })?;
        Ok(GateEvent::ChallengeReady {
            prompt: challenge.prompt.clone(),
            position: index + 1,
            total: collection.challenges.len(),
        })
    }
}

//! Outcome events emitted by the access gate
//!
//! The gate never renders anything. Every decision it makes is expressed as a
//! [`GateEvent`] consumed by a presentation adapter, which is responsible for
//! displaying the event and calling back into the gate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason attached to an up-front access denial
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// The wrong-answer budget was exhausted in this or an earlier session
    LockedOut,
}

/// Event emitted by the gate in response to `request_access` or `submit_answer`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GateEvent {
    /// A challenge should be presented to the user
    ChallengeReady {
        /// Display text of the question (opaque to the gate)
        prompt: String,
        /// 1-based position within the sequence
        position: usize,
        /// Total number of challenges in the sequence
        total: usize,
    },

    /// The submitted answer was empty; no attempt was consumed
    AnswerRequired,

    /// The submitted answer was wrong and attempts remain
    IncorrectAnswer { remaining: u32 },

    /// Access is granted; the caller may open the collection
    AccessGranted { collection_id: String },

    /// Access is denied without presenting a challenge
    AccessDenied { reason: DenialReason },

    /// The wrong-answer budget was exhausted on this submission
    LockedOut,
}

impl GateEvent {
    /// True when the event ends the active challenge session
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GateEvent::AccessGranted { .. } | GateEvent::AccessDenied { .. } | GateEvent::LockedOut
        )
    }
}

impl fmt::Display for GateEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateEvent::ChallengeReady {
                prompt,
                position,
                total,
            } => write!(f, "[{}/{}] {}", position, total, prompt),
            GateEvent::AnswerRequired => write!(f, "Please provide an answer."),
            GateEvent::IncorrectAnswer { remaining } => {
                write!(f, "Wrong answer! {} attempt(s) remaining.", remaining)
            }
            GateEvent::AccessGranted { collection_id } => {
                write!(f, "Opening collection '{}'...", collection_id)
            }
            GateEvent::AccessDenied {
                reason: DenialReason::LockedOut,
            } => write!(f, "Access denied: too many wrong answers."),
            GateEvent::LockedOut => write!(
                f,
                "Wrong answer! Attempt limit reached, access is now blocked."
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_events() {
        assert!(GateEvent::AccessGranted {
            collection_id: "family".to_string()
        }
        .is_terminal());
        assert!(GateEvent::LockedOut.is_terminal());
        assert!(!GateEvent::AnswerRequired.is_terminal());
        assert!(!GateEvent::IncorrectAnswer { remaining: 2 }.is_terminal());
    }

    #[test]
    fn test_event_serialization() {
        let event = GateEvent::IncorrectAnswer { remaining: 1 };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("incorrect_answer"));
        let decoded: GateEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn test_display_messages() {
        let ready = GateEvent::ChallengeReady {
            prompt: "What city?".to_string(),
            position: 1,
            total: 2,
        };
        assert_eq!(ready.to_string(), "[1/2] What city?");
        assert_eq!(
            GateEvent::IncorrectAnswer { remaining: 2 }.to_string(),
            "Wrong answer! 2 attempt(s) remaining."
        );
    }
}

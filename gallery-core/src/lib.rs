// SPDX-License-Identifier: MIT
//
// Gallery Gate: Question-Gated Access for Image Collections
//
// https://github.com/yourusername/gallery-gate

//! Gallery Core Library
//!
//! This crate provides the foundational types and logic for the Gallery Gate system.
//! It implements a locally-evaluated knowledge-check gate that controls access to
//! grouped image collections, plus the navigation state for the full-screen viewer.
//!
//! # Architecture
//!
//! The library is organized into modules representing core concerns:
//! - `registry`: Immutable collection descriptions loaded from an external document
//! - `gate`: Access-gate state machine driving challenge sequences to pass/fail
//! - `store`: Durable key/value persistence for grant flags and attempt counters
//! - `events`: Typed outcome events consumed by a presentation adapter
//! - `viewer`: Full-screen slide show navigation state
//! - `metrics`: Counters for grants, denials, and lockouts
//! - `error`: Unified error types
//!
//! # Design Principles
//!
//! 1. **No rendering**: The gate emits typed events; presentation lives elsewhere
//! 2. **Type safety**: Leverage Rust's type system to prevent bugs
//! 3. **Testability**: Storage behind a capability trait with an in-memory fake
//! 4. **Graceful degradation**: A malformed collection never takes down the rest

pub mod error;
pub mod events;
pub mod gate;
pub mod metrics;
pub mod registry;
pub mod store;
pub mod viewer;

pub use error::{Error, Result};
pub use events::{DenialReason, GateEvent};
pub use gate::{AccessGate, CollectionStatus, GateSession};
pub use registry::{Challenge, Collection, Registry};
pub use store::{AccessStore, FileStore, GateRecords, MemoryStore};

/// Library version for diagnostics
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wrong-answer budget applied when a collection does not configure one
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Maximum accepted length for a configured expected answer
pub const MAX_ANSWER_LEN: usize = 256;

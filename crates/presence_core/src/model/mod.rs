//! Presence domain model.
//!
//! # Responsibility
//! - Define events, snapshots, shifts and the status/priority vocabularies
//!   shared by the engine, repositories and service.
//!
//! # Invariants
//! - Timestamps are Unix epoch milliseconds.
//! - Snapshots are immutable once stored.

pub mod event;
pub mod priority;
pub mod shift;
pub mod snapshot;
pub mod status;

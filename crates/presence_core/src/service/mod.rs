//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate the store and the resolution engine into use-case APIs.
//! - Keep callers decoupled from storage details.

pub mod person_locks;
pub mod presence_service;

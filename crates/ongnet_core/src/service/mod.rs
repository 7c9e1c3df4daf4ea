//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Fire save hooks once writes have been committed.
//!
//! # Invariants
//! - Services never bypass repository validation.
//! - A storage error aborts the use case before any hook runs.

pub mod account_service;
pub mod social_service;

//! Domain model for accounts, profiles, and social interactions.
//!
//! # Responsibility
//! - Define canonical records shared by repositories and services.
//! - Keep validation next to the data it guards.
//!
//! # Invariants
//! - Every record is identified by a stable v4 `Uuid`.
//! - A `Profile` belongs to exactly one `User`.

pub mod fields;
pub mod profile;
pub mod social;
pub mod user;

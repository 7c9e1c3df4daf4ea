//! Post-save hooks for likes, comments, and follows.
//!
//! # Responsibility
//! - Route "row saved" events to observers registered per entity kind.
//! - Keep observer failures away from the write path.
//!
//! # Invariants
//! - Observers run synchronously, in registration order, after the write
//!   has been committed.
//! - An observer error or panic is logged and reported, never propagated.

pub mod builtin;
mod registry;

pub use registry::{
    DispatchReport, FnObserver, HookError, HookRegistry, HookRegistryError, ObserverFailure,
    SaveEvent, SaveObserver, SavedInstance,
};

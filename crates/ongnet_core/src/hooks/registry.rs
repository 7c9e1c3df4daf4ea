//! Observer registry and dispatcher.

use crate::logging::truncate_single_line;
use crate::model::social::{Comment, EntityKind, Follower, Like};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use uuid::Uuid;

const MAX_FAILURE_MESSAGE_CHARS: usize = 200;

/// Borrowed view of the row that was just saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavedInstance<'a> {
    Like(&'a Like),
    Comment(&'a Comment),
    Follower(&'a Follower),
}

impl SavedInstance<'_> {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Like(_) => EntityKind::Like,
            Self::Comment(_) => EntityKind::Comment,
            Self::Follower(_) => EntityKind::Follower,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Like(like) => like.id,
            Self::Comment(comment) => comment.id,
            Self::Follower(follower) => follower.id,
        }
    }
}

/// One post-save notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveEvent<'a> {
    pub instance: SavedInstance<'a>,
    /// `true` for an insert, `false` for an update of an existing row.
    pub created: bool,
}

impl<'a> SaveEvent<'a> {
    pub fn created(instance: SavedInstance<'a>) -> Self {
        Self {
            instance,
            created: true,
        }
    }

    pub fn updated(instance: SavedInstance<'a>) -> Self {
        Self {
            instance,
            created: false,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.instance.kind()
    }
}

/// Error returned by an observer. Only ever logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookError {
    message: String,
}

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for HookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for HookError {}

/// Reacts to saved rows of one entity kind.
pub trait SaveObserver: Send + Sync {
    /// Unique per entity kind; used for disconnect and in logs.
    fn name(&self) -> &str;
    fn on_save(&self, event: &SaveEvent<'_>) -> Result<(), HookError>;
}

/// Adapts a closure or plain function into a [`SaveObserver`].
pub struct FnObserver<F> {
    name: String,
    callback: F,
}

impl<F> FnObserver<F>
where
    F: Fn(&SaveEvent<'_>) -> Result<(), HookError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, callback: F) -> Self {
        Self {
            name: name.into(),
            callback,
        }
    }
}

impl<F> SaveObserver for FnObserver<F>
where
    F: Fn(&SaveEvent<'_>) -> Result<(), HookError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_save(&self, event: &SaveEvent<'_>) -> Result<(), HookError> {
        (self.callback)(event)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookRegistryError {
    InvalidObserverName(String),
    DuplicateObserver { kind: EntityKind, name: String },
}

impl Display for HookRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidObserverName(name) => write!(f, "observer name is invalid: `{name}`"),
            Self::DuplicateObserver { kind, name } => {
                write!(f, "observer `{name}` already connected to {kind} saves")
            }
        }
    }
}

impl Error for HookRegistryError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverFailure {
    pub observer: String,
    pub message: String,
}

/// Outcome of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub kind: EntityKind,
    pub created: bool,
    /// Observers that were called, including failed ones.
    pub invoked: usize,
    pub failures: Vec<ObserverFailure>,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Entity kind to ordered observer list.
#[derive(Default, Clone)]
pub struct HookRegistry {
    observers: BTreeMap<EntityKind, Vec<Arc<dyn SaveObserver>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `observer` to the list for `kind`.
    ///
    /// Names must be non-blank and carry no surrounding whitespace, so the
    /// name given to `disconnect` is exactly the one that was connected.
    pub fn connect(
        &mut self,
        kind: EntityKind,
        observer: Arc<dyn SaveObserver>,
    ) -> Result<(), HookRegistryError> {
        let name = observer.name();
        if name.trim().is_empty() || name.trim() != name {
            return Err(HookRegistryError::InvalidObserverName(
                observer.name().to_string(),
            ));
        }

        let list = self.observers.entry(kind).or_default();
        if list.iter().any(|existing| existing.name() == name) {
            return Err(HookRegistryError::DuplicateObserver {
                kind,
                name: name.to_string(),
            });
        }
        list.push(observer);
        Ok(())
    }

    /// Shorthand for connecting a closure.
    pub fn connect_fn<F>(
        &mut self,
        kind: EntityKind,
        name: impl Into<String>,
        callback: F,
    ) -> Result<(), HookRegistryError>
    where
        F: Fn(&SaveEvent<'_>) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.connect(kind, Arc::new(FnObserver::new(name, callback)))
    }

    /// Removes the observer named `name`; returns whether one was removed.
    pub fn disconnect(&mut self, kind: EntityKind, name: &str) -> bool {
        let Some(list) = self.observers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|observer| observer.name() != name);
        list.len() < before
    }

    pub fn observer_names(&self, kind: EntityKind) -> Vec<String> {
        self.observers
            .get(&kind)
            .map(|list| list.iter().map(|o| o.name().to_string()).collect())
            .unwrap_or_default()
    }

    pub fn has_observers(&self, kind: EntityKind) -> bool {
        self.observers.get(&kind).is_some_and(|list| !list.is_empty())
    }

    /// Calls every observer bound to the event's kind.
    pub fn dispatch(&self, event: &SaveEvent<'_>) -> DispatchReport {
        let kind = event.kind();
        let mut report = DispatchReport {
            kind,
            created: event.created,
            invoked: 0,
            failures: Vec::new(),
        };

        for observer in self.observers.get(&kind).into_iter().flatten() {
            report.invoked += 1;
            let outcome = catch_unwind(AssertUnwindSafe(|| observer.on_save(event)));
            let message = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err.message().to_string(),
                Err(_) => "observer panicked".to_string(),
            };

            let message = truncate_single_line(&message, MAX_FAILURE_MESSAGE_CHARS);
            warn!(
                "event=hook_failed module=hooks status=error kind={} created={} instance_id={} observer={} error={}",
                kind,
                event.created,
                event.instance.id(),
                observer.name(),
                message
            );
            report.failures.push(ObserverFailure {
                observer: observer.name().to_string(),
                message,
            });
        }

        debug!(
            "event=hook_dispatch module=hooks status={} kind={} created={} instance_id={} invoked={} failed={}",
            if report.is_clean() { "ok" } else { "partial" },
            kind,
            event.created,
            event.instance.id(),
            report.invoked,
            report.failures.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::{HookError, HookRegistry, HookRegistryError, SaveEvent, SavedInstance};
    use crate::model::social::{EntityKind, Like};
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    fn sample_like() -> Like {
        Like::new(Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn dispatch_runs_observers_in_registration_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HookRegistry::new();
        for name in ["first", "second", "third"] {
            let calls = Arc::clone(&calls);
            registry
                .connect_fn(EntityKind::Like, name, move |_| {
                    calls.lock().expect("calls lock").push(name);
                    Ok(())
                })
                .expect("connect");
        }

        let like = sample_like();
        let report = registry.dispatch(&SaveEvent::created(SavedInstance::Like(&like)));
        assert_eq!(report.invoked, 3);
        assert!(report.is_clean());
        assert_eq!(*calls.lock().expect("calls lock"), vec!["first", "second", "third"]);
    }

    #[test]
    fn dispatch_only_reaches_observers_of_the_event_kind() {
        let mut registry = HookRegistry::new();
        registry
            .connect_fn(EntityKind::Comment, "comment_only", |_| {
                Err(HookError::new("must not run for likes"))
            })
            .expect("connect");

        let like = sample_like();
        let report = registry.dispatch(&SaveEvent::updated(SavedInstance::Like(&like)));
        assert_eq!(report.invoked, 0);
        assert!(!report.created);
    }

    #[test]
    fn failing_and_panicking_observers_are_isolated() {
        let reached = Arc::new(Mutex::new(false));
        let mut registry = HookRegistry::new();
        registry
            .connect_fn(EntityKind::Like, "errors", |_| Err(HookError::new("boom\nline")))
            .expect("connect");
        registry
            .connect_fn(EntityKind::Like, "panics", |_| panic!("observer exploded"))
            .expect("connect");
        let flag = Arc::clone(&reached);
        registry
            .connect_fn(EntityKind::Like, "last", move |_| {
                *flag.lock().expect("flag lock") = true;
                Ok(())
            })
            .expect("connect");

        let like = sample_like();
        let report = registry.dispatch(&SaveEvent::created(SavedInstance::Like(&like)));
        assert_eq!(report.invoked, 3);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].observer, "errors");
        assert_eq!(report.failures[0].message, "boom line");
        assert_eq!(report.failures[1].observer, "panics");
        assert!(*reached.lock().expect("flag lock"));
    }

    #[test]
    fn rejects_duplicate_and_blank_names() {
        let mut registry = HookRegistry::new();
        registry
            .connect_fn(EntityKind::Follower, "notify", |_| Ok(()))
            .expect("first connect");
        let duplicate = registry
            .connect_fn(EntityKind::Follower, "notify", |_| Ok(()))
            .expect_err("duplicate must fail");
        assert!(matches!(duplicate, HookRegistryError::DuplicateObserver { .. }));

        registry
            .connect_fn(EntityKind::Like, "notify", |_| Ok(()))
            .expect("same name on another kind is fine");

        let blank = registry
            .connect_fn(EntityKind::Like, "  ", |_| Ok(()))
            .expect_err("blank must fail");
        assert!(matches!(blank, HookRegistryError::InvalidObserverName(_)));
    }

    #[test]
    fn padded_names_cannot_shadow_existing_observer() {
        let mut registry = HookRegistry::new();
        registry
            .connect_fn(EntityKind::Like, "notify", |_| Ok(()))
            .expect("connect");

        for padded in [" notify", "notify ", "\tnotify"] {
            let err = registry
                .connect_fn(EntityKind::Like, padded, |_| Ok(()))
                .expect_err("padded name must fail");
            assert_eq!(err, HookRegistryError::InvalidObserverName(padded.to_string()));
        }
        assert_eq!(registry.observer_names(EntityKind::Like), vec!["notify"]);

        assert!(!registry.disconnect(EntityKind::Like, " notify"));
        assert!(registry.disconnect(EntityKind::Like, "notify"));
        assert!(!registry.has_observers(EntityKind::Like));
    }

    #[test]
    fn disconnect_removes_by_name() {
        let mut registry = HookRegistry::new();
        registry
            .connect_fn(EntityKind::Comment, "a", |_| Ok(()))
            .expect("connect");
        assert!(registry.has_observers(EntityKind::Comment));
        assert!(registry.disconnect(EntityKind::Comment, "a"));
        assert!(!registry.disconnect(EntityKind::Comment, "a"));
        assert!(!registry.has_observers(EntityKind::Comment));
    }
}

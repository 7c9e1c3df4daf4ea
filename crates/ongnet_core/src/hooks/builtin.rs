//! Built-in observers bound to like, comment, and follow saves.
//!
//! They are extension points for counter caches and notifications and have
//! no side effects yet beyond a debug line.

use crate::hooks::{HookError, HookRegistry, HookRegistryError, SaveEvent, SavedInstance};
use crate::model::social::EntityKind;
use log::debug;

pub const UPDATE_POST_LIKES_COUNT: &str = "update_post_likes_count";
pub const UPDATE_POST_COMMENTS_COUNT: &str = "update_post_comments_count";
pub const CREATE_FOLLOWER_NOTIFICATION: &str = "create_follower_notification";

/// Connects the three built-in observers.
pub fn register_builtin_hooks(registry: &mut HookRegistry) -> Result<(), HookRegistryError> {
    registry.connect_fn(EntityKind::Like, UPDATE_POST_LIKES_COUNT, update_post_likes_count)?;
    registry.connect_fn(
        EntityKind::Comment,
        UPDATE_POST_COMMENTS_COUNT,
        update_post_comments_count,
    )?;
    registry.connect_fn(
        EntityKind::Follower,
        CREATE_FOLLOWER_NOTIFICATION,
        create_follower_notification,
    )?;
    Ok(())
}

/// Will refresh the cached like count of the liked post.
pub fn update_post_likes_count(event: &SaveEvent<'_>) -> Result<(), HookError> {
    if let (true, SavedInstance::Like(like)) = (event.created, event.instance) {
        debug!(
            "event=hook_noop module=hooks observer={} like_id={} post_id={}",
            UPDATE_POST_LIKES_COUNT, like.id, like.post_id
        );
    }
    Ok(())
}

/// Will refresh the cached comment count of the commented post.
pub fn update_post_comments_count(event: &SaveEvent<'_>) -> Result<(), HookError> {
    if let (true, SavedInstance::Comment(comment)) = (event.created, event.instance) {
        debug!(
            "event=hook_noop module=hooks observer={} comment_id={} post_id={}",
            UPDATE_POST_COMMENTS_COUNT, comment.id, comment.post_id
        );
    }
    Ok(())
}

/// Will notify the followed user about a new follower.
pub fn create_follower_notification(event: &SaveEvent<'_>) -> Result<(), HookError> {
    if let (true, SavedInstance::Follower(follower)) = (event.created, event.instance) {
        debug!(
            "event=hook_noop module=hooks observer={} follower_id={} followed_id={}",
            CREATE_FOLLOWER_NOTIFICATION, follower.follower_id, follower.followed_id
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        register_builtin_hooks, CREATE_FOLLOWER_NOTIFICATION, UPDATE_POST_COMMENTS_COUNT,
        UPDATE_POST_LIKES_COUNT,
    };
    use crate::hooks::{HookRegistry, SaveEvent, SavedInstance};
    use crate::model::social::{Comment, EntityKind, Follower, Like};
    use uuid::Uuid;

    #[test]
    fn builtins_bind_one_observer_per_kind() {
        let mut registry = HookRegistry::new();
        register_builtin_hooks(&mut registry).expect("builtins register");

        assert_eq!(registry.observer_names(EntityKind::Like), vec![UPDATE_POST_LIKES_COUNT]);
        assert_eq!(
            registry.observer_names(EntityKind::Comment),
            vec![UPDATE_POST_COMMENTS_COUNT]
        );
        assert_eq!(
            registry.observer_names(EntityKind::Follower),
            vec![CREATE_FOLLOWER_NOTIFICATION]
        );
    }

    #[test]
    fn registering_builtins_twice_fails() {
        let mut registry = HookRegistry::new();
        register_builtin_hooks(&mut registry).expect("first registration");
        assert!(register_builtin_hooks(&mut registry).is_err());
    }

    #[test]
    fn builtins_succeed_for_create_and_update() {
        let mut registry = HookRegistry::new();
        register_builtin_hooks(&mut registry).expect("builtins register");

        let user = Uuid::new_v4();
        let post = Uuid::new_v4();
        let like = Like::new(user, post);
        let comment = Comment::new(user, post, "great work");
        let follower = Follower::new(user, Uuid::new_v4());

        for instance in [
            SavedInstance::Like(&like),
            SavedInstance::Comment(&comment),
            SavedInstance::Follower(&follower),
        ] {
            for event in [SaveEvent::created(instance), SaveEvent::updated(instance)] {
                let report = registry.dispatch(&event);
                assert_eq!(report.invoked, 1);
                assert!(report.is_clean());
            }
        }
    }
}

//! Social use-case service: posts, likes, comments, follows.
//!
//! # Invariants
//! - Each create/update dispatches the bound hooks exactly once, after the
//!   write statement has committed.
//! - Hook failures never turn a successful write into an error.

use crate::hooks::builtin::register_builtin_hooks;
use crate::hooks::{HookRegistry, HookRegistryError, SaveEvent, SavedInstance};
use crate::model::social::{Comment, CommentId, Follower, FollowerId, Like, LikeId, Post, PostId};
use crate::model::user::UserId;
use crate::repo::social_repo::SocialRepository;
use crate::repo::RepoResult;

pub struct SocialService<R: SocialRepository> {
    repo: R,
    hooks: HookRegistry,
}

impl<R: SocialRepository> SocialService<R> {
    pub fn new(repo: R, hooks: HookRegistry) -> Self {
        Self { repo, hooks }
    }

    /// Service with only the built-in observers connected.
    pub fn with_builtin_hooks(repo: R) -> Result<Self, HookRegistryError> {
        let mut hooks = HookRegistry::new();
        register_builtin_hooks(&mut hooks)?;
        Ok(Self::new(repo, hooks))
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    /// Failures are logged inside `dispatch`; the write already stands.
    fn notify(&self, event: &SaveEvent<'_>) {
        let _report = self.hooks.dispatch(event);
    }

    pub fn create_post(&self, author_id: UserId, content: impl Into<String>) -> RepoResult<Post> {
        let post = Post::new(author_id, content);
        self.repo.create_post(&post)?;
        Ok(post)
    }

    pub fn get_post(&self, id: PostId) -> RepoResult<Option<Post>> {
        self.repo.get_post(id)
    }

    pub fn delete_post(&self, id: PostId) -> RepoResult<()> {
        self.repo.delete_post(id)
    }

    pub fn create_like(&self, user_id: UserId, post_id: PostId) -> RepoResult<Like> {
        let like = Like::new(user_id, post_id);
        self.repo.create_like(&like)?;
        self.notify(&SaveEvent::created(SavedInstance::Like(&like)));
        Ok(like)
    }

    pub fn update_like(&self, like: &Like) -> RepoResult<()> {
        self.repo.update_like(like)?;
        self.notify(&SaveEvent::updated(SavedInstance::Like(like)));
        Ok(())
    }

    pub fn get_like(&self, id: LikeId) -> RepoResult<Option<Like>> {
        self.repo.get_like(id)
    }

    pub fn delete_like(&self, id: LikeId) -> RepoResult<()> {
        self.repo.delete_like(id)
    }

    pub fn count_likes_for_post(&self, post_id: PostId) -> RepoResult<u64> {
        self.repo.count_likes_for_post(post_id)
    }

    pub fn create_comment(
        &self,
        user_id: UserId,
        post_id: PostId,
        body: impl Into<String>,
    ) -> RepoResult<Comment> {
        let comment = Comment::new(user_id, post_id, body);
        self.repo.create_comment(&comment)?;
        self.notify(&SaveEvent::created(SavedInstance::Comment(&comment)));
        Ok(comment)
    }

    pub fn update_comment(&self, comment: &Comment) -> RepoResult<()> {
        self.repo.update_comment(comment)?;
        self.notify(&SaveEvent::updated(SavedInstance::Comment(comment)));
        Ok(())
    }

    pub fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>> {
        self.repo.get_comment(id)
    }

    pub fn delete_comment(&self, id: CommentId) -> RepoResult<()> {
        self.repo.delete_comment(id)
    }

    pub fn count_comments_for_post(&self, post_id: PostId) -> RepoResult<u64> {
        self.repo.count_comments_for_post(post_id)
    }

    /// `follower_id` starts following `followed_id`.
    pub fn create_follower(&self, follower_id: UserId, followed_id: UserId) -> RepoResult<Follower> {
        let follower = Follower::new(follower_id, followed_id);
        self.repo.create_follower(&follower)?;
        self.notify(&SaveEvent::created(SavedInstance::Follower(&follower)));
        Ok(follower)
    }

    pub fn update_follower(&self, follower: &Follower) -> RepoResult<()> {
        self.repo.update_follower(follower)?;
        self.notify(&SaveEvent::updated(SavedInstance::Follower(follower)));
        Ok(())
    }

    pub fn get_follower(&self, id: FollowerId) -> RepoResult<Option<Follower>> {
        self.repo.get_follower(id)
    }

    pub fn delete_follower(&self, id: FollowerId) -> RepoResult<()> {
        self.repo.delete_follower(id)
    }

    pub fn count_followers(&self, user_id: UserId) -> RepoResult<u64> {
        self.repo.count_followers(user_id)
    }
}

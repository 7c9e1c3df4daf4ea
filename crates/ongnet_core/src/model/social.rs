//! Social interaction records: posts, likes, comments, follows.
//!
//! These are intentionally minimal; they exist so save hooks have concrete
//! rows to fire on.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type PostId = Uuid;
pub type LikeId = Uuid;
pub type CommentId = Uuid;
pub type FollowerId = Uuid;

/// Entity types that carry save hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Like,
    Comment,
    Follower,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Comment => "comment",
            Self::Follower => "follower",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub content: String,
}

impl Post {
    pub fn new(author_id: UserId, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            content: content.into(),
        }
    }

    pub fn validate(&self) -> Result<(), SocialValidationError> {
        if self.content.trim().is_empty() {
            return Err(SocialValidationError::EmptyPostContent);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub id: LikeId,
    pub user_id: UserId,
    pub post_id: PostId,
}

impl Like {
    pub fn new(user_id: UserId, post_id: PostId) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            post_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub user_id: UserId,
    pub post_id: PostId,
    pub body: String,
}

impl Comment {
    pub fn new(user_id: UserId, post_id: PostId, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            post_id,
            body: body.into(),
        }
    }

    pub fn validate(&self) -> Result<(), SocialValidationError> {
        if self.body.trim().is_empty() {
            return Err(SocialValidationError::EmptyCommentBody);
        }
        Ok(())
    }
}

/// `follower_id` follows `followed_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follower {
    pub id: FollowerId,
    pub follower_id: UserId,
    pub followed_id: UserId,
}

impl Follower {
    pub fn new(follower_id: UserId, followed_id: UserId) -> Self {
        Self {
            id: Uuid::new_v4(),
            follower_id,
            followed_id,
        }
    }

    pub fn validate(&self) -> Result<(), SocialValidationError> {
        if self.follower_id == self.followed_id {
            return Err(SocialValidationError::SelfFollow(self.follower_id));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocialValidationError {
    EmptyCommentBody,
    EmptyPostContent,
    SelfFollow(UserId),
}

impl Display for SocialValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCommentBody => write!(f, "comment body cannot be empty"),
            Self::EmptyPostContent => write!(f, "post content cannot be empty"),
            Self::SelfFollow(id) => write!(f, "user {id} cannot follow themself"),
        }
    }
}

impl Error for SocialValidationError {}

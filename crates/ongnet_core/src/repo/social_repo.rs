//! Post/like/comment/follow repository contracts and SQLite implementation.
//!
//! # Invariants
//! - One like per `(user, post)` and one follow per `(follower, followed)`;
//!   duplicates surface as storage unique violations.
//! - Every row references existing users/posts (`foreign_keys=ON`).

use crate::model::social::{Comment, CommentId, Follower, FollowerId, Like, LikeId, Post, PostId};
use crate::model::user::UserId;
use crate::repo::{ensure_tables, uuid_column, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

/// Repository interface for social interactions.
pub trait SocialRepository {
    fn create_post(&self, post: &Post) -> RepoResult<PostId>;
    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>>;
    fn delete_post(&self, id: PostId) -> RepoResult<()>;

    fn create_like(&self, like: &Like) -> RepoResult<LikeId>;
    fn update_like(&self, like: &Like) -> RepoResult<()>;
    fn get_like(&self, id: LikeId) -> RepoResult<Option<Like>>;
    fn delete_like(&self, id: LikeId) -> RepoResult<()>;
    fn count_likes_for_post(&self, post_id: PostId) -> RepoResult<u64>;

    fn create_comment(&self, comment: &Comment) -> RepoResult<CommentId>;
    fn update_comment(&self, comment: &Comment) -> RepoResult<()>;
    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>>;
    fn delete_comment(&self, id: CommentId) -> RepoResult<()>;
    fn count_comments_for_post(&self, post_id: PostId) -> RepoResult<u64>;

    fn create_follower(&self, follower: &Follower) -> RepoResult<FollowerId>;
    fn update_follower(&self, follower: &Follower) -> RepoResult<()>;
    fn get_follower(&self, id: FollowerId) -> RepoResult<Option<Follower>>;
    fn delete_follower(&self, id: FollowerId) -> RepoResult<()>;
    /// Number of users following `user_id`.
    fn count_followers(&self, user_id: UserId) -> RepoResult<u64>;
}

/// SQLite-backed social repository.
pub struct SqliteSocialRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSocialRepository<'conn> {
    /// Wraps a migrated connection; fails when social tables are missing.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["posts", "likes", "comments", "followers"])?;
        Ok(Self { conn })
    }

    fn delete_by_id(&self, table: &'static str, entity: &'static str, id: Uuid) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(&format!("DELETE FROM {table} WHERE id = ?1;"), [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(entity, id));
        }
        Ok(())
    }

    fn count_where(&self, sql: &str, id: Uuid) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row(sql, [id.to_string()], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

impl SocialRepository for SqliteSocialRepository<'_> {
    fn create_post(&self, post: &Post) -> RepoResult<PostId> {
        post.validate()?;
        self.conn.execute(
            "INSERT INTO posts (id, author_id, content) VALUES (?1, ?2, ?3);",
            params![
                post.id.to_string(),
                post.author_id.to_string(),
                post.content.as_str(),
            ],
        )?;
        Ok(post.id)
    }

    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>> {
        self.conn
            .query_row(
                "SELECT id, author_id, content FROM posts WHERE id = ?1;",
                [id.to_string()],
                |row| Ok(post_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn delete_post(&self, id: PostId) -> RepoResult<()> {
        self.delete_by_id("posts", "post", id)
    }

    fn create_like(&self, like: &Like) -> RepoResult<LikeId> {
        self.conn.execute(
            "INSERT INTO likes (id, user_id, post_id) VALUES (?1, ?2, ?3);",
            params![
                like.id.to_string(),
                like.user_id.to_string(),
                like.post_id.to_string(),
            ],
        )?;
        Ok(like.id)
    }

    fn update_like(&self, like: &Like) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE likes SET user_id = ?2, post_id = ?3 WHERE id = ?1;",
            params![
                like.id.to_string(),
                like.user_id.to_string(),
                like.post_id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("like", like.id));
        }
        Ok(())
    }

    fn get_like(&self, id: LikeId) -> RepoResult<Option<Like>> {
        self.conn
            .query_row(
                "SELECT id, user_id, post_id FROM likes WHERE id = ?1;",
                [id.to_string()],
                |row| Ok(like_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn delete_like(&self, id: LikeId) -> RepoResult<()> {
        self.delete_by_id("likes", "like", id)
    }

    fn count_likes_for_post(&self, post_id: PostId) -> RepoResult<u64> {
        self.count_where("SELECT COUNT(*) FROM likes WHERE post_id = ?1;", post_id)
    }

    fn create_comment(&self, comment: &Comment) -> RepoResult<CommentId> {
        comment.validate()?;
        self.conn.execute(
            "INSERT INTO comments (id, user_id, post_id, body) VALUES (?1, ?2, ?3, ?4);",
            params![
                comment.id.to_string(),
                comment.user_id.to_string(),
                comment.post_id.to_string(),
                comment.body.as_str(),
            ],
        )?;
        Ok(comment.id)
    }

    fn update_comment(&self, comment: &Comment) -> RepoResult<()> {
        comment.validate()?;
        let changed = self.conn.execute(
            "UPDATE comments
             SET
                user_id = ?2,
                post_id = ?3,
                body = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                comment.id.to_string(),
                comment.user_id.to_string(),
                comment.post_id.to_string(),
                comment.body.as_str(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("comment", comment.id));
        }
        Ok(())
    }

    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>> {
        self.conn
            .query_row(
                "SELECT id, user_id, post_id, body FROM comments WHERE id = ?1;",
                [id.to_string()],
                |row| Ok(comment_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn delete_comment(&self, id: CommentId) -> RepoResult<()> {
        self.delete_by_id("comments", "comment", id)
    }

    fn count_comments_for_post(&self, post_id: PostId) -> RepoResult<u64> {
        self.count_where("SELECT COUNT(*) FROM comments WHERE post_id = ?1;", post_id)
    }

    fn create_follower(&self, follower: &Follower) -> RepoResult<FollowerId> {
        follower.validate()?;
        self.conn.execute(
            "INSERT INTO followers (id, follower_id, followed_id) VALUES (?1, ?2, ?3);",
            params![
                follower.id.to_string(),
                follower.follower_id.to_string(),
                follower.followed_id.to_string(),
            ],
        )?;
        Ok(follower.id)
    }

    fn update_follower(&self, follower: &Follower) -> RepoResult<()> {
        follower.validate()?;
        let changed = self.conn.execute(
            "UPDATE followers SET follower_id = ?2, followed_id = ?3 WHERE id = ?1;",
            params![
                follower.id.to_string(),
                follower.follower_id.to_string(),
                follower.followed_id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("follower", follower.id));
        }
        Ok(())
    }

    fn get_follower(&self, id: FollowerId) -> RepoResult<Option<Follower>> {
        self.conn
            .query_row(
                "SELECT id, follower_id, followed_id FROM followers WHERE id = ?1;",
                [id.to_string()],
                |row| Ok(follower_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn delete_follower(&self, id: FollowerId) -> RepoResult<()> {
        self.delete_by_id("followers", "follower", id)
    }

    fn count_followers(&self, user_id: UserId) -> RepoResult<u64> {
        self.count_where(
            "SELECT COUNT(*) FROM followers WHERE followed_id = ?1;",
            user_id,
        )
    }
}

fn post_row(row: &Row<'_>) -> RepoResult<Post> {
    Ok(Post {
        id: uuid_column(row, "id", "posts")?,
        author_id: uuid_column(row, "author_id", "posts")?,
        content: row.get("content")?,
    })
}

fn like_row(row: &Row<'_>) -> RepoResult<Like> {
    Ok(Like {
        id: uuid_column(row, "id", "likes")?,
        user_id: uuid_column(row, "user_id", "likes")?,
        post_id: uuid_column(row, "post_id", "likes")?,
    })
}

fn comment_row(row: &Row<'_>) -> RepoResult<Comment> {
    Ok(Comment {
        id: uuid_column(row, "id", "comments")?,
        user_id: uuid_column(row, "user_id", "comments")?,
        post_id: uuid_column(row, "post_id", "comments")?,
        body: row.get("body")?,
    })
}

fn follower_row(row: &Row<'_>) -> RepoResult<Follower> {
    Ok(Follower {
        id: uuid_column(row, "id", "followers")?,
        follower_id: uuid_column(row, "follower_id", "followers")?,
        followed_id: uuid_column(row, "followed_id", "followers")?,
    })
}

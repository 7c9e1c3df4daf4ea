//! Account use-case service: registration, profile edits, profile images.
//!
//! # Invariants
//! - Registration writes the user and its empty profile together.
//! - A reused email fails with the storage unique violation unchanged.

use crate::config::MediaConfig;
use crate::model::fields::{check_field, ProfileField};
use crate::model::profile::Profile;
use crate::model::user::{User, UserId, UserRole};
use crate::repo::account_repo::{AccountRepository, UserListQuery};
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};
use std::fmt::{Display, Formatter};

/// Registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub role: UserRole,
}

impl NewUser {
    pub fn new(email: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            role: UserRole::default(),
        }
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }
}

/// A user together with its profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub user: User,
    pub profile: Profile,
}

impl Display for ProfileView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Profile of {}", self.user.email)
    }
}

pub struct AccountService<R: AccountRepository> {
    repo: R,
    media: MediaConfig,
}

impl<R: AccountRepository> AccountService<R> {
    pub fn new(repo: R, media: MediaConfig) -> Self {
        Self { repo, media }
    }

    /// Creates the user and an empty profile, returning the stored user.
    pub fn register_user(&self, request: &NewUser) -> RepoResult<User> {
        let user = User::new(request.email.as_str(), request.username.as_str())
            .with_role(request.role);

        if let Err(err) = self.repo.create_user_with_profile(&user) {
            warn!(
                "event=user_register module=service status=error unique_violation={} error={}",
                err.is_unique_violation(),
                err
            );
            return Err(err);
        }
        info!(
            "event=user_register module=service status=ok user_id={} role={}",
            user.id,
            user.role.as_str()
        );

        self.require_user(user.id)
    }

    pub fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.repo.get_user(id)
    }

    pub fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.repo.get_user_by_email(email)
    }

    pub fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>> {
        self.repo.list_users(query)
    }

    pub fn count_users(&self) -> RepoResult<u64> {
        self.repo.count_users()
    }

    pub fn update_user(&self, user: &User) -> RepoResult<User> {
        self.repo.update_user(user)?;
        self.require_user(user.id)
    }

    /// Deletes the user; profile and social rows cascade.
    pub fn delete_user(&self, id: UserId) -> RepoResult<()> {
        self.repo.delete_user(id)?;
        info!("event=user_delete module=service status=ok user_id={id}");
        Ok(())
    }

    pub fn get_profile(&self, user_id: UserId) -> RepoResult<Option<Profile>> {
        self.repo.get_profile(user_id)
    }

    pub fn get_profile_view(&self, user_id: UserId) -> RepoResult<ProfileView> {
        Ok(ProfileView {
            user: self.require_user(user_id)?,
            profile: self.require_profile(user_id)?,
        })
    }

    /// Replaces profile fields and returns the stored profile.
    pub fn update_profile(&self, profile: &Profile) -> RepoResult<Profile> {
        self.repo.update_profile(profile)?;
        self.require_profile(profile.user_id)
    }

    /// Stores a freshly generated path for an uploaded image and returns it.
    ///
    /// Only the path is persisted; writing the bytes is the caller's job.
    /// A generated path longer than the `profile_image` column allows is
    /// rejected with `RepoError::ProfileValidation` and nothing is stored.
    pub fn attach_profile_image(&self, user_id: UserId, filename: &str) -> RepoResult<String> {
        let profile = self.require_profile(user_id)?;
        let path = profile.image_upload_path(filename);
        check_field(ProfileField::ProfileImage, &path)?;
        self.repo.set_profile_image(user_id, Some(path.as_str()))?;
        info!("event=profile_image_set module=service status=ok user_id={user_id} path={path}");
        Ok(path)
    }

    pub fn clear_profile_image(&self, user_id: UserId) -> RepoResult<()> {
        self.repo.set_profile_image(user_id, None)
    }

    /// Public image URL, `None` when the profile has no image.
    pub fn profile_image_url(&self, user_id: UserId) -> RepoResult<Option<String>> {
        let profile = self.require_profile(user_id)?;
        Ok(profile.profile_image_url(&self.media.base_url))
    }

    fn require_user(&self, id: UserId) -> RepoResult<User> {
        self.repo
            .get_user(id)?
            .ok_or_else(|| RepoError::not_found("user", id))
    }

    fn require_profile(&self, user_id: UserId) -> RepoResult<Profile> {
        self.repo
            .get_profile(user_id)?
            .ok_or_else(|| RepoError::not_found("profile", user_id))
    }
}

//! Core domain logic for the ongnet social network.
//! Accounts, profiles, and post-save hooks for social interactions.

pub mod config;
pub mod db;
pub mod hooks;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod upload;

pub use config::{ConfigError, CoreConfig, MediaConfig};
pub use hooks::builtin::register_builtin_hooks;
pub use hooks::{
    DispatchReport, HookError, HookRegistry, HookRegistryError, SaveEvent, SaveObserver,
    SavedInstance,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::fields::{
    field_label, parse_date_field, role_label, Locale, ProfileField, ProfileValidationError,
};
pub use model::profile::Profile;
pub use model::social::{Comment, EntityKind, Follower, Like, Post, SocialValidationError};
pub use model::user::{User, UserId, UserRole, UserValidationError};
pub use repo::account_repo::{AccountRepository, SqliteAccountRepository, UserListQuery};
pub use repo::social_repo::{SocialRepository, SqliteSocialRepository};
pub use repo::{RepoError, RepoResult};
pub use service::account_service::{AccountService, NewUser, ProfileView};
pub use service::social_service::SocialService;
pub use upload::profile_image_path;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

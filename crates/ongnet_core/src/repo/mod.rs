//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Keep SQL inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate records before touching SQL.
//! - Storage constraint failures (unique email, duplicate like/follow) are
//!   passed through as `RepoError::Db` without rewriting.
//! - Updates and deletes that touch zero rows return `NotFound`.

use crate::db::DbError;
use crate::model::fields::ProfileValidationError;
use crate::model::social::SocialValidationError;
use crate::model::user::UserValidationError;
use rusqlite::{Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod account_repo;
pub mod social_repo;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    UserValidation(UserValidationError),
    ProfileValidation(ProfileValidationError),
    SocialValidation(SocialValidationError),
    Db(DbError),
    NotFound { entity: &'static str, id: Uuid },
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl RepoError {
    /// True for `UNIQUE` violations raised by storage, e.g. a reused email.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::Db(err) if err.is_unique_violation())
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, Self::Db(err) if err.is_foreign_key_violation())
    }

    pub(crate) fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserValidation(err) => write!(f, "{err}"),
            Self::ProfileValidation(err) => write!(f, "{err}"),
            Self::SocialValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing; run migrations first")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UserValidation(err) => Some(err),
            Self::ProfileValidation(err) => Some(err),
            Self::SocialValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidData(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<UserValidationError> for RepoError {
    fn from(value: UserValidationError) -> Self {
        Self::UserValidation(value)
    }
}

impl From<ProfileValidationError> for RepoError {
    fn from(value: ProfileValidationError) -> Self {
        Self::ProfileValidation(value)
    }
}

impl From<SocialValidationError> for RepoError {
    fn from(value: SocialValidationError) -> Self {
        Self::SocialValidation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Pagination shared by list queries.
pub(crate) fn push_pagination(sql: &mut String, limit: Option<u32>, offset: u32) {
    match (limit, offset) {
        (Some(limit), 0) => sql.push_str(&format!(" LIMIT {limit}")),
        (Some(limit), offset) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
        (None, 0) => {}
        (None, offset) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
    }
}

pub(crate) fn ensure_tables(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    for table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [*table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(*table));
        }
    }
    Ok(())
}

pub(crate) fn uuid_column(row: &Row<'_>, column: &str, table: &str) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{text}` in {table}.{column}"))
    })
}

pub(crate) fn bool_column(row: &Row<'_>, column: &str, table: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {table}.{column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

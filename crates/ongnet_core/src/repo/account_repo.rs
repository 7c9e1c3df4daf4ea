//! User/profile repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist users and their 1:1 profiles.
//! - Create a user and its empty profile in one transaction.
//!
//! # Invariants
//! - `users.email` uniqueness is enforced by storage, not by a pre-check.
//! - Deleting a user removes its profile through `ON DELETE CASCADE`.
//! - Email lookups go through `normalize_email` so they match stored rows.

use crate::model::fields::DATE_FORMAT;
use crate::model::profile::Profile;
use crate::model::user::{normalize_email, User, UserId, UserRole};
use crate::repo::{
    bool_column, bool_to_int, ensure_tables, push_pagination, uuid_column, RepoError, RepoResult,
};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeMap;

const USER_SELECT_SQL: &str = "SELECT
    id,
    email,
    username,
    role,
    is_active,
    date_joined
FROM users";

const PROFILE_SELECT_SQL: &str = "SELECT
    user_id,
    bio,
    phone,
    address,
    city,
    state,
    profile_image,
    cnpj,
    description,
    founding_date,
    website,
    social_media,
    responsible_name,
    responsible_phone,
    postal_code,
    created_at,
    updated_at
FROM profiles";

/// Filters for listing users.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserListQuery {
    pub role: Option<UserRole>,
    pub include_inactive: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for accounts and profiles.
pub trait AccountRepository {
    /// Inserts `user` and an empty profile atomically.
    fn create_user_with_profile(&self, user: &User) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    /// Users ordered by `date_joined ASC, id ASC`.
    fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>>;
    fn count_users(&self) -> RepoResult<u64>;
    fn update_user(&self, user: &User) -> RepoResult<()>;
    /// Deletes the user; dependent rows go with it.
    fn delete_user(&self, id: UserId) -> RepoResult<()>;

    fn get_profile(&self, user_id: UserId) -> RepoResult<Option<Profile>>;
    /// Replaces every editable profile field.
    fn update_profile(&self, profile: &Profile) -> RepoResult<()>;
    /// Sets or clears only the stored image path.
    fn set_profile_image(&self, user_id: UserId, path: Option<&str>) -> RepoResult<()>;
}

/// SQLite-backed account repository.
pub struct SqliteAccountRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAccountRepository<'conn> {
    /// Wraps a migrated connection; fails when account tables are missing.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["users", "profiles"])?;
        Ok(Self { conn })
    }
}

impl AccountRepository for SqliteAccountRepository<'_> {
    fn create_user_with_profile(&self, user: &User) -> RepoResult<UserId> {
        user.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO users (id, email, username, role, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                user.id.to_string(),
                normalize_email(&user.email),
                user.username.trim(),
                user.role.as_str(),
                bool_to_int(user.is_active),
            ],
        )?;
        tx.execute(
            "INSERT INTO profiles (user_id) VALUES (?1);",
            [user.id.to_string()],
        )?;
        tx.commit()?;

        Ok(user.id)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row)?)),
            None => Ok(None),
        }
    }

    fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE email = ?1;"))?;
        let mut rows = stmt.query([normalize_email(email)])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>> {
        let mut sql = format!("{USER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_inactive {
            sql.push_str(" AND is_active = 1");
        }
        if let Some(role) = query.role {
            sql.push_str(" AND role = ?");
            bind_values.push(Value::Text(role.as_str().to_string()));
        }
        sql.push_str(" ORDER BY date_joined ASC, id ASC");
        push_pagination(&mut sql, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn count_users(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn update_user(&self, user: &User) -> RepoResult<()> {
        user.validate()?;

        let changed = self.conn.execute(
            "UPDATE users
             SET
                email = ?1,
                username = ?2,
                role = ?3,
                is_active = ?4
             WHERE id = ?5;",
            params![
                normalize_email(&user.email),
                user.username.trim(),
                user.role.as_str(),
                bool_to_int(user.is_active),
                user.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("user", user.id));
        }
        Ok(())
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("user", id));
        }
        Ok(())
    }

    fn get_profile(&self, user_id: UserId) -> RepoResult<Option<Profile>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROFILE_SELECT_SQL} WHERE user_id = ?1;"))?;
        let mut rows = stmt.query([user_id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_profile_row(row)?)),
            None => Ok(None),
        }
    }

    fn update_profile(&self, profile: &Profile) -> RepoResult<()> {
        profile.validate()?;
        let social_media = serde_json::to_string(&profile.social_media)
            .map_err(|err| RepoError::InvalidData(format!("social_media encode failed: {err}")))?;
        let founding_date = profile
            .founding_date
            .map(|date| date.format(DATE_FORMAT).to_string());

        let changed = self.conn.execute(
            "UPDATE profiles
             SET
                bio = ?2,
                phone = ?3,
                address = ?4,
                city = ?5,
                state = ?6,
                profile_image = ?7,
                cnpj = ?8,
                description = ?9,
                founding_date = ?10,
                website = ?11,
                social_media = ?12,
                responsible_name = ?13,
                responsible_phone = ?14,
                postal_code = ?15,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE user_id = ?1;",
            params![
                profile.user_id.to_string(),
                profile.bio,
                profile.phone.trim(),
                profile.address.trim(),
                profile.city.trim(),
                profile.state.trim(),
                profile.profile_image.as_deref(),
                profile.cnpj.trim(),
                profile.description,
                founding_date,
                profile.website.trim(),
                social_media,
                profile.responsible_name.trim(),
                profile.responsible_phone.trim(),
                profile.postal_code.trim(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("profile", profile.user_id));
        }
        Ok(())
    }

    fn set_profile_image(&self, user_id: UserId, path: Option<&str>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE profiles
             SET
                profile_image = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE user_id = ?1;",
            params![user_id.to_string(), path],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("profile", user_id));
        }
        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let role_text: String = row.get("role")?;
    let role = UserRole::parse(&role_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid role `{role_text}` in users.role"))
    })?;

    Ok(User {
        id: uuid_column(row, "id", "users")?,
        email: row.get("email")?,
        username: row.get("username")?,
        role,
        is_active: bool_column(row, "is_active", "users")?,
        date_joined: row.get("date_joined")?,
    })
}

fn parse_profile_row(row: &Row<'_>) -> RepoResult<Profile> {
    let social_text: String = row.get("social_media")?;
    let social_media: BTreeMap<String, String> =
        serde_json::from_str(&social_text).map_err(|err| {
            RepoError::InvalidData(format!("invalid json in profiles.social_media: {err}"))
        })?;
    let founding_text: Option<String> = row.get("founding_date")?;
    let founding_date = founding_text
        .map(|text| {
            NaiveDate::parse_from_str(&text, DATE_FORMAT).map_err(|err| {
                RepoError::InvalidData(format!(
                    "invalid date `{text}` in profiles.founding_date: {err}"
                ))
            })
        })
        .transpose()?;

    Ok(Profile {
        user_id: uuid_column(row, "user_id", "profiles")?,
        bio: row.get("bio")?,
        phone: row.get("phone")?,
        address: row.get("address")?,
        city: row.get("city")?,
        state: row.get("state")?,
        profile_image: row.get("profile_image")?,
        cnpj: row.get("cnpj")?,
        description: row.get("description")?,
        founding_date,
        website: row.get("website")?,
        social_media,
        responsible_name: row.get("responsible_name")?,
        responsible_phone: row.get("responsible_phone")?,
        postal_code: row.get("postal_code")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

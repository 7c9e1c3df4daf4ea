//! Extended per-user profile.
//!
//! # Invariants
//! - Exactly one profile per user; `user_id` doubles as the profile key.
//! - The profile is removed together with its user.
//! - `profile_image` holds a relative storage path, never file bytes.

use crate::model::fields::{check_field, ProfileField, ProfileValidationError};
use crate::model::user::UserId;
use crate::upload::profile_image_path;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const MAX_SOCIAL_MEDIA_KEY_LEN: usize = 50;

/// Profile record. Every field except `user_id` is optional; blank strings
/// stand for "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub bio: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub profile_image: Option<String>,

    // Organization accounts.
    pub cnpj: String,
    pub description: String,
    /// Stored as ISO `YYYY-MM-DD` text.
    pub founding_date: Option<NaiveDate>,
    pub website: String,
    /// Network name to handle or URL, e.g. `instagram -> @ong`.
    pub social_media: BTreeMap<String, String>,
    pub responsible_name: String,
    pub responsible_phone: String,
    pub postal_code: String,

    /// Epoch milliseconds, assigned by storage.
    pub created_at: i64,
    /// Epoch milliseconds, refreshed by storage on every update.
    pub updated_at: i64,
}

impl Profile {
    /// Empty profile for `user_id`.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    /// Storage path for a newly uploaded image owned by this profile.
    pub fn image_upload_path(&self, filename: &str) -> String {
        profile_image_path(filename)
    }

    /// Public URL of the profile image, `None` when no image is set.
    ///
    /// Absolute `http(s)` values are returned unchanged; relative paths are
    /// joined to `media_base_url`.
    pub fn profile_image_url(&self, media_base_url: &str) -> Option<String> {
        let image = self.profile_image.as_deref()?.trim();
        if image.is_empty() {
            return None;
        }
        if has_http_scheme(image) {
            return Some(image.to_string());
        }
        Some(format!(
            "{}/{}",
            media_base_url.trim_end_matches('/'),
            image.trim_start_matches('/')
        ))
    }

    pub fn validate(&self) -> Result<(), ProfileValidationError> {
        for (field, value) in self.text_fields() {
            check_field(field, value)?;
        }
        if let Some(image) = &self.profile_image {
            check_field(ProfileField::ProfileImage, image)?;
        }
        for key in self.social_media.keys() {
            let key = key.trim();
            if key.is_empty() || key.chars().count() > MAX_SOCIAL_MEDIA_KEY_LEN {
                return Err(ProfileValidationError::new(
                    ProfileField::SocialMedia,
                    format!("network name must be 1..={MAX_SOCIAL_MEDIA_KEY_LEN} characters"),
                ));
            }
        }
        Ok(())
    }

    fn text_fields(&self) -> [(ProfileField, &str); 11] {
        [
            (ProfileField::Bio, self.bio.as_str()),
            (ProfileField::Phone, self.phone.as_str()),
            (ProfileField::Address, self.address.as_str()),
            (ProfileField::City, self.city.as_str()),
            (ProfileField::State, self.state.as_str()),
            (ProfileField::Cnpj, self.cnpj.as_str()),
            (ProfileField::Description, self.description.as_str()),
            (ProfileField::Website, self.website.as_str()),
            (ProfileField::ResponsibleName, self.responsible_name.as_str()),
            (ProfileField::ResponsiblePhone, self.responsible_phone.as_str()),
            (ProfileField::PostalCode, self.postal_code.as_str()),
        ]
    }
}

fn has_http_scheme(value: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        value
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

#[cfg(test)]
mod tests {
    use super::Profile;
    use crate::model::fields::ProfileField;
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn image_url_is_none_without_image() {
        let mut profile = Profile::new(Uuid::new_v4());
        assert_eq!(profile.profile_image_url("http://localhost:5001"), None);

        profile.profile_image = Some("  ".to_string());
        assert_eq!(profile.profile_image_url("http://localhost:5001"), None);
    }

    #[test]
    fn image_url_joins_relative_path_to_base() {
        let mut profile = Profile::new(Uuid::new_v4());
        profile.profile_image = Some("profiles/abc_1.png".to_string());
        assert_eq!(
            profile.profile_image_url("http://localhost:5001/media/").as_deref(),
            Some("http://localhost:5001/media/profiles/abc_1.png")
        );

        profile.profile_image = Some("/profiles/abc_1.png".to_string());
        assert_eq!(
            profile.profile_image_url("http://cdn.example.org").as_deref(),
            Some("http://cdn.example.org/profiles/abc_1.png")
        );
    }

    #[test]
    fn image_url_passes_absolute_urls_through() {
        let mut profile = Profile::new(Uuid::new_v4());
        profile.profile_image = Some("https://img.example.org/a.png".to_string());
        assert_eq!(
            profile.profile_image_url("http://localhost:5001").as_deref(),
            Some("https://img.example.org/a.png")
        );

        profile.profile_image = Some("HTTPS://IMG.example.org/B.png".to_string());
        assert_eq!(
            profile.profile_image_url("http://localhost:5001").as_deref(),
            Some("HTTPS://IMG.example.org/B.png")
        );

        profile.profile_image = Some("httpsfoo/a.png".to_string());
        assert_eq!(
            profile.profile_image_url("http://localhost:5001").as_deref(),
            Some("http://localhost:5001/httpsfoo/a.png")
        );
    }

    #[test]
    fn upload_path_uses_profiles_prefix_and_extension() {
        let profile = Profile::new(Uuid::new_v4());
        let path = profile.image_upload_path("logo.svg");
        assert!(path.starts_with("profiles/"));
        assert!(path.ends_with(".svg"));
    }

    #[test]
    fn validate_reports_first_bad_field() {
        let mut profile = Profile::new(Uuid::new_v4());
        profile.validate().expect("empty profile is valid");

        profile.founding_date = NaiveDate::from_ymd_opt(2020, 2, 29);
        profile.validate().expect("typed date is valid");

        profile.website = "ong.example.org".to_string();
        let err = profile.validate().expect_err("schemeless website");
        assert_eq!(err.field, ProfileField::Website);

        profile.website.clear();
        profile.social_media.insert(" ".to_string(), "@ong".to_string());
        let err = profile.validate().expect_err("blank network name");
        assert_eq!(err.field, ProfileField::SocialMedia);
    }
}

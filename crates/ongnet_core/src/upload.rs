//! Storage path generation for uploaded profile images.
//!
//! The original filename is discarded except for its extension. Actual file
//! writes belong to the storage layer embedding this crate.

use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Directory prefix for every profile image.
pub const PROFILE_IMAGE_DIR: &str = "profiles";

/// Builds `profiles/<32 hex>_<unix seconds>.<ext>` for an uploaded file.
///
/// `ext` is everything after the last `.`; a name without a dot is used
/// whole as the extension.
pub fn profile_image_path(filename: &str) -> String {
    build_profile_image_path(filename, Uuid::new_v4(), unix_timestamp())
}

/// Deterministic core of [`profile_image_path`].
pub fn build_profile_image_path(filename: &str, token: Uuid, timestamp: i64) -> String {
    let ext = file_extension(filename);
    format!("{PROFILE_IMAGE_DIR}/{}_{timestamp}.{ext}", token.simple())
}

/// Substring after the last `.`, or the whole input when there is none.
pub fn file_extension(filename: &str) -> &str {
    filename.rsplit('.').next().unwrap_or(filename)
}

fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs() as i64)
}

#[cfg(test)]
mod tests {
    use super::{build_profile_image_path, file_extension, profile_image_path};
    use std::collections::HashSet;
    use uuid::Uuid;

    #[test]
    fn extension_is_taken_after_last_dot() {
        assert_eq!(file_extension("avatar.final.PNG"), "PNG");
        assert_eq!(file_extension("photo.jpeg"), "jpeg");
        assert_eq!(file_extension("archive."), "");
    }

    #[test]
    fn dotless_name_becomes_the_extension() {
        assert_eq!(file_extension("README"), "README");
        let path = build_profile_image_path("README", Uuid::nil(), 7);
        assert_eq!(path, "profiles/00000000000000000000000000000000_7.README");
    }

    #[test]
    fn path_has_prefix_hex_token_timestamp_and_extension() {
        let token = Uuid::parse_str("6f1c2b8e-3d4a-4f5b-9c6d-7e8f90a1b2c3").expect("uuid");
        let path = build_profile_image_path("me at the beach.jpg", token, 1_700_000_000);
        assert_eq!(path, "profiles/6f1c2b8e3d4a4f5b9c6d7e8f90a1b2c3_1700000000.jpg");
    }

    #[test]
    fn generated_path_discards_original_name() {
        let path = profile_image_path("secret-name.webp");
        assert!(path.starts_with("profiles/"));
        assert!(path.ends_with(".webp"));
        assert!(!path.contains("secret-name"));

        let file_name = path.trim_start_matches("profiles/");
        let (token, rest) = file_name.split_once('_').expect("token separator");
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        let timestamp = rest.trim_end_matches(".webp");
        assert!(timestamp.parse::<i64>().expect("numeric timestamp") > 0);
    }

    #[test]
    fn uploads_at_the_same_second_do_not_collide() {
        let paths: HashSet<String> = (0..2_000)
            .map(|_| build_profile_image_path("a.png", Uuid::new_v4(), 1_700_000_000))
            .collect();
        assert_eq!(paths.len(), 2_000);
    }
}

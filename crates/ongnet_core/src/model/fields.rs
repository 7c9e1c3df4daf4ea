//! Profile field metadata: validation rules and display labels.
//!
//! # Responsibility
//! - Enumerate editable profile fields as a closed set.
//! - Keep "what a field accepts" (rule table) apart from "how it is shown"
//!   (label lookup).
//!
//! # Invariants
//! - Every `ProfileField` has exactly one entry in `FIELD_RULES`.
//! - Blank values are accepted for every field.

use crate::model::user::UserRole;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9()\- ]+$").expect("valid phone regex"));
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("valid url regex"));
static POSTAL_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{5}-?\d{3}$").expect("valid postal code regex"));
static REGISTRATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9./\-]+$").expect("valid registration regex"));

const REGISTRATION_DIGITS: usize = 14;

/// ISO calendar date, as stored and as accepted from forms.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Editable profile fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProfileField {
    Bio,
    Phone,
    Address,
    City,
    State,
    ProfileImage,
    Cnpj,
    Description,
    FoundingDate,
    Website,
    SocialMedia,
    ResponsibleName,
    ResponsiblePhone,
    PostalCode,
}

impl ProfileField {
    pub const ALL: [ProfileField; 14] = [
        Self::Bio,
        Self::Phone,
        Self::Address,
        Self::City,
        Self::State,
        Self::ProfileImage,
        Self::Cnpj,
        Self::Description,
        Self::FoundingDate,
        Self::Website,
        Self::SocialMedia,
        Self::ResponsibleName,
        Self::ResponsiblePhone,
        Self::PostalCode,
    ];

    /// Storage column name.
    pub fn column(self) -> &'static str {
        match self {
            Self::Bio => "bio",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::City => "city",
            Self::State => "state",
            Self::ProfileImage => "profile_image",
            Self::Cnpj => "cnpj",
            Self::Description => "description",
            Self::FoundingDate => "founding_date",
            Self::Website => "website",
            Self::SocialMedia => "social_media",
            Self::ResponsibleName => "responsible_name",
            Self::ResponsiblePhone => "responsible_phone",
            Self::PostalCode => "postal_code",
        }
    }

    /// Fields only meaningful for `UserRole::Ong` accounts.
    pub fn is_organization_field(self) -> bool {
        matches!(
            self,
            Self::Cnpj
                | Self::Description
                | Self::FoundingDate
                | Self::Website
                | Self::SocialMedia
                | Self::ResponsibleName
                | Self::ResponsiblePhone
                | Self::PostalCode
        )
    }
}

/// Shape a non-blank value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Phone,
    Url,
    Date,
    PostalCode,
    RegistrationNumber,
    /// Relative storage path; validated by length only.
    StoragePath,
    /// Key/value map; keys are checked by the caller.
    Map,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: ProfileField,
    pub kind: FieldKind,
    /// Maximum length in characters, `None` for unbounded text.
    pub max_len: Option<usize>,
}

const FIELD_RULES: &[FieldRule] = &[
    rule(ProfileField::Bio, FieldKind::Text, None),
    rule(ProfileField::Phone, FieldKind::Phone, Some(20)),
    rule(ProfileField::Address, FieldKind::Text, Some(255)),
    rule(ProfileField::City, FieldKind::Text, Some(100)),
    rule(ProfileField::State, FieldKind::Text, Some(100)),
    rule(ProfileField::ProfileImage, FieldKind::StoragePath, Some(100)),
    rule(ProfileField::Cnpj, FieldKind::RegistrationNumber, Some(18)),
    rule(ProfileField::Description, FieldKind::Text, None),
    rule(ProfileField::FoundingDate, FieldKind::Date, Some(10)),
    rule(ProfileField::Website, FieldKind::Url, Some(200)),
    rule(ProfileField::SocialMedia, FieldKind::Map, None),
    rule(ProfileField::ResponsibleName, FieldKind::Text, Some(255)),
    rule(ProfileField::ResponsiblePhone, FieldKind::Phone, Some(20)),
    rule(ProfileField::PostalCode, FieldKind::PostalCode, Some(10)),
];

const fn rule(field: ProfileField, kind: FieldKind, max_len: Option<usize>) -> FieldRule {
    FieldRule {
        field,
        kind,
        max_len,
    }
}

/// Returns the validation rule for `field`.
pub fn field_rule(field: ProfileField) -> FieldRule {
    FIELD_RULES
        .iter()
        .copied()
        .find(|rule| rule.field == field)
        .unwrap_or(FieldRule {
            field,
            kind: FieldKind::Text,
            max_len: None,
        })
}

/// Checks one field value against its rule. Blank values always pass.
pub fn check_field(field: ProfileField, value: &str) -> Result<(), ProfileValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }

    let rule = field_rule(field);
    if let Some(max_len) = rule.max_len {
        let len = value.chars().count();
        if len > max_len {
            return Err(ProfileValidationError::new(
                field,
                format!("has {len} characters; maximum is {max_len}"),
            ));
        }
    }

    let well_formed = match rule.kind {
        FieldKind::Text | FieldKind::StoragePath | FieldKind::Map => true,
        FieldKind::Phone => PHONE_RE.is_match(value),
        FieldKind::Url => URL_RE.is_match(value),
        FieldKind::Date => NaiveDate::parse_from_str(value, DATE_FORMAT).is_ok(),
        FieldKind::PostalCode => POSTAL_CODE_RE.is_match(value),
        FieldKind::RegistrationNumber => {
            REGISTRATION_RE.is_match(value)
                && value.chars().filter(char::is_ascii_digit).count() == REGISTRATION_DIGITS
        }
    };
    if !well_formed {
        return Err(ProfileValidationError::new(
            field,
            format!("`{value}` is not a valid {}", kind_name(rule.kind)),
        ));
    }
    Ok(())
}

fn kind_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Text => "text",
        FieldKind::Phone => "phone number",
        FieldKind::Url => "http(s) URL",
        FieldKind::Date => "YYYY-MM-DD date",
        FieldKind::PostalCode => "postal code",
        FieldKind::RegistrationNumber => "registration number",
        FieldKind::StoragePath => "storage path",
        FieldKind::Map => "map",
    }
}

/// Parses a date-kind form value; blank input yields `None`.
pub fn parse_date_field(
    field: ProfileField,
    value: &str,
) -> Result<Option<NaiveDate>, ProfileValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(Some)
        .map_err(|err| {
            ProfileValidationError::new(field, format!("`{value}` is not a valid date: {err}"))
        })
}

/// Display language for labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    En,
    PtBr,
}

/// Human label for `field` in `locale`.
pub fn field_label(field: ProfileField, locale: Locale) -> &'static str {
    match locale {
        Locale::En => match field {
            ProfileField::Bio => "biography",
            ProfileField::Phone => "phone",
            ProfileField::Address => "address",
            ProfileField::City => "city",
            ProfileField::State => "state",
            ProfileField::ProfileImage => "profile image",
            ProfileField::Cnpj => "CNPJ",
            ProfileField::Description => "organization description",
            ProfileField::FoundingDate => "founding date",
            ProfileField::Website => "website",
            ProfileField::SocialMedia => "social media",
            ProfileField::ResponsibleName => "responsible person",
            ProfileField::ResponsiblePhone => "responsible person's phone",
            ProfileField::PostalCode => "postal code",
        },
        Locale::PtBr => match field {
            ProfileField::Bio => "biografia",
            ProfileField::Phone => "telefone",
            ProfileField::Address => "endereço",
            ProfileField::City => "cidade",
            ProfileField::State => "estado",
            ProfileField::ProfileImage => "imagem de perfil",
            ProfileField::Cnpj => "CNPJ",
            ProfileField::Description => "descrição da ONG",
            ProfileField::FoundingDate => "data de fundação",
            ProfileField::Website => "website",
            ProfileField::SocialMedia => "redes sociais",
            ProfileField::ResponsibleName => "nome do responsável",
            ProfileField::ResponsiblePhone => "telefone do responsável",
            ProfileField::PostalCode => "CEP",
        },
    }
}

/// Human label for an account role.
pub fn role_label(role: UserRole, locale: Locale) -> &'static str {
    match (locale, role) {
        (Locale::En, UserRole::Individual) => "Individual",
        (Locale::En, UserRole::Ong) => "NGO",
        (Locale::En, UserRole::Admin) => "Administrator",
        (Locale::PtBr, UserRole::Individual) => "Indivíduo",
        (Locale::PtBr, UserRole::Ong) => "ONG",
        (Locale::PtBr, UserRole::Admin) => "Administrador",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileValidationError {
    pub field: ProfileField,
    pub reason: String,
}

impl ProfileValidationError {
    pub fn new(field: ProfileField, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl Display for ProfileValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "profile field `{}` {}", self.field.column(), self.reason)
    }
}

impl Error for ProfileValidationError {}

#[cfg(test)]
mod tests {
    use super::{
        check_field, field_label, field_rule, parse_date_field, role_label, Locale, ProfileField,
        FIELD_RULES,
    };
    use crate::model::user::UserRole;
    use chrono::NaiveDate;

    #[test]
    fn every_field_has_exactly_one_rule() {
        for field in ProfileField::ALL {
            let count = FIELD_RULES.iter().filter(|rule| rule.field == field).count();
            assert_eq!(count, 1, "{field:?} should have one rule");
        }
        assert_eq!(FIELD_RULES.len(), ProfileField::ALL.len());
    }

    #[test]
    fn blank_values_always_pass() {
        for field in ProfileField::ALL {
            check_field(field, "   ").expect("blank should pass");
        }
    }

    #[test]
    fn max_len_is_enforced_in_characters() {
        assert_eq!(field_rule(ProfileField::Phone).max_len, Some(20));
        let err = check_field(ProfileField::City, &"ã".repeat(101)).expect_err("too long");
        assert_eq!(err.field, ProfileField::City);
        check_field(ProfileField::City, &"ã".repeat(100)).expect("exactly max should pass");
    }

    #[test]
    fn formatted_brazilian_inputs_are_accepted() {
        check_field(ProfileField::Phone, "(71) 99999-9999").expect("phone");
        check_field(ProfileField::PostalCode, "40110-100").expect("cep");
        check_field(ProfileField::Cnpj, "12.345.678/0001-90").expect("cnpj");
        assert!(check_field(ProfileField::Cnpj, "12.345.678/0001").is_err());
        assert!(check_field(ProfileField::Phone, "call me").is_err());
    }

    #[test]
    fn website_requires_http_scheme() {
        check_field(ProfileField::Website, "https://ong.example.org").expect("https");
        assert!(check_field(ProfileField::Website, "ong.example.org").is_err());
    }

    #[test]
    fn calendar_dates_respect_month_lengths() {
        check_field(ProfileField::FoundingDate, "2024-02-29").expect("leap day");
        assert!(check_field(ProfileField::FoundingDate, "2023-02-29").is_err());
        assert!(check_field(ProfileField::FoundingDate, "2023-13-01").is_err());
        assert!(check_field(ProfileField::FoundingDate, "01/06/2015").is_err());
    }

    #[test]
    fn date_field_parses_to_naive_date() {
        assert_eq!(
            parse_date_field(ProfileField::FoundingDate, " 2015-06-01 ").expect("valid date"),
            NaiveDate::from_ymd_opt(2015, 6, 1)
        );
        assert_eq!(
            parse_date_field(ProfileField::FoundingDate, "").expect("blank date"),
            None
        );
        let err = parse_date_field(ProfileField::FoundingDate, "2020-02-30").expect_err("bad day");
        assert_eq!(err.field, ProfileField::FoundingDate);
    }

    #[test]
    fn labels_are_localized() {
        assert_eq!(field_label(ProfileField::PostalCode, Locale::PtBr), "CEP");
        assert_eq!(field_label(ProfileField::PostalCode, Locale::En), "postal code");
        assert_eq!(role_label(UserRole::Ong, Locale::En), "NGO");
        assert_eq!(role_label(UserRole::Admin, Locale::PtBr), "Administrador");
    }
}

//! Form rules for registration, profile edits, codes and avatars.

use base64::Engine;
use chrono::NaiveDate;
use regex::Regex;

use crate::model::{ProfileUpdate, RegistrationData};

pub const USERNAME_MIN_LENGTH: usize = 3;
pub const VERIFICATION_CODE_LENGTH: usize = 6;
/// 5 MiB
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("Username must be at least 3 characters")]
    UsernameTooShort,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please enter a valid phone number")]
    InvalidPhone,
    #[error("Website must start with http:// or https://")]
    InvalidWebsite,
    #[error("Birth date cannot be in the future")]
    BirthDateInFuture,
    #[error("Verification code must be 6 digits")]
    InvalidCode,
    #[error("Please select a valid image file")]
    InvalidImageType,
    #[error("Image file size must be less than 5MB")]
    ImageTooLarge,
}

impl ValidationError {
    /// Form field the error belongs to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required(field) => *field,
            Self::UsernameTooShort => "username",
            Self::InvalidEmail => "email",
            Self::InvalidPhone => "phone",
            Self::InvalidWebsite => "website",
            Self::BirthDateInFuture => "birthDate",
            Self::InvalidCode => "verificationCode",
            Self::InvalidImageType | Self::ImageTooLarge => "avatar",
        }
    }
}

fn matches(pattern: &str, value: &str) -> bool {
    Regex::new(pattern).is_ok_and(|regex| regex.is_match(value))
}

/// # Errors
/// Returns the first rule `username` breaks.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ValidationError::Required("username"));
    }
    if username.chars().count() < USERNAME_MIN_LENGTH {
        return Err(ValidationError::UsernameTooShort);
    }
    Ok(())
}

/// # Errors
/// Returns the first rule `email` breaks.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::Required("email"));
    }
    if !matches(r"^[^@\s]+@[^@\s]+\.[^@\s]+$", email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// # Errors
/// Returns the first rule `phone` breaks.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(ValidationError::Required("phone"));
    }
    if !matches(r"^\+?[\d\s\-()]+$", phone) {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(())
}

/// Empty is fine; anything else needs an http(s) scheme.
///
/// # Errors
/// Returns `ValidationError::InvalidWebsite` for a non-http(s) value.
pub fn validate_website(website: &str) -> Result<(), ValidationError> {
    if website.is_empty() || matches(r"^https?://.+", website) {
        Ok(())
    } else {
        Err(ValidationError::InvalidWebsite)
    }
}

/// # Errors
/// Returns `ValidationError::BirthDateInFuture` when `birth_date` is after `today`.
pub fn validate_birth_date(birth_date: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    if birth_date > today {
        return Err(ValidationError::BirthDateInFuture);
    }
    Ok(())
}

/// # Errors
/// Returns `ValidationError::InvalidCode` unless `code` is exactly six digits.
pub fn validate_code(code: &str) -> Result<(), ValidationError> {
    if matches(r"^\d{6}$", code) {
        Ok(())
    } else {
        Err(ValidationError::InvalidCode)
    }
}

/// Keep digits only and cap the result at the code length, as typed input is.
#[must_use]
pub fn sanitize_code_input(input: &str) -> String {
    input
        .chars()
        .filter(char::is_ascii_digit)
        .take(VERIFICATION_CODE_LENGTH)
        .collect()
}

/// Check an avatar upload and turn it into a `data:` URL.
///
/// # Errors
/// Returns `InvalidImageType` for non-image MIME types and `ImageTooLarge`
/// above [`MAX_AVATAR_BYTES`].
pub fn avatar_data_url(mime_type: &str, bytes: &[u8]) -> Result<String, ValidationError> {
    if !mime_type.starts_with("image/") {
        return Err(ValidationError::InvalidImageType);
    }
    if bytes.len() > MAX_AVATAR_BYTES {
        return Err(ValidationError::ImageTooLarge);
    }
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{mime_type};base64,{payload}"))
}

/// Guess an image MIME type from a file extension.
#[must_use]
pub fn mime_from_extension(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// # Errors
/// Returns the first broken rule, checked in form order.
pub fn validate_registration(
    data: &RegistrationData,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    validate_username(&data.username)?;
    validate_email(&data.email)?;
    validate_birth_date(data.birth_date, today)?;
    validate_phone(&data.phone)?;
    validate_website(&data.website)
}

/// Only the fields present in `update` are checked.
///
/// # Errors
/// Returns the first broken rule.
pub fn validate_profile_update(
    update: &ProfileUpdate,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    if let Some(username) = &update.username {
        validate_username(username)?;
    }
    if let Some(birth_date) = update.birth_date {
        validate_birth_date(birth_date, today)?;
    }
    if let Some(website) = &update.website {
        validate_website(website)?;
    }
    Ok(())
}

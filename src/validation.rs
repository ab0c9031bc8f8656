//! Client-side input validation.
//!
//! Every check here runs before a request is built, so a failure never
//! reaches the network and is never retried.

use std::path::Path;
use thiserror::Error;

use crate::config::UploadConfig;

/// Caller-side validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("At most {max} tags are allowed")]
    TooManyTags { max: usize },

    #[error("Tags must not be blank")]
    BlankTag,

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("File is too large ({size} bytes, limit {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Login required")]
    LoginRequired,
}

/// Minimum password length accepted by the backend.
pub const MIN_PASSWORD_LEN: usize = 6;

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::Required { field: "email" });
    }
    if email.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidEmail);
    }
    let (local, domain) = email.split_once('@').ok_or(ValidationError::InvalidEmail)?;
    if local.is_empty() || domain.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    // domain needs a dot with something on both sides
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidEmail),
    }
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort { min: MIN_PASSWORD_LEN });
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::Required { field: "username" });
    }
    Ok(())
}

pub fn validate_title(title: &str, limits: &UploadConfig) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::Required { field: "title" });
    }
    if title.chars().count() > limits.max_title_len {
        return Err(ValidationError::TooLong { field: "title", max: limits.max_title_len });
    }
    Ok(())
}

pub fn validate_description(description: &str, limits: &UploadConfig) -> Result<(), ValidationError> {
    if description.chars().count() > limits.max_description_len {
        return Err(ValidationError::TooLong {
            field: "description",
            max: limits.max_description_len,
        });
    }
    Ok(())
}

pub fn validate_tags(tags: &[String], limits: &UploadConfig) -> Result<(), ValidationError> {
    if tags.len() > limits.max_tags {
        return Err(ValidationError::TooManyTags { max: limits.max_tags });
    }
    if tags.iter().any(|t| t.trim().is_empty()) {
        return Err(ValidationError::BlankTag);
    }
    Ok(())
}

/// Check a video file by name and size against the upload limits.
pub fn validate_video_file(file_name: &str, size: u64, limits: &UploadConfig) -> Result<(), ValidationError> {
    if size > limits.max_file_size {
        return Err(ValidationError::FileTooLarge { size, max: limits.max_file_size });
    }
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if extension.is_empty() || !limits.video_formats.iter().any(|f| f.eq_ignore_ascii_case(&extension)) {
        return Err(ValidationError::UnsupportedFormat(file_name.to_string()));
    }
    Ok(())
}

pub fn validate_comment(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::Required { field: "content" });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_rules() {
        assert!(validate_email("a@b.com").is_ok());
        assert_eq!(validate_email("  "), Err(ValidationError::Required { field: "email" }));
        assert_eq!(validate_email("a b@c.com"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("ab.com"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("a@bcom"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("a@b."), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("secret1").is_ok());
        assert!(validate_password("12345").is_err());
    }

    #[test]
    fn test_upload_limits() {
        let limits = UploadConfig::default();
        assert!(validate_title("clip", &limits).is_ok());
        assert!(validate_title(&"x".repeat(101), &limits).is_err());
        assert!(validate_description(&"x".repeat(501), &limits).is_err());

        let tags: Vec<String> = (0..11).map(|i| format!("t{i}")).collect();
        assert_eq!(validate_tags(&tags, &limits), Err(ValidationError::TooManyTags { max: 10 }));
        assert_eq!(validate_tags(&["ok".into(), " ".into()], &limits), Err(ValidationError::BlankTag));

        assert!(validate_video_file("clip.MP4", 1024, &limits).is_ok());
        assert!(matches!(
            validate_video_file("clip.exe", 1024, &limits),
            Err(ValidationError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            validate_video_file("clip.mp4", limits.max_file_size + 1, &limits),
            Err(ValidationError::FileTooLarge { .. })
        ));
    }
}

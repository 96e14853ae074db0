//! Field-level checks on client input. Each check reports the first
//! failing rule only.

use crate::error::ApiError;

pub const USERNAME_MAX_CHARS: usize = 16;
pub const PASSWORD_MIN_BYTES: usize = 6;
/// bcrypt ignores everything past 72 bytes.
pub const PASSWORD_MAX_BYTES: usize = 72;

/// Lowercase and check a username. Returns the normalized form.
pub fn normalize_username(raw: Option<&str>) -> Result<String, ApiError> {
    let username = match raw.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_lowercase(),
        _ => return Err(ApiError::validation("username", "is required")),
    };

    if username.chars().count() > USERNAME_MAX_CHARS {
        return Err(ApiError::validation(
            "username",
            format!("must be at most {} characters", USERNAME_MAX_CHARS),
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ApiError::validation(
            "username",
            "may only contain letters, digits, underscores and hyphens",
        ));
    }

    Ok(username)
}

/// Presence check used at sign-in, where length rules must not leak.
pub fn require_password(raw: Option<&str>) -> Result<&str, ApiError> {
    match raw {
        Some(password) if !password.is_empty() => Ok(password),
        _ => Err(ApiError::validation("password", "is required")),
    }
}

/// Full strength check applied whenever a password is set.
pub fn validate_new_password(raw: Option<&str>) -> Result<&str, ApiError> {
    let password = require_password(raw)?;

    if password.len() < PASSWORD_MIN_BYTES {
        return Err(ApiError::validation(
            "password",
            format!("must be at least {} characters", PASSWORD_MIN_BYTES),
        ));
    }
    if password.len() > PASSWORD_MAX_BYTES {
        return Err(ApiError::validation(
            "password",
            format!("must be at most {} bytes", PASSWORD_MAX_BYTES),
        ));
    }

    Ok(password)
}

/// Required, non-blank text field.
pub fn require_text(field: &str, raw: Option<String>) -> Result<String, ApiError> {
    match raw {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ApiError::validation(field, "is required")),
    }
}

/// Optional text field that must not be blank when present.
pub fn optional_text(field: &str, raw: Option<String>) -> Result<Option<String>, ApiError> {
    raw.map(|value| require_text(field, Some(value))).transpose()
}

/// Split a comma-separated tag list, trimming pieces and dropping empties.
pub fn parse_tags(raw: Option<&str>) -> Result<Vec<String>, ApiError> {
    let tags: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if tags.is_empty() {
        return Err(ApiError::validation("tags", "is required"));
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames_are_lowercased() {
        assert_eq!(normalize_username(Some("Alice_01")).unwrap(), "alice_01");
        assert_eq!(normalize_username(Some("  bob-2 ")).unwrap(), "bob-2");
    }

    #[test]
    fn usernames_outside_the_allowed_shape_are_rejected() {
        assert!(normalize_username(None).is_err());
        assert!(normalize_username(Some("")).is_err());
        assert!(normalize_username(Some("seventeen_chars_x")).is_err());
        assert!(normalize_username(Some("no spaces")).is_err());
        assert!(normalize_username(Some("dot.name")).is_err());

        let err = normalize_username(Some("ümlaut")).unwrap_err();
        assert_eq!(err.to_json()["field"], "username");
    }

    #[test]
    fn sixteen_char_username_is_accepted() {
        assert!(normalize_username(Some("abcdefghijklmnop")).is_ok());
    }

    #[test]
    fn new_passwords_have_length_bounds() {
        assert!(validate_new_password(Some("12345")).is_err());
        assert!(validate_new_password(Some("123456")).is_ok());
        assert!(validate_new_password(Some(&"x".repeat(73))).is_err());
        assert!(require_password(Some("1")).is_ok());
        assert!(require_password(None).is_err());
    }

    #[test]
    fn tags_are_split_and_trimmed() {
        assert_eq!(parse_tags(Some("music, art,,")).unwrap(), vec!["music", "art"]);
        assert!(parse_tags(Some(" , ")).is_err());
        assert!(parse_tags(None).is_err());
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(require_text("title", Some("  ".into())).is_err());
        assert_eq!(optional_text("title", None).unwrap(), None);
        assert!(optional_text("title", Some("".into())).is_err());
    }
}

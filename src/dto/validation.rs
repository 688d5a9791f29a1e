//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a username is 1 to 30 characters of letters, digits,
/// underscores, and dashes.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() || username.len() > 30 {
        let mut err = ValidationError::new("username_length");
        err.message = Some("Username must be between 1 and 30 characters".into());
        return Err(err);
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        let mut err = ValidationError::new("username_format");
        err.message =
            Some("Username can only contain letters, numbers, underscores, and dashes".into());
        return Err(err);
    }

    Ok(())
}

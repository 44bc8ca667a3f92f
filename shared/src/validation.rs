//! Input validation functions
//!
//! This module provides validation utilities for user input.
//! Email syntax is delegated to the `validator` crate.

use validator::ValidateEmail;

/// bcrypt only looks at the first 72 bytes of its input
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > 256 {
        return Err("Email too long".to_string());
    }
    if !email.validate_email() {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate username: 3-50 characters of letters, digits and underscores
pub fn validate_username(username: &str) -> Result<(), String> {
    let len = username.chars().count();
    if len < 3 {
        return Err("Username must be at least 3 characters".to_string());
    }
    if len > 50 {
        return Err("Username too long".to_string());
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err("Username may only contain letters, digits and underscores".to_string());
    }
    Ok(())
}

/// Validate a password chosen at registration
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        ));
    }
    Ok(())
}

/// Validate a password submitted at login
///
/// Only a lower bound: anything longer simply fails verification.
pub fn validate_login_password(password: &str) -> Result<(), String> {
    if password.chars().count() < 6 {
        return Err("Password must be at least 6 characters long".to_string());
    }
    Ok(())
}

/// Validate a replacement password: registration rules plus
/// at least one uppercase letter, one lowercase letter and one digit
pub fn validate_new_password(password: &str) -> Result<(), String> {
    validate_password(password)?;

    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !(has_lower && has_upper && has_digit) {
        return Err("Password must contain uppercase, lowercase, and number".to_string());
    }
    Ok(())
}

/// Validate an optional first or last name
pub fn validate_name(name: Option<&str>) -> Result<(), String> {
    match name {
        Some(n) if n.chars().count() > 50 => Err("Name too long".to_string()),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("user@example.com", true)]
    #[case("first.last+tag@sub.example.org", true)]
    #[case("", false)]
    #[case("not-an-email", false)]
    #[case("missing@", false)]
    #[case("@example.com", false)]
    fn test_validate_email(#[case] email: &str, #[case] ok: bool) {
        assert_eq!(validate_email(email).is_ok(), ok);
    }

    #[test]
    fn test_validate_email_too_long() {
        let email = format!("{}@example.com", "a".repeat(250));
        assert!(validate_email(&email).is_err());
    }

    #[rstest]
    #[case("abc", true)]
    #[case("habit_fan_42", true)]
    #[case("ab", false)]
    #[case("has space", false)]
    #[case("dash-ed", false)]
    fn test_validate_username(#[case] username: &str, #[case] ok: bool) {
        assert_eq!(validate_username(username).is_ok(), ok);
    }

    #[test]
    fn test_validate_username_length_limit() {
        assert!(validate_username(&"a".repeat(50)).is_ok());
        assert!(validate_username(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_password_bounds() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password(&"x".repeat(MAX_PASSWORD_BYTES)).is_ok());
        assert!(validate_password(&"x".repeat(MAX_PASSWORD_BYTES + 1)).is_err());
    }

    #[test]
    fn test_validate_password_counts_bytes_for_upper_bound() {
        // 36 two-byte characters fit, 37 do not
        assert!(validate_password(&"é".repeat(36)).is_ok());
        assert!(validate_password(&"é".repeat(37)).is_err());
    }

    #[rstest]
    #[case("Password1", true)]
    #[case("password1", false)]
    #[case("PASSWORD1", false)]
    #[case("Password", false)]
    #[case("Pass1", false)]
    fn test_validate_new_password(#[case] password: &str, #[case] ok: bool) {
        assert_eq!(validate_new_password(password).is_ok(), ok);
    }

    #[test]
    fn test_validate_login_password() {
        assert!(validate_login_password("12345").is_err());
        assert!(validate_login_password("123456").is_ok());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name(None).is_ok());
        assert!(validate_name(Some("Ada")).is_ok());
        assert!(validate_name(Some(&"n".repeat(51))).is_err());
    }

    proptest! {
        #[test]
        fn prop_word_usernames_in_range_are_valid(name in "[A-Za-z0-9_]{3,50}") {
            prop_assert!(validate_username(&name).is_ok());
        }

        #[test]
        fn prop_short_passwords_rejected(pw in ".{0,7}") {
            prop_assert!(validate_password(&pw).is_err());
        }
    }
}

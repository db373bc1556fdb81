//! Field-by-field checks for account input. Every failing rule is reported,
//! not just the first.

use crate::errors::{AppError, FieldError};

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn check_full_name(full_name: &str, errors: &mut Vec<FieldError>) {
    if full_name.trim().is_empty() {
        errors.push(FieldError::new("fullName", "Full name is required"));
    }
}

pub fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    if !is_valid_email(email) {
        errors.push(FieldError::new("email", "Valid email is required"));
    }
}

pub fn check_password(password: &str, errors: &mut Vec<FieldError>) {
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push(FieldError::new(
            "password",
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push(FieldError::new(
            "password",
            "Password must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new(
            "password",
            "Password must contain at least one number",
        ));
    }
    if !password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        errors.push(FieldError::new(
            "password",
            "Password must contain at least one special character",
        ));
    }
}

/// Turns collected field errors into a single `InvalidFields` error.
pub fn finish(errors: Vec<FieldError>) -> Result<(), AppError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::InvalidFields(errors))
    }
}

/// Accepts `local@domain.tld` shapes: one `@`, no whitespace, and a dotted
/// domain without empty labels.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn password_messages(password: &str) -> Vec<String> {
        let mut errors = Vec::new();
        check_password(password, &mut errors);
        errors.into_iter().map(|e| e.message).collect()
    }

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email(" first.last+tag@mail.example.org "));
    }

    #[test]
    fn test_invalid_emails() {
        for email in ["", "ada", "ada@", "@example.com", "ada@example", "a@b@c.com", "a b@c.com", "ada@example..com"] {
            assert!(!is_valid_email(email), "{email} should be invalid");
        }
    }

    #[test]
    fn test_strong_password_passes() {
        assert!(password_messages("Engine#42").is_empty());
    }

    #[test]
    fn test_every_failing_password_rule_is_reported() {
        let messages = password_messages("abc");
        assert_eq!(messages.len(), 4);
        assert!(messages.iter().any(|m| m.contains("at least 6")));
        assert!(messages.iter().any(|m| m.contains("uppercase")));
        assert!(messages.iter().any(|m| m.contains("number")));
        assert!(messages.iter().any(|m| m.contains("special")));
    }

    #[test]
    fn test_finish_wraps_errors() {
        assert!(finish(vec![]).is_ok());
        let err = finish(vec![FieldError::new("fullName", "Full name is required")]).unwrap_err();
        assert!(matches!(err, AppError::InvalidFields(fields) if fields.len() == 1));
    }
}

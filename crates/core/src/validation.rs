//! Field validation rules shared by user and store records.
//!
//! Each rule returns the user-facing message on failure. [`ValidationErrors`]
//! collects failures across fields so a request can report all of them at once.

use serde::Serialize;

use crate::types::Email;

/// Minimum length of a user or store name, in characters.
pub const NAME_MIN_CHARS: usize = 20;
/// Maximum length of a user or store name, in characters.
pub const NAME_MAX_CHARS: usize = 60;
/// Maximum length of an address, in characters.
pub const ADDRESS_MAX_CHARS: usize = 400;
/// Minimum password length, in characters.
pub const PASSWORD_MIN_CHARS: usize = 8;
/// Maximum password length, in characters.
pub const PASSWORD_MAX_CHARS: usize = 16;
/// A password must contain at least one of these.
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*";

/// Check a user or store name.
///
/// # Errors
///
/// Returns the message to show when the name is not 20-60 characters.
pub fn name(value: &str) -> Result<(), &'static str> {
    let len = value.chars().count();
    if (NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        Ok(())
    } else {
        Err("Name must be between 20 and 60 characters")
    }
}

/// Check an address.
///
/// # Errors
///
/// Returns the message to show when the address is empty or over 400 characters.
pub fn address(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Address is required");
    }
    if value.chars().count() > ADDRESS_MAX_CHARS {
        return Err("Address can be max 400 characters");
    }
    Ok(())
}

/// Check password complexity.
///
/// # Errors
///
/// Returns the message to show when the password is not 8-16 characters or
/// lacks an uppercase letter or one of `!@#$%^&*`.
pub fn password(value: &str) -> Result<(), &'static str> {
    let len = value.chars().count();
    if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&len) {
        return Err("Password must be between 8 and 16 characters");
    }

    let has_upper = value.chars().any(|c| c.is_ascii_uppercase());
    let has_special = value.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c));
    if !has_upper || !has_special {
        return Err(
            "Password must include at least one uppercase letter and one special character",
        );
    }

    Ok(())
}

/// Parse an email address.
///
/// # Errors
///
/// Returns the message to show when the address is malformed.
pub fn email(value: &str) -> Result<Email, &'static str> {
    Email::parse(value.trim()).map_err(|_| "Please include a valid email")
}

/// A single failed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Request field name, as the client sent it.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

/// All field failures for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// An empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// A collection holding one failure.
    #[must_use]
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    /// Record a failure.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Record the outcome of a rule, returning the value when it passed.
    pub fn check<T>(&mut self, field: &'static str, result: Result<T, &'static str>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.push(field, message);
                None
            }
        }
    }

    /// Whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The recorded failures.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` when any field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_name_length_boundaries() {
        assert!(name(&"a".repeat(19)).is_err());
        assert!(name(&"a".repeat(20)).is_ok());
        assert!(name(&"a".repeat(60)).is_ok());
        assert!(name(&"a".repeat(61)).is_err());
    }

    #[test]
    fn test_name_counts_characters_not_bytes() {
        // 20 two-byte characters
        assert!(name(&"é".repeat(20)).is_ok());
    }

    #[test]
    fn test_address_rules() {
        assert_eq!(address(""), Err("Address is required"));
        assert_eq!(address("   "), Err("Address is required"));
        assert!(address(&"x".repeat(400)).is_ok());
        assert_eq!(
            address(&"x".repeat(401)),
            Err("Address can be max 400 characters")
        );
    }

    #[test]
    fn test_password_complexity() {
        // uppercase but no special character
        assert!(password("Abc12345").is_err());
        assert!(password("Abc#12345").is_ok());
        // special character but no uppercase
        assert!(password("abc#12345").is_err());
    }

    #[test]
    fn test_password_length_boundaries() {
        assert!(password("Ab#4567").is_err());
        assert!(password("Ab#45678").is_ok());
        assert!(password("Ab#4567890123456").is_ok());
        assert!(password("Ab#45678901234567").is_err());
    }

    #[test]
    fn test_email_rule_trims_and_parses() {
        assert_eq!(email(" user@example.com ").unwrap().as_str(), "user@example.com");
        assert_eq!(email("not-an-email"), Err("Please include a valid email"));
    }

    #[test]
    fn test_validation_errors_collects_every_field() {
        let mut errors = ValidationErrors::new();
        assert!(errors.check("name", name("short")).is_none());
        assert!(errors.check("address", address("1 Main St")).is_some());
        assert!(errors.check("password", password("weak")).is_none());

        assert_eq!(errors.errors().len(), 2);
        assert_eq!(errors.errors()[0].field, "name");
        assert_eq!(errors.errors()[1].field, "password");
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_validation_errors_serialize_as_list() {
        let errors = ValidationErrors::single("rating", "Rating must be between 1 and 5");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"field": "rating", "message": "Rating must be between 1 and 5"}])
        );
    }
}

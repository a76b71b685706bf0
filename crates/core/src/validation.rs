//! Pass/fail rules for the login and registration forms.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::LazyLock;

use regex::Regex;

use crate::constants::{MAX_NAME_LEN, MIN_NAME_LEN, MIN_PASSWORD_LEN};
use crate::identity::Role;

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every rejected field of a form, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError { field, message: message.into() });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// First message reported for `field`, if any.
    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors.iter().find(|e| e.field == field).map(|e| e.message.as_str())
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut first = true;
        for e in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Credentials submitted to `POST /auth/login`.
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Account details submitted to `POST /auth/register`.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.trim().is_empty() {
        errors.push("email", "Email is required");
    } else if !EMAIL_REGEX.is_match(email.trim()) {
        errors.push("email", "Invalid email address");
    }
}

fn check_password_length(errors: &mut ValidationErrors, password: &str) -> bool {
    if password.is_empty() {
        errors.push("password", "Password is required");
        false
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push("password", format!("Password must be at least {MIN_PASSWORD_LEN} characters"));
        false
    } else {
        true
    }
}

impl LoginInput {
    /// # Errors
    /// Returns every rejected field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_email(&mut errors, &self.email);
        check_password_length(&mut errors, &self.password);
        errors.into_result()
    }
}

impl RegisterInput {
    /// # Errors
    /// Returns every rejected field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name_len = self.name.trim().chars().count();
        if name_len == 0 {
            errors.push("name", "Name is required");
        } else if name_len < MIN_NAME_LEN {
            errors.push("name", format!("Name must be at least {MIN_NAME_LEN} characters"));
        } else if name_len > MAX_NAME_LEN {
            errors.push("name", format!("Name must be less than {MAX_NAME_LEN} characters"));
        }

        check_email(&mut errors, &self.email);

        if check_password_length(&mut errors, &self.password) {
            let has_lower = self.password.chars().any(char::is_lowercase);
            let has_upper = self.password.chars().any(char::is_uppercase);
            let has_digit = self.password.chars().any(|c| c.is_ascii_digit());
            if !(has_lower && has_upper && has_digit) {
                errors.push("password", "Password must contain uppercase, lowercase, and number");
            }
        }

        if self.confirm_password.is_empty() {
            errors.push("confirmPassword", "Please confirm your password");
        } else if self.confirm_password != self.password {
            errors.push("confirmPassword", "Passwords do not match");
        }

        errors.into_result()
    }
}

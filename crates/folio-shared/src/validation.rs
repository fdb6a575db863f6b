//! Field-level validation of incoming payloads.

use crate::response::FieldError;

/// Implemented by request bodies that can check their own shape.
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<FieldError>>;
}

/// Collects field errors so a client sees every problem at once.
#[derive(Debug, Default)]
pub struct Violations {
    errors: Vec<FieldError>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Record `message` against `field` unless `ok` holds.
    pub fn check(&mut self, ok: bool, field: &str, message: impl Into<String>) {
        if !ok {
            self.push(field, message);
        }
    }

    /// The trimmed value must not be empty.
    pub fn require(&mut self, field: &str, value: &str) {
        self.check(!value.trim().is_empty(), field, "is required");
    }

    /// The trimmed value must not exceed `max` characters.
    pub fn max_chars(&mut self, field: &str, value: &str, max: usize) {
        self.check(
            value.trim().chars().count() <= max,
            field,
            format!("must be at most {max} characters"),
        );
    }

    /// The trimmed value must have at least `min` characters.
    pub fn min_chars(&mut self, field: &str, value: &str, min: usize) {
        self.check(
            value.trim().chars().count() >= min,
            field,
            format!("must be at least {min} characters"),
        );
    }

    pub fn email(&mut self, field: &str, value: &str) {
        self.check(is_email(value.trim()), field, "must be a valid email address");
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

impl Extend<FieldError> for Violations {
    fn extend<I: IntoIterator<Item = FieldError>>(&mut self, iter: I) {
        self.errors.extend(iter);
    }
}

/// `local@domain.tld` with no whitespace anywhere.
pub fn is_email(value: &str) -> bool {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    match domain.rsplit_once('.') {
        Some((host, tld)) => !local.is_empty() && !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Letters, digits and underscores only.
pub fn is_username(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

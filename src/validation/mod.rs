//! Input validation for request bodies.
//!
//! Every DTO accepted from outside implements [`Validate`]; handlers reject
//! the request with all field errors at once instead of failing on the first.

use serde::Serialize;

/// Length limits for validated fields.
pub mod limits {
    pub const MAX_NAME_LENGTH: usize = 200;
    pub const MAX_EMAIL_LENGTH: usize = 254;
    pub const MAX_TEXT_LENGTH: usize = 10_000;
    pub const MIN_PASSWORD_LENGTH: usize = 8;
    pub const MAX_PASSWORD_LENGTH: usize = 72;
    pub const MAX_RMA_ITEMS: usize = 100;
    pub const MAX_SLUG_LENGTH: usize = 128;
}

/// Error constants for validation failures.
pub mod errmsg {
    pub const REQUIRED: &str = "must not be empty";
    pub const TOO_LONG: &str = "exceeds maximum length";
    pub const INVALID_EMAIL: &str = "must be a valid email address";
    pub const PASSWORD_TOO_SHORT: &str = "must be at least 8 characters";
    pub const PASSWORD_TOO_LONG: &str = "must be at most 72 bytes";
    pub const NOT_POSITIVE: &str = "must be greater than zero";
    pub const NEGATIVE: &str = "must not be negative";
    pub const NO_ITEMS: &str = "at least one item is required";
    pub const TOO_MANY_ITEMS: &str = "too many items";
    pub const TOTAL_OUT_OF_RANGE: &str = "order total is out of range";
    pub const INVALID_SLUG: &str = "may only contain a-z, 0-9 and '-'";
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Implemented by request DTOs.
pub trait Validate {
    /// Every problem with the value; empty when valid.
    fn validate(&self) -> Vec<FieldError>;
}

/// Accumulates field errors for one DTO.
#[derive(Debug, Default)]
pub struct Errors(Vec<FieldError>);

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn required(&mut self, field: &str, value: &str, max: usize) {
        if value.trim().is_empty() {
            self.add(field, errmsg::REQUIRED);
        } else if value.chars().count() > max {
            self.add(field, format!("{} (max: {max})", errmsg::TOO_LONG));
        }
    }

    pub fn optional(&mut self, field: &str, value: Option<&str>, max: usize) {
        if let Some(value) = value {
            if value.chars().count() > max {
                self.add(field, format!("{} (max: {max})", errmsg::TOO_LONG));
            }
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, errmsg::REQUIRED);
        } else if value.len() > limits::MAX_EMAIL_LENGTH || !is_plausible_email(value) {
            self.add(field, errmsg::INVALID_EMAIL);
        }
    }

    pub fn password(&mut self, field: &str, value: &str) {
        if value.chars().count() < limits::MIN_PASSWORD_LENGTH {
            self.add(field, errmsg::PASSWORD_TOO_SHORT);
        } else if value.len() > limits::MAX_PASSWORD_LENGTH {
            // bcrypt only looks at the first 72 bytes
            self.add(field, errmsg::PASSWORD_TOO_LONG);
        }
    }

    pub fn positive(&mut self, field: &str, value: i64) {
        if value <= 0 {
            self.add(field, errmsg::NOT_POSITIVE);
        }
    }

    pub fn non_negative(&mut self, field: &str, value: f64) {
        if !value.is_finite() || value < 0.0 {
            self.add(field, errmsg::NEGATIVE);
        }
    }

    pub fn slug(&mut self, field: &str, value: &str) {
        self.required(field, value, limits::MAX_SLUG_LENGTH);
        if !value
            .chars()
            .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '-'))
        {
            self.add(field, errmsg::INVALID_SLUG);
        }
    }

    /// Prefix nested errors, e.g. `items[2].quantity`.
    pub fn nested(&mut self, prefix: &str, errors: Vec<FieldError>) {
        for e in errors {
            self.add(format!("{prefix}.{}", e.field), e.message);
        }
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.0
    }
}

/// `local@domain.tld` with no whitespace. Deliverability is not checked.
pub fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

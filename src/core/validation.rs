use std::fmt;
use std::fmt::{Display, Formatter};
use crate::core::library::LibraryError;

pub const MAX_AUTHOR_NAME: usize = 100;
pub const MAX_NATIONALITY: usize = 50;
pub const MAX_TITLE: usize = 200;
pub const MAX_PUBLISHER: usize = 100;
pub const MAX_MEMBER_NAME: usize = 100;
pub const MAX_CATEGORY: usize = 30;
pub const MAX_EMAIL: usize = 254;

pub const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

// ValidationError describes why a single submitted field was rejected
#[derive(Debug, PartialEq, Clone)]
pub enum ValidationError {
    Required {
        field: String,
    },
    TooLong {
        field: String,
        max: usize,
    },
    InvalidFormat {
        field: String,
        reason: String,
    },
    OutOfRange {
        field: String,
        reason: String,
    },
}

impl ValidationError {
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field } => field,
            ValidationError::TooLong { field, .. } => field,
            ValidationError::InvalidFormat { field, .. } => field,
            ValidationError::OutOfRange { field, .. } => field,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Required { .. } => {
                write!(f, "This field is required.")
            }
            ValidationError::TooLong { max, .. } => {
                write!(f, "Ensure this value has at most {} characters.", max)
            }
            ValidationError::InvalidFormat { reason, .. } => {
                write!(f, "{}", reason)
            }
            ValidationError::OutOfRange { reason, .. } => {
                write!(f, "{}", reason)
            }
        }
    }
}

impl From<ValidationError> for LibraryError {
    fn from(err: ValidationError) -> Self {
        LibraryError::validation(
            format!("{}: {}", err.field(), err).as_str(), Some(err.field().to_string()))
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

// required text, trimmed, at most `max` characters
pub fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required { field: field.to_string() });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field: field.to_string(), max });
    }
    Ok(value.to_string())
}

// blank input becomes None
pub fn validate_optional_text(field: &str, value: &str, max: usize) -> ValidationResult<Option<String>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    validate_text(field, value, max).map(Some)
}

pub fn validate_email(field: &str, value: &str) -> ValidationResult<String> {
    let value = validate_text(field, value, MAX_EMAIL)?;
    let invalid = || ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "Enter a valid email address.".to_string(),
    };
    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || value.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty() || l.starts_with('-') || l.ends_with('-')) {
        return Err(invalid());
    }
    Ok(value)
}

pub fn validate_integer(field: &str, value: &str) -> ValidationResult<i64> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required { field: field.to_string() });
    }
    value.parse::<i64>().map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "Enter a whole number.".to_string(),
    })
}

pub fn validate_copies(total: i64, available: i64) -> ValidationResult<()> {
    if total < 0 {
        return Err(ValidationError::OutOfRange {
            field: "total_copies".to_string(),
            reason: "Total copies cannot be negative.".to_string(),
        });
    }
    if available < 0 {
        return Err(ValidationError::OutOfRange {
            field: "available_copies".to_string(),
            reason: "Available copies cannot be negative.".to_string(),
        });
    }
    if available > total {
        return Err(ValidationError::OutOfRange {
            field: "available_copies".to_string(),
            reason: "Available copies cannot exceed total copies.".to_string(),
        });
    }
    Ok(())
}

// a reference chosen from a select box
pub fn validate_choice(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required { field: field.to_string() });
    }
    Ok(value.to_string())
}

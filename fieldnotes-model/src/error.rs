use std::fmt::{self, Display};

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    InvalidIdentifier(String),
    MissingField(&'static str),
    FieldTooLong { field: &'static str, max: usize },
    NegativeQuantity(i32),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidIdentifier(msg) => {
                write!(f, "invalid identifier: {msg}")
            }
            ModelError::MissingField(field) => write!(f, "{field} is required"),
            ModelError::FieldTooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
            ModelError::NegativeQuantity(qty) => {
                write!(f, "quantity must not be negative (got {qty})")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;

/// Shared length check for the `varchar` columns backing the records.
pub(crate) fn ensure_len(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ModelError::MissingField(field));
    }
    if value.chars().count() > max {
        return Err(ModelError::FieldTooLong { field, max });
    }
    Ok(())
}

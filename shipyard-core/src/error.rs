//! Error types for Shipyard core.

use std::{error::Error, fmt};

use crate::domain::FieldViolation;

/// Error type for Shipyard core operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ShipyardError {
    /// A candidate or patch broke one or more field rules.
    Validation(Vec<FieldViolation>),
    /// No ship exists with the given identifier.
    NotFound(i64),
    /// An identifier token failed the format check.
    MalformedIdentifier(String),
    /// The record store failed; the message is passed through unchanged.
    Store(String),
}

impl ShipyardError {
    /// Build a validation error for a single field.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldViolation::new(field, message)])
    }

    /// Violations carried by a validation error, empty for every other kind.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::Validation(violations) => violations,
            _ => &[],
        }
    }
}

impl fmt::Display for ShipyardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(violations) => {
                write!(f, "validation failed")?;
                for (index, violation) in violations.iter().enumerate() {
                    let separator = if index == 0 { ": " } else { "; " };
                    write!(f, "{separator}{violation}")?;
                }
                Ok(())
            }
            Self::NotFound(id) => write!(f, "ship {id} not found"),
            Self::MalformedIdentifier(raw) => write!(f, "malformed ship identifier `{raw}`"),
            Self::Store(message) => write!(f, "store error: {message}"),
        }
    }
}

impl Error for ShipyardError {}

/// Convenience result type for Shipyard core.
pub type Result<T> = std::result::Result<T, ShipyardError>;

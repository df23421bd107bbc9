//! Core error types for ProManager
//!
//! Every layer above the database funnels its failures into [`PmError`],
//! which the API layer turns into a `{ "message": ... }` body.

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Core error type for all ProManager operations
#[derive(Error, Debug)]
pub enum PmError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PmError {
    /// `"<Entity> not found"`
    pub fn not_found(entity: &str) -> Self {
        PmError::NotFound(format!("{} not found", entity))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        PmError::Forbidden(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        PmError::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PmError::Internal(message.into())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            PmError::NotFound(_) => 404,
            PmError::Unauthorized(_) => 401,
            PmError::Forbidden(_) => 403,
            PmError::BadRequest(_) | PmError::Validation(_) => 400,
            PmError::Conflict(_) => 409,
            PmError::Database(_) | PmError::Internal(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            PmError::NotFound(_) => "not_found",
            PmError::Unauthorized(_) => "unauthorized",
            PmError::Forbidden(_) => "forbidden",
            PmError::BadRequest(_) => "bad_request",
            PmError::Validation(_) => "validation_failed",
            PmError::Conflict(_) => "conflict",
            PmError::Database(_) => "database_error",
            PmError::Internal(_) => "internal_error",
        }
    }
}

/// Validation errors collection
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> messages
    pub errors: BTreeMap<String, Vec<String>>,
    /// Errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    /// Base errors first, then `"<field> <message>"` in field order.
    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }

    /// `Ok(())` when empty, otherwise the collected errors.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_messages().join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

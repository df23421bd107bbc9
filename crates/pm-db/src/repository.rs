//! Repository traits and shared error types

use async_trait::async_trait;
use pm_core::{Id, PmError};

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map unique-constraint violations to `Conflict` with the given message.
    pub fn on_unique_violation(self, message: &str) -> Self {
        match &self {
            RepositoryError::Database(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                RepositoryError::Conflict(message.to_string())
            }
            _ => self,
        }
    }
}

impl From<RepositoryError> for PmError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(entity) => PmError::not_found(entity),
            RepositoryError::Conflict(message) => PmError::Conflict(message),
            RepositoryError::Database(e) => PmError::Database(e.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Base repository trait for CRUD operations
#[async_trait]
pub trait Repository<T, CreateDto, UpdateDto>: Send + Sync {
    /// Find an entity by ID
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<T>>;

    /// Create a new entity
    async fn create(&self, dto: CreateDto) -> RepositoryResult<T>;

    /// Update an existing entity
    async fn update(&self, id: Id, dto: UpdateDto) -> RepositoryResult<T>;

    /// Delete an entity by ID
    async fn delete(&self, id: Id) -> RepositoryResult<()>;

    /// Check if an entity exists
    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_pm_error() {
        let err: PmError = RepositoryError::NotFound("Project").into();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_string(), "Project not found");

        let err: PmError = RepositoryError::Conflict("Email already registered".into()).into();
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn test_non_unique_errors_pass_through() {
        let err = RepositoryError::Database(sqlx::Error::RowNotFound)
            .on_unique_violation("duplicate");
        assert!(matches!(err, RepositoryError::Database(_)));
    }
}

//! Error types
//!
//! Storage failures and domain rule violations travel through the same
//! [`ServiceError`] channel and reach GraphQL clients as a plain message.

/// Error returned by a [`Storage`](crate::storage::Storage) implementation
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The record addressed by a write does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The backing database rejected or failed the operation
    #[error("database error: {0}")]
    Database(String),

    /// The operation was called with arguments the backend cannot use
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for StorageError {
    fn from(e: mongodb::error::Error) -> Self {
        StorageError::Database(e.to_string())
    }
}

/// Error returned by the resolver and the mutation flows
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A referenced user does not exist
    #[error("User not found.")]
    UserNotFound,

    /// A user with the same email is already stored
    #[error("This user already exists.")]
    UserAlreadyExists,

    /// Input could not be coerced to the stored type
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The request carries no caller identity
    #[error("unauthenticated: no caller identity on request")]
    Unauthenticated,

    /// A deferred relation was requested beyond the traversal limit
    #[error("maximum traversal depth of {0} exceeded")]
    DepthExceeded(usize),

    /// Password hashing failed or its worker was lost
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// Storage operation failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_messages() {
        assert_eq!(ServiceError::UserNotFound.to_string(), "User not found.");
        assert_eq!(
            ServiceError::UserAlreadyExists.to_string(),
            "This user already exists."
        );
    }

    #[test]
    fn test_storage_error_is_transparent() {
        let err: ServiceError = StorageError::Database("connection reset".into()).into();
        assert_eq!(err.to_string(), "database error: connection reset");
    }
}

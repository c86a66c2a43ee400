use crate::store::StorageError;

/// Errors returned by [`FitnessService`](crate::FitnessService) operations.
#[derive(Debug, thiserror::Error)]
pub enum FitnessError {
    #[error("Username '{0}' already exists")]
    DuplicateUser(String),

    #[error("Unknown user '{0}'")]
    UnknownUser(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The change is held in memory but writing it to disk failed.
    #[error("Change applied but not saved: {0}")]
    Unsaved(#[source] StorageError),
}

impl FitnessError {
    /// True for errors a user can fix by changing their input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FitnessError::DuplicateUser(_)
                | FitnessError::UnknownUser(_)
                | FitnessError::InvalidCredentials
                | FitnessError::Validation(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FitnessError>;

use thiserror::Error;

use crate::api::{ApiError, ErrorKind};
use crate::form::FieldErrors;

#[derive(Error, Debug)]
pub enum MutationError {
    /// Rejected before any request was made.
    #[error("Validation failed:\n{0}")]
    Validation(FieldErrors),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl MutationError {
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            MutationError::Validation(errors) => Some(errors),
            MutationError::Api(_) => None,
        }
    }

    /// Underlying API failure category; `None` for validation errors.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            MutationError::Validation(_) => None,
            MutationError::Api(e) => Some(e.kind()),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            MutationError::Validation(_) => "Please fix the highlighted fields.".to_string(),
            MutationError::Api(e) => e.user_message(),
        }
    }
}

use thiserror::Error;

use crate::repository::RepositoryError;
use crate::services::customers::AggregateError;

pub mod conversion;
pub mod customers;
pub mod dashboard;
pub mod documents;
pub mod filter;
pub mod numbering;

/// Errors returned by the service layer to the route handlers.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Form(String),
    #[error("conflict: {0}")]
    Conflict(String),
    /// The script answered with a failure; carries its message.
    #[error("{0}")]
    Remote(String),
    /// The script could not be reached or stayed rate limited.
    #[error("service unavailable: {0}")]
    Unavailable(String),
    /// A delivery note was created but the order status update failed.
    #[error(
        "delivery note {delivery_note} was created but order {order} could not be closed: {message}"
    )]
    PartialConversion {
        order: String,
        delivery_note: String,
        message: String,
    },
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Remote(message) => ServiceError::Remote(message),
            RepositoryError::Transport(message) | RepositoryError::RateLimited(message) => {
                ServiceError::Unavailable(message)
            }
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

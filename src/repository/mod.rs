use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::document::{Document, NewDocument, StatusUpdate};
use crate::gateway::{
    FailureKind, GatewayFailure, ReqwestTransport, SheetGateway, Sleeper, TokioSleeper, Transport,
};

pub mod document;

#[cfg(test)]
pub mod mock;

/// Errors surfaced by the sheet-backed repository.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The script rejected the call; carries its message.
    #[error("{0}")]
    Remote(String),
    /// The script could not be reached or answered with garbage.
    #[error("{0}")]
    Transport(String),
    /// Rate limiting outlasted every retry.
    #[error("{0}")]
    RateLimited(String),
}

impl From<GatewayFailure> for RepositoryError {
    fn from(failure: GatewayFailure) -> Self {
        match failure.kind {
            FailureKind::Application | FailureKind::Http(_) => {
                RepositoryError::Remote(failure.message)
            }
            FailureKind::Transport | FailureKind::Malformed => {
                RepositoryError::Transport(failure.message)
            }
            FailureKind::RateLimited => RepositoryError::RateLimited(failure.message),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository backed by the two spreadsheet scripts.
pub struct SheetRepository<T = ReqwestTransport, S = TokioSleeper> {
    gateway: Arc<SheetGateway<T, S>>, // shared by every clone
}

impl<T, S> Clone for SheetRepository<T, S> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<T, S> SheetRepository<T, S>
where
    T: Transport,
    S: Sleeper,
{
    pub fn new(gateway: SheetGateway<T, S>) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }

    pub fn gateway(&self) -> &SheetGateway<T, S> {
        &self.gateway
    }
}

/// Read access to both document lists.
#[async_trait]
pub trait DocumentReader: Send + Sync {
    async fn list_orders(&self) -> RepositoryResult<Vec<Document>>;
    async fn list_delivery_notes(&self) -> RepositoryResult<Vec<Document>>;
}

/// Mutations accepted by the scripts. Nothing is ever deleted.
#[async_trait]
pub trait DocumentWriter: Send + Sync {
    async fn create_document(&self, new_document: &NewDocument) -> RepositoryResult<()>;
    async fn update_order_status(&self, update: &StatusUpdate) -> RepositoryResult<()>;
}

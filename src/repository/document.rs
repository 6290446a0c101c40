use async_trait::async_trait;
use serde_json::Value;

use crate::domain::document::{
    Document as DomainDocument, DocumentKind, NewDocument as DomainNewDocument,
    StatusUpdate as DomainStatusUpdate,
};
use crate::gateway::{Action, GatewayRequest, GatewayResult, Sleeper, Transport};
use crate::models::document::{
    NewDocument as WireNewDocument, StatusUpdate as WireStatusUpdate, documents_from_payload,
};
use crate::repository::{
    DocumentReader, DocumentWriter, RepositoryError, RepositoryResult, SheetRepository,
};

impl<T, S> SheetRepository<T, S>
where
    T: Transport,
    S: Sleeper,
{
    async fn fetch(&self, action: Action, kind: DocumentKind) -> RepositoryResult<Vec<DomainDocument>> {
        match self.gateway().call(&GatewayRequest::read(action, Vec::new())).await {
            GatewayResult::Success { data } => Ok(documents_from_payload(data, kind)),
            GatewayResult::Failure(failure) => Err(RepositoryError::from(failure)),
        }
    }

    async fn send(&self, action: Action, data: Value) -> RepositoryResult<()> {
        match self.gateway().call(&GatewayRequest::write(action, data)).await {
            GatewayResult::Success { .. } => Ok(()),
            GatewayResult::Failure(failure) => Err(RepositoryError::from(failure)),
        }
    }
}

#[async_trait]
impl<T, S> DocumentReader for SheetRepository<T, S>
where
    T: Transport,
    S: Sleeper,
{
    async fn list_orders(&self) -> RepositoryResult<Vec<DomainDocument>> {
        self.fetch(Action::GetOrders, DocumentKind::Order).await
    }

    async fn list_delivery_notes(&self) -> RepositoryResult<Vec<DomainDocument>> {
        self.fetch(Action::GetDeliveryNotes, DocumentKind::DeliveryNote)
            .await
    }
}

#[async_trait]
impl<T, S> DocumentWriter for SheetRepository<T, S>
where
    T: Transport,
    S: Sleeper,
{
    async fn create_document(&self, new_document: &DomainNewDocument) -> RepositoryResult<()> {
        let action = match new_document.kind {
            DocumentKind::Order => Action::AddOrder,
            DocumentKind::DeliveryNote => Action::AddDeliveryNote,
        };
        let data = serde_json::to_value(WireNewDocument::from(new_document))
            .map_err(|err| RepositoryError::Transport(err.to_string()))?;

        self.send(action, data).await
    }

    async fn update_order_status(&self, update: &DomainStatusUpdate) -> RepositoryResult<()> {
        let data = serde_json::to_value(WireStatusUpdate::from(update))
            .map_err(|err| RepositoryError::Transport(err.to_string()))?;

        self.send(Action::UpdateOrderStatus, data).await
    }
}

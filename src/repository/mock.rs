use async_trait::async_trait;
use mockall::mock;

use super::{DocumentReader, DocumentWriter, RepositoryResult};
use crate::domain::document::{Document, NewDocument, StatusUpdate};

mock! {
    pub DocumentReader {}

    #[async_trait]
    impl DocumentReader for DocumentReader {
        async fn list_orders(&self) -> RepositoryResult<Vec<Document>>;
        async fn list_delivery_notes(&self) -> RepositoryResult<Vec<Document>>;
    }
}

mock! {
    pub DocumentWriter {}

    #[async_trait]
    impl DocumentWriter for DocumentWriter {
        async fn create_document(&self, new_document: &NewDocument) -> RepositoryResult<()>;
        async fn update_order_status(&self, update: &StatusUpdate) -> RepositoryResult<()>;
    }
}


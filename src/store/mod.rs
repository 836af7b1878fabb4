pub mod local;

pub use local::LocalStore;

use crate::client::Client;
use crate::config::{StoreBackend, MAX_BATCH_SIZE};
use crate::error::StoreError;
use crate::record::{EntityKind, ValidatedRecord};

use async_trait::async_trait;
use std::sync::Arc;

/// Persistence collaborator of the import pipeline. The hosted document
/// database and the local fallback both sit behind this trait.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn lookup_client(&self, shop_id: &str) -> Result<Option<Client>, StoreError>;

    /// Highest identifier currently stored for `kind`, if any.
    async fn highest_id(&self, kind: EntityKind) -> Result<Option<String>, StoreError>;

    /// Writes every record of the batch or none of them.
    async fn commit_batch(
        &self,
        kind: EntityKind,
        records: &[ValidatedRecord],
    ) -> Result<(), StoreError>;

    fn batch_limit(&self) -> usize {
        MAX_BATCH_SIZE
    }
}

#[async_trait]
impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    async fn lookup_client(&self, shop_id: &str) -> Result<Option<Client>, StoreError> {
        (**self).lookup_client(shop_id).await
    }

    async fn highest_id(&self, kind: EntityKind) -> Result<Option<String>, StoreError> {
        (**self).highest_id(kind).await
    }

    async fn commit_batch(
        &self,
        kind: EntityKind,
        records: &[ValidatedRecord],
    ) -> Result<(), StoreError> {
        (**self).commit_batch(kind, records).await
    }

    fn batch_limit(&self) -> usize {
        (**self).batch_limit()
    }
}

/// Opens the store selected by configuration.
pub async fn open_store(backend: &StoreBackend) -> Result<LocalStore, StoreError> {
    match backend {
        StoreBackend::Memory => Ok(LocalStore::new()),
        StoreBackend::File(path) => LocalStore::open(path).await,
    }
}

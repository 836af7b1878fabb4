use crate::error::ImportError;
use crate::record::{EntityKind, ValidatedRecord};
use crate::store::DocumentStore;

use tracing::{error, info};

/// Submits validated records to the store in bounded, individually atomic
/// chunks. Earlier chunks stay committed when a later one fails.
pub struct BatchCommitter<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    chunk_size: usize,
}

impl<'a, S: DocumentStore + ?Sized> BatchCommitter<'a, S> {
    pub fn new(store: &'a S, batch_size: usize) -> Self {
        let chunk_size = batch_size.min(store.batch_limit()).max(1);
        Self { store, chunk_size }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns the number of records committed.
    pub async fn commit(
        &self,
        kind: EntityKind,
        records: &[ValidatedRecord],
    ) -> Result<usize, ImportError> {
        let mut committed = 0;

        for (chunk_index, chunk) in records.chunks(self.chunk_size).enumerate() {
            if let Err(source) = self.store.commit_batch(kind, chunk).await {
                error!(%kind, chunk = chunk_index + 1, committed, error = %source, "Batch commit failed");
                return Err(ImportError::Commit { committed, source });
            }

            committed += chunk.len();
            info!(%kind, chunk = chunk_index + 1, size = chunk.len(), committed, "Committed batch");
        }

        Ok(committed)
    }
}

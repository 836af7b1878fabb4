pub mod client;
pub mod commission;
pub mod config;
pub mod error;
pub mod ids;
pub mod import;
pub mod query;
pub mod record;
pub mod store;

use crate::error::ImportError;
use crate::import::{ImportResult, Importer, Progress};
use crate::record::EntityKind;
use crate::store::DocumentStore;

use std::path::Path;
use tokio::sync::mpsc::UnboundedSender;

/// Reads the CSV file at `path` and imports it as `kind` records.
pub async fn import_file<S: DocumentStore>(
    importer: &Importer<S>,
    kind: EntityKind,
    path: &Path,
    progress: Option<UnboundedSender<Progress>>,
) -> Result<ImportResult, ImportError> {
    let text = tokio::fs::read_to_string(path).await?;
    importer.import(kind, &text, progress).await
}

use crate::client::Client;
use crate::config::Config;
use crate::error::{ImportError, RowError};
use crate::ids::IdSequence;
use crate::import::committer::BatchCommitter;
use crate::import::parser::{CsvParser, RawRow};
use crate::import::progress::{Progress, ProgressReporter};
use crate::import::spec::ImportSpec;
use crate::import::validator::{validate_row, ColumnIndex, RowContext};
use crate::record::{EntityKind, ValidatedRecord};
use crate::store::DocumentStore;

use chrono::{Local, NaiveDate};
use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

/// A skipped row and why.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub line: usize,
    pub error: RowError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportResult {
    pub kind: EntityKind,
    pub succeeded: usize,
    pub failed: usize,
    pub records: Vec<ValidatedRecord>,
    pub rejections: Vec<Rejection>,
}

pub struct Importer<S> {
    store: S,
    config: Config,
    today: Option<NaiveDate>,
}

impl<S: DocumentStore> Importer<S> {
    pub fn new(store: S, config: Config) -> Self {
        Self {
            store,
            config,
            today: None,
        }
    }

    /// Fixes the date substituted for unparseable dates. Without it the
    /// local date at the start of each import is used.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs one import of `text` as `kind` records.
    ///
    /// Structural problems (no data rows, missing required columns) abort
    /// before any row is processed. Invalid rows are counted and skipped.
    /// Valid rows are committed in chunks once every row has been checked.
    pub async fn import(
        &self,
        kind: EntityKind,
        text: &str,
        progress: Option<UnboundedSender<Progress>>,
    ) -> Result<ImportResult, ImportError> {
        if !self.config.role.can_write() {
            return Err(ImportError::PermissionDenied(self.config.role));
        }

        let spec = ImportSpec::for_kind(kind);
        let parsed = CsvParser::new().parse(text)?;
        let columns = ColumnIndex::resolve(spec, &parsed)?;
        info!(%kind, rows = parsed.rows.len(), "Starting import");

        let highest = self.store.highest_id(kind).await?;
        let mut ids = IdSequence::starting_after(kind, highest.as_deref());

        let clients = self.load_clients(spec, &columns, &parsed.rows).await?;
        let ctx = RowContext {
            clients: &clients,
            today: self.today.unwrap_or_else(|| Local::now().date_naive()),
        };

        let reporter = ProgressReporter::new(progress, parsed.rows.len(), self.config.yield_every);
        let mut records = Vec::new();
        let mut rejections = Vec::new();

        for (index, row) in parsed.rows.iter().enumerate() {
            match validate_row(spec, &columns, row, &ctx, &mut ids) {
                Ok(record) => records.push(record),
                Err(error) => {
                    warn!(%kind, line = row.line, %error, "Skipping invalid row");
                    rejections.push(Rejection {
                        line: row.line,
                        error,
                    });
                }
            }

            reporter
                .row_done(index + 1, records.len(), rejections.len())
                .await;
        }

        let committer = BatchCommitter::new(&self.store, self.config.batch_size);
        committer.commit(kind, &records).await?;

        info!(
            %kind,
            succeeded = records.len(),
            failed = rejections.len(),
            "Import finished"
        );

        Ok(ImportResult {
            kind,
            succeeded: records.len(),
            failed: rejections.len(),
            records,
            rejections,
        })
    }

    /// Resolves every distinct shop id referenced by the rows, once.
    async fn load_clients(
        &self,
        spec: &ImportSpec,
        columns: &ColumnIndex,
        rows: &[RawRow],
    ) -> Result<HashMap<String, Client>, ImportError> {
        let mut clients = HashMap::new();
        let Some(reference) = spec.reference_column() else {
            return Ok(clients);
        };

        let mut seen = HashSet::new();
        for row in rows {
            let shop_id = columns.cell(row, reference).trim();
            if shop_id.is_empty() || !seen.insert(shop_id) {
                continue;
            }
            if let Some(client) = self.store.lookup_client(shop_id).await? {
                clients.insert(shop_id.to_string(), client);
            }
        }

        Ok(clients)
    }
}

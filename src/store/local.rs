use crate::client::Client;
use crate::config::MAX_BATCH_SIZE;
use crate::error::StoreError;
use crate::ids::sequence_number;
use crate::record::{EntityKind, ValidatedRecord};
use crate::store::DocumentStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    clients: BTreeMap<String, Client>,
    #[serde(default)]
    orders: BTreeMap<String, ValidatedRecord>,
    #[serde(default)]
    deposits: BTreeMap<String, ValidatedRecord>,
    #[serde(default)]
    withdrawals: BTreeMap<String, ValidatedRecord>,
    #[serde(default)]
    agents: BTreeMap<String, ValidatedRecord>,
}

impl Snapshot {
    fn collection(&self, kind: EntityKind) -> &BTreeMap<String, ValidatedRecord> {
        match kind {
            EntityKind::Order => &self.orders,
            EntityKind::Deposit => &self.deposits,
            EntityKind::Withdrawal => &self.withdrawals,
            EntityKind::Agent => &self.agents,
        }
    }

    fn collection_mut(&mut self, kind: EntityKind) -> &mut BTreeMap<String, ValidatedRecord> {
        match kind {
            EntityKind::Order => &mut self.orders,
            EntityKind::Deposit => &mut self.deposits,
            EntityKind::Withdrawal => &mut self.withdrawals,
            EntityKind::Agent => &mut self.agents,
        }
    }
}

/// Store used when no hosted database is configured: an in-memory document
/// map, optionally mirrored to a JSON file after every write.
pub struct LocalStore {
    data: RwLock<Snapshot>,
    path: Option<PathBuf>,
    batch_limit: usize,
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStore {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(Snapshot::default()),
            path: None,
            batch_limit: MAX_BATCH_SIZE,
        }
    }

    /// Loads the snapshot at `path`, starting empty when the file is absent.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let snapshot = match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
            Err(e) => return Err(e.into()),
        };
        info!(path = %path.display(), "Opened local store");

        Ok(Self {
            data: RwLock::new(snapshot),
            path: Some(path.to_path_buf()),
            batch_limit: MAX_BATCH_SIZE,
        })
    }

    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = limit.max(1);
        self
    }

    pub async fn upsert_client(&self, client: Client) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        let shop_id = client.shop_id.clone();
        let previous = data.clients.insert(shop_id.clone(), client);

        if let Err(e) = self.persist(&data).await {
            match previous {
                Some(previous) => data.clients.insert(shop_id, previous),
                None => data.clients.remove(&shop_id),
            };
            return Err(e);
        }
        Ok(())
    }

    pub async fn clients(&self) -> Vec<Client> {
        self.data.read().await.clients.values().cloned().collect()
    }

    /// Records of one collection, ordered by identifier.
    pub async fn records(&self, kind: EntityKind) -> Vec<ValidatedRecord> {
        let data = self.data.read().await;
        let mut records: Vec<_> = data.collection(kind).values().cloned().collect();
        records.sort_by_key(|r| sequence_number(kind.id_prefix(), r.id()).unwrap_or(0));
        records
    }

    async fn persist(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        debug!(path = %path.display(), "Persisted local store");

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn lookup_client(&self, shop_id: &str) -> Result<Option<Client>, StoreError> {
        Ok(self.data.read().await.clients.get(shop_id).cloned())
    }

    async fn highest_id(&self, kind: EntityKind) -> Result<Option<String>, StoreError> {
        let data = self.data.read().await;
        let prefix = kind.id_prefix();

        Ok(data
            .collection(kind)
            .keys()
            .filter_map(|id| sequence_number(prefix, id).map(|n| (n, id)))
            .max_by_key(|(n, _)| *n)
            .map(|(_, id)| id.clone()))
    }

    async fn commit_batch(
        &self,
        kind: EntityKind,
        records: &[ValidatedRecord],
    ) -> Result<(), StoreError> {
        if records.len() > self.batch_limit {
            return Err(StoreError::BatchTooLarge {
                size: records.len(),
                limit: self.batch_limit,
            });
        }

        let mut data = self.data.write().await;
        let existing = data.collection(kind);
        let mut seen = HashSet::new();

        for record in records {
            if record.kind() != kind {
                return Err(StoreError::EntityMismatch {
                    id: record.id().to_string(),
                    expected: kind,
                });
            }
            if existing.contains_key(record.id()) || !seen.insert(record.id()) {
                return Err(StoreError::DuplicateId(record.id().to_string()));
            }
        }

        let collection = data.collection_mut(kind);
        for record in records {
            collection.insert(record.id().to_string(), record.clone());
        }

        // Ids were checked as new above, so removing them restores the collection.
        if let Err(e) = self.persist(&data).await {
            let collection = data.collection_mut(kind);
            for record in records {
                collection.remove(record.id());
            }
            return Err(e);
        }

        Ok(())
    }

    fn batch_limit(&self) -> usize {
        self.batch_limit
    }
}

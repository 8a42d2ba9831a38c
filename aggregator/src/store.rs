use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use utils::map::Map;

pub type EpochId = u64;

/// An encrypted epoch filter stored for one consumer. Timestamps are in
/// milliseconds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EpochRecord {
    pub sensor_id: String,
    pub start_ms: u64,
    pub end_ms: u64,
    pub ciphertext: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochSummary {
    pub epoch_id: EpochId,
    pub epoch_start_timestamp: u64,
    pub epoch_end_timestamp: u64,
    pub sensor_id: String,
}

/// Persistence of encrypted epochs, keyed by consumer.
pub trait EpochStore: Send + Sync {
    fn insert(&self, consumer: &str, record: EpochRecord) -> EpochId;

    /// Summaries in insertion order; `None` for an unknown consumer.
    fn list(&self, consumer: &str) -> Option<Vec<EpochSummary>>;

    /// Ciphertexts of the requested epochs that exist, in request order.
    /// `None` for an unknown consumer.
    fn fetch(&self, consumer: &str, ids: &[EpochId]) -> Option<Vec<(EpochId, Vec<u8>)>>;

    fn remove_consumer(&self, consumer: &str) -> bool;
}

struct StoredEpoch {
    id: EpochId,
    record: EpochRecord,
}

impl StoredEpoch {
    fn summary(&self) -> EpochSummary {
        EpochSummary {
            epoch_id: self.id,
            epoch_start_timestamp: self.record.start_ms,
            epoch_end_timestamp: self.record.end_ms,
            sensor_id: self.record.sensor_id.clone(),
        }
    }
}

/// Process-local [EpochStore]. Ids are unique across consumers.
pub struct MemoryEpochStore {
    consumers: RwLock<Map<String, Vec<StoredEpoch>>>,
    next_id: AtomicU64,
}

impl Default for MemoryEpochStore {
    fn default() -> Self {
        Self {
            consumers: RwLock::new(Map::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl MemoryEpochStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EpochStore for MemoryEpochStore {
    fn insert(&self, consumer: &str, record: EpochRecord) -> EpochId {
        let id: EpochId = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut consumers = self.consumers.write().unwrap_or_else(PoisonError::into_inner);
        consumers
            .0
            .entry(consumer.to_string())
            .or_default()
            .push(StoredEpoch { id, record });
        id
    }

    fn list(&self, consumer: &str) -> Option<Vec<EpochSummary>> {
        let consumers = self.consumers.read().unwrap_or_else(PoisonError::into_inner);
        consumers
            .get(consumer)
            .map(|epochs| epochs.iter().map(StoredEpoch::summary).collect())
    }

    fn fetch(&self, consumer: &str, ids: &[EpochId]) -> Option<Vec<(EpochId, Vec<u8>)>> {
        let consumers = self.consumers.read().unwrap_or_else(PoisonError::into_inner);
        let epochs: &Vec<StoredEpoch> = consumers.get(consumer)?;
        Some(
            ids.iter()
                .filter_map(|id| {
                    epochs
                        .iter()
                        .find(|epoch| epoch.id == *id)
                        .map(|epoch| (epoch.id, epoch.record.ciphertext.clone()))
                })
                .collect(),
        )
    }

    fn remove_consumer(&self, consumer: &str) -> bool {
        let mut consumers = self.consumers.write().unwrap_or_else(PoisonError::into_inner);
        consumers.remove(consumer).is_some()
    }
}

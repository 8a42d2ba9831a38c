use crate::dispatcher::Dispatcher;
use crate::error::{Result, ServiceError};
use crate::store::{EpochId, EpochRecord, EpochStore, EpochSummary};
use crate::wire::{
    QueryRequest, QueryResponse, SensorReport, decode_ciphertext, decode_key, encode_blob,
};
use bfv::ciphertext::Ciphertext;
use std::sync::Arc;
use tracing::{info, instrument};

/// Resolves consumer queries over stored epochs into one aggregation.
pub struct QueryOrchestrator<S: EpochStore> {
    store: S,
    dispatcher: Arc<Dispatcher>,
}

impl<S: EpochStore> QueryOrchestrator<S> {
    pub fn new(store: S, dispatcher: Arc<Dispatcher>) -> Self {
        Self { store, dispatcher }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stores every ciphertext of `report` under its consumer and returns the
    /// new epoch ids, one per consumer in key order. A report with any
    /// undecodable ciphertext is rejected as a whole.
    #[instrument(skip_all, fields(sensor = %report.sensor_id))]
    pub fn ingest(&self, report: &SensorReport) -> Result<Vec<(String, EpochId)>> {
        if report.epoch_end_timestamp < report.epoch_start_timestamp {
            return Err(ServiceError::InvalidReport(format!(
                "epoch ends at {} before it starts at {}",
                report.epoch_end_timestamp, report.epoch_start_timestamp
            )));
        }
        let mut records: Vec<(&String, Vec<u8>)> =
            Vec::with_capacity(report.encrypted_bloom_filters.len());
        for (consumer, blob) in report.encrypted_bloom_filters.iter() {
            let bytes: Vec<u8> = decode_ciphertext(blob)?;
            Ciphertext::from_bytes(self.dispatcher.context(), &bytes)?;
            records.push((consumer, bytes));
        }
        let ids: Vec<(String, EpochId)> = records
            .into_iter()
            .map(|(consumer, ciphertext)| {
                let record: EpochRecord = EpochRecord {
                    sensor_id: report.sensor_id.clone(),
                    start_ms: report.epoch_start_timestamp.saturating_mul(1000),
                    end_ms: report.epoch_end_timestamp.saturating_mul(1000),
                    ciphertext,
                };
                (consumer.clone(), self.store.insert(consumer, record))
            })
            .collect();
        info!(consumers = ids.len(), "epoch stored");
        Ok(ids)
    }

    /// Epochs stored for `consumer`; empty for an unknown consumer.
    pub fn available_epochs(&self, consumer: &str) -> Vec<EpochSummary> {
        self.store.list(consumer).unwrap_or_default()
    }

    /// Aggregates the requested epochs of `request.pkc` and returns them with
    /// their metadata, in request order. Repeated ids count once.
    #[instrument(skip_all, fields(consumer = %request.pkc, epochs = request.epoch_ids.len()))]
    pub fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let summaries: Vec<EpochSummary> = self
            .store
            .list(&request.pkc)
            .ok_or_else(|| ServiceError::ConsumerNotFound(request.pkc.clone()))?;
        if request.epoch_ids.is_empty() {
            return Err(ServiceError::EmptyEpochSelection);
        }
        let mut ids: Vec<EpochId> = Vec::with_capacity(request.epoch_ids.len());
        for id in request.epoch_ids.iter() {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        let found: Vec<(EpochId, Vec<u8>)> = self
            .store
            .fetch(&request.pkc, &ids)
            .ok_or_else(|| ServiceError::ConsumerNotFound(request.pkc.clone()))?;
        if found.len() != ids.len() {
            return Err(ServiceError::EpochsNotFound {
                requested: ids.len(),
                found: found.len(),
            });
        }
        let rlk: Vec<u8> = decode_key(&request.serialized_relin_keys)?;
        let gk: Vec<u8> = decode_key(&request.serialized_galois_keys)?;
        let ciphertexts: Vec<Vec<u8>> = found.into_iter().map(|(_, ct)| ct).collect();
        let ct: Vec<u8> = self.dispatcher.run_aggregate(&rlk, &gk, &ciphertexts)?;
        let queried: Vec<EpochSummary> = ids
            .iter()
            .filter_map(|id| summaries.iter().find(|epoch| epoch.epoch_id == *id).cloned())
            .collect();
        Ok(QueryResponse {
            total_epochs_count: summaries.len(),
            queried_epochs: queried,
            bloom_filter: encode_blob(&ct),
        })
    }

    pub fn delete_consumer(&self, consumer: &str) -> bool {
        let removed: bool = self.store.remove_consumer(consumer);
        info!(consumer, removed, "consumer deleted");
        removed
    }
}

//! JSON request and response bodies. Blobs travel base64-encoded; field names
//! follow the services that already speak this protocol.

use crate::error::{Result, ServiceError};
use crate::store::{EpochId, EpochSummary};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub fn encode_blob(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_key(blob: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(blob.trim())
        .map_err(|err| ServiceError::KeyDeserialization(format!("invalid base64: {}", err)))
}

pub fn decode_ciphertext(blob: &str) -> Result<Vec<u8>> {
    STANDARD.decode(blob.trim()).map_err(|err| {
        ServiceError::CiphertextDeserialization(format!("invalid base64: {}", err))
    })
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptRequest {
    pub public_key: String,
    pub bloom_filter: Vec<u64>,
}

/// Parallel arrays: `public_key[i]` encrypts `bloom_filter[i]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEncryptRequest {
    pub public_key: Vec<String>,
    pub bloom_filter: Vec<Vec<u64>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRequest {
    pub serialized_galois_keys: String,
    pub serialized_relin_keys: String,
    pub encrypted_bloom_filters: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobResponse {
    pub result: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub result: Vec<String>,
}

/// One sensor epoch: a ciphertext per consumer public-key id. Timestamps are
/// in seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorReport {
    pub sensor_id: String,
    pub epoch_start_timestamp: u64,
    pub epoch_end_timestamp: u64,
    pub encrypted_bloom_filters: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerRequest {
    pub pkc: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableEpochsResponse {
    pub result: Vec<EpochSummary>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub pkc: String,
    pub serialized_galois_keys: String,
    pub serialized_relin_keys: String,
    #[serde(rename = "epochs_ids")]
    pub epoch_ids: Vec<EpochId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub total_epochs_count: usize,
    pub queried_epochs: Vec<EpochSummary>,
    pub bloom_filter: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub result: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names() {
        let request: QueryRequest = serde_json::from_str(
            r#"{"pkc":"c1","serializedGaloisKeys":"Zw==","serializedRelinKeys":"cg==","epochs_ids":[3,4]}"#,
        )
        .unwrap();
        assert_eq!(request.epoch_ids, vec![3, 4]);

        let response: QueryResponse = QueryResponse {
            total_epochs_count: 7,
            queried_epochs: vec![EpochSummary {
                epoch_id: 4,
                epoch_start_timestamp: 1_000,
                epoch_end_timestamp: 61_000,
                sensor_id: "s1".to_string(),
            }],
            bloom_filter: "AA==".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            concat!(
                r#"{"totalEpochsCount":7,"queriedEpochs":[{"epochId":4,"#,
                r#""epochStartTimestamp":1000,"epochEndTimestamp":61000,"sensorId":"s1"}],"#,
                r#""bloomFilter":"AA=="}"#
            )
        );

        let request: EncryptRequest =
            serde_json::from_str(r#"{"publicKey":"AQI=","bloomFilter":[1,0,1]}"#).unwrap();
        assert_eq!(decode_key(&request.public_key).unwrap(), vec![1, 2]);
    }

    #[test]
    fn bad_base64() {
        assert!(matches!(
            decode_key("not base64!"),
            Err(ServiceError::KeyDeserialization(_))
        ));
        assert!(matches!(
            decode_ciphertext("%%"),
            Err(ServiceError::CiphertextDeserialization(_))
        ));
    }
}

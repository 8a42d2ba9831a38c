use bfv::BfvError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid scheme parameters: {0}")]
    Parameter(String),

    #[error("key deserialization failed: {0}")]
    KeyDeserialization(String),

    #[error("ciphertext deserialization failed: {0}")]
    CiphertextDeserialization(String),

    #[error("encoding failed: {0}")]
    Encoding(String),

    #[error("key mismatch: expected key id {expected}, found {found}")]
    KeyMismatch { expected: String, found: String },

    #[error(
        "noise budget exhausted: estimated noise of {noise_bits:.1} bits exceeds the limit of {limit_bits:.1} bits"
    )]
    NoiseBudgetExhausted { noise_bits: f64, limit_bits: f64 },

    #[error("no ciphertexts to aggregate")]
    EmptyInput,

    #[error("evaluation failed: {0}")]
    Evaluation(String),

    #[error("batch item {index} failed: {source}")]
    Batch {
        index: usize,
        #[source]
        source: Box<ServiceError>,
    },

    #[error("batch arrays differ in length: {public_keys} public keys, {vectors} vectors")]
    BatchLengthMismatch { public_keys: usize, vectors: usize },

    #[error("consumer {0} not found")]
    ConsumerNotFound(String),

    #[error("invalid sensor report: {0}")]
    InvalidReport(String),

    #[error("epoch id list is empty")]
    EmptyEpochSelection,

    #[error("not all epochs were found: requested {requested}, found {found}")]
    EpochsNotFound { requested: usize, found: usize },

    #[error("worker pool error: {0}")]
    Worker(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

impl From<BfvError> for ServiceError {
    fn from(err: BfvError) -> Self {
        match err {
            BfvError::InvalidParameters(msg) => ServiceError::Parameter(msg),
            BfvError::KeyDeserialization(msg) => ServiceError::KeyDeserialization(msg),
            BfvError::CiphertextDeserialization(msg) => {
                ServiceError::CiphertextDeserialization(msg)
            }
            BfvError::Encoding(msg) => ServiceError::Encoding(msg),
            BfvError::KeyMismatch { expected, found } => {
                ServiceError::KeyMismatch { expected, found }
            }
            BfvError::NoiseBudgetExhausted {
                noise_bits,
                limit_bits,
            } => ServiceError::NoiseBudgetExhausted {
                noise_bits,
                limit_bits,
            },
            err @ (BfvError::MissingGaloisKey(_) | BfvError::InvalidCiphertext(_)) => {
                ServiceError::Evaluation(err.to_string())
            }
        }
    }
}

impl ServiceError {
    /// The innermost error of a batch failure.
    pub fn root(&self) -> &ServiceError {
        match self {
            ServiceError::Batch { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Wire form of every rejected request: `{"error": {"message": ...}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: ErrorMessage,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

impl From<&ServiceError> for ErrorPayload {
    fn from(err: &ServiceError) -> Self {
        ErrorPayload {
            error: ErrorMessage {
                message: err.to_string(),
            },
        }
    }
}

impl From<ServiceError> for ErrorPayload {
    fn from(err: ServiceError) -> Self {
        ErrorPayload::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_shape() {
        let payload: ErrorPayload = ServiceError::EmptyInput.into();
        let json: String = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"error":{"message":"no ciphertexts to aggregate"}}"#);
    }

    #[test]
    fn batch_root() {
        let err: ServiceError = ServiceError::Batch {
            index: 2,
            source: Box::new(ServiceError::Encoding("too long".to_string())),
        };
        assert!(matches!(err.root(), ServiceError::Encoding(_)));
        assert!(err.to_string().starts_with("batch item 2 failed"));
    }

    #[test]
    fn bfv_errors_map_to_taxonomy() {
        let err: ServiceError = BfvError::NoiseBudgetExhausted {
            noise_bits: 97.0,
            limit_bits: 87.0,
        }
        .into();
        assert!(matches!(err, ServiceError::NoiseBudgetExhausted { .. }));
        let err: ServiceError = BfvError::KeyDeserialization("bad".to_string()).into();
        assert!(matches!(err, ServiceError::KeyDeserialization(_)));
    }
}

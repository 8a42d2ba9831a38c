use thiserror::Error;

#[derive(Debug, Error)]
pub enum BfvError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("key deserialization error: {0}")]
    KeyDeserialization(String),

    #[error("ciphertext deserialization error: {0}")]
    CiphertextDeserialization(String),

    #[error("key mismatch: expected key id {expected}, found {found}")]
    KeyMismatch { expected: String, found: String },

    #[error("missing galois key for element {0}")]
    MissingGaloisKey(usize),

    #[error("invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    #[error(
        "noise budget exhausted: estimated noise of {noise_bits:.1} bits exceeds the limit of {limit_bits:.1} bits"
    )]
    NoiseBudgetExhausted { noise_bits: f64, limit_bits: f64 },
}

pub type Result<T> = std::result::Result<T, BfvError>;

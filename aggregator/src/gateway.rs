use crate::error::{Result, ServiceError};
use bfv::ciphertext::Ciphertext;
use bfv::context::Context;
use bfv::encoder::BatchEncoder;
use bfv::encryptor::Encryptor;
use bfv::keys::PublicKey;
use bfv::plaintext::Plaintext;
use rayon::prelude::*;
use sampling::source::Source;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Encrypts plain bit-vectors under a consumer's serialized public key.
#[derive(Clone)]
pub struct EncryptionGateway {
    context: Arc<Context>,
}

impl EncryptionGateway {
    pub fn new(context: Arc<Context>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    /// Deserializes `public_key`, batch-encodes `vector` and returns the
    /// serialized ciphertext. Every call draws fresh randomness.
    #[instrument(skip_all, fields(len = vector.len()))]
    pub fn encrypt(&self, public_key: &[u8], vector: &[u64]) -> Result<Vec<u8>> {
        let now: Instant = Instant::now();
        let context: &Context = &self.context;
        let pk: PublicKey = PublicKey::from_bytes(context, public_key)?;
        let pt: Plaintext = BatchEncoder::new(context).encode(vector)?;
        let mut source: Source = Source::from_entropy();
        let ct: Ciphertext = Encryptor::new(context, &pk).encrypt(&pt, &mut source);
        let bytes: Vec<u8> = ct.to_bytes(context);
        info!(key_id = %pk.key_id(), "Encryption lasted {:?}", now.elapsed());
        Ok(bytes)
    }

    /// Encrypts `vectors[i]` under `public_keys[i]` on the current rayon pool.
    ///
    /// All or nothing: if any pair fails, the failure with the lowest index is
    /// returned as [`ServiceError::Batch`] and no ciphertext is.
    #[instrument(skip_all, fields(items = vectors.len()))]
    pub fn encrypt_batch<K, V>(&self, public_keys: &[K], vectors: &[V]) -> Result<Vec<Vec<u8>>>
    where
        K: AsRef<[u8]> + Sync,
        V: AsRef<[u64]> + Sync,
    {
        if public_keys.len() != vectors.len() {
            return Err(ServiceError::BatchLengthMismatch {
                public_keys: public_keys.len(),
                vectors: vectors.len(),
            });
        }
        let now: Instant = Instant::now();
        let results: Vec<Result<Vec<u8>>> = public_keys
            .par_iter()
            .zip(vectors.par_iter())
            .map(|(pk, vector)| self.encrypt(pk.as_ref(), vector.as_ref()))
            .collect();
        let mut ciphertexts: Vec<Vec<u8>> = Vec::with_capacity(results.len());
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(ct) => ciphertexts.push(ct),
                Err(err) => {
                    debug!(index, %err, "batch rejected");
                    return Err(ServiceError::Batch {
                        index,
                        source: Box::new(err),
                    });
                }
            }
        }
        info!(
            items = ciphertexts.len(),
            "Batch encryption lasted {:?}",
            now.elapsed()
        );
        Ok(ciphertexts)
    }
}

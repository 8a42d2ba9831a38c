use crate::config::Config;
use crate::engine::AggregationEngine;
use crate::error::{ErrorPayload, Result, ServiceError};
use crate::gateway::EncryptionGateway;
use crate::wire::{
    AggregateRequest, BatchEncryptRequest, BatchResponse, BlobResponse, EncryptRequest,
    decode_ciphertext, decode_key, encode_blob,
};
use bfv::context::Context;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;
use tracing::{info, warn};

/// Runs gateway and engine requests on a bounded worker pool sharing one
/// immutable [Context].
pub struct Dispatcher {
    context: Arc<Context>,
    pool: ThreadPool,
    gateway: EncryptionGateway,
    engine: AggregationEngine,
}

impl Dispatcher {
    /// `workers == None` sizes the pool to the available cores.
    pub fn new(context: Arc<Context>, workers: Option<usize>) -> Result<Self> {
        let mut builder: ThreadPoolBuilder =
            ThreadPoolBuilder::new().thread_name(|i| format!("bloomagg-worker-{}", i));
        if let Some(workers) = workers {
            builder = builder.num_threads(workers);
        }
        let pool: ThreadPool = builder
            .build()
            .map_err(|err| ServiceError::Worker(err.to_string()))?;
        info!(
            workers = pool.current_num_threads(),
            n = context.n(),
            log_q = context.log_q(),
            t = context.plain_modulus(),
            "dispatcher ready"
        );
        Ok(Self {
            gateway: EncryptionGateway::new(context.clone()),
            engine: AggregationEngine::new(context.clone()),
            context,
            pool,
        })
    }

    /// Builds the [Context] from `config`; a bad parameter set is a
    /// [ServiceError::Parameter].
    pub fn from_config(config: &Config) -> Result<Self> {
        let context: Context = Context::new(&config.to_literal()?)?;
        Self::new(Arc::new(context), config.engine.workers)
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn gateway(&self) -> &EncryptionGateway {
        &self.gateway
    }

    pub fn engine(&self) -> &AggregationEngine {
        &self.engine
    }

    pub fn encrypt(
        &self,
        request: &EncryptRequest,
    ) -> std::result::Result<BlobResponse, ErrorPayload> {
        self.pool
            .install(|| -> Result<BlobResponse> {
                let pk: Vec<u8> = decode_key(&request.public_key)?;
                let ct: Vec<u8> = self.gateway.encrypt(&pk, &request.bloom_filter)?;
                Ok(BlobResponse {
                    result: encode_blob(&ct),
                })
            })
            .map_err(reject)
    }

    pub fn encrypt_batch(
        &self,
        request: &BatchEncryptRequest,
    ) -> std::result::Result<BatchResponse, ErrorPayload> {
        self.pool
            .install(|| -> Result<BatchResponse> {
                let public_keys: Vec<Vec<u8>> = request
                    .public_key
                    .iter()
                    .enumerate()
                    .map(|(index, pk)| {
                        decode_key(pk).map_err(|err| ServiceError::Batch {
                            index,
                            source: Box::new(err),
                        })
                    })
                    .collect::<Result<_>>()?;
                let cts: Vec<Vec<u8>> = self
                    .gateway
                    .encrypt_batch(&public_keys, &request.bloom_filter)?;
                Ok(BatchResponse {
                    result: cts.iter().map(|ct| encode_blob(ct)).collect(),
                })
            })
            .map_err(reject)
    }

    pub fn aggregate(
        &self,
        request: &AggregateRequest,
    ) -> std::result::Result<BlobResponse, ErrorPayload> {
        let run = || -> Result<BlobResponse> {
            let rlk: Vec<u8> = decode_key(&request.serialized_relin_keys)?;
            let gk: Vec<u8> = decode_key(&request.serialized_galois_keys)?;
            let cts: Vec<Vec<u8>> = request
                .encrypted_bloom_filters
                .iter()
                .map(|ct| decode_ciphertext(ct))
                .collect::<Result<_>>()?;
            let ct: Vec<u8> = self.run_aggregate(&rlk, &gk, &cts)?;
            Ok(BlobResponse {
                result: encode_blob(&ct),
            })
        };
        run().map_err(reject)
    }

    /// Aggregation of already-decoded blobs as one pool job.
    pub fn run_aggregate(
        &self,
        relin_keys: &[u8],
        galois_keys: &[u8],
        ciphertexts: &[Vec<u8>],
    ) -> Result<Vec<u8>> {
        self.pool
            .install(|| self.engine.aggregate(relin_keys, galois_keys, ciphertexts))
    }
}

fn reject(err: ServiceError) -> ErrorPayload {
    warn!(%err, "request rejected");
    ErrorPayload::from(&err)
}

use crate::error::{Result, ServiceError};
use bfv::ciphertext::Ciphertext;
use bfv::context::Context;
use bfv::evaluator::Evaluator;
use bfv::keys::{GaloisKeys, RelinearizationKey};
use bfv::noise::NoiseModel;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Multiplies a list of ciphertexts slot-wise and sums the slots of the
/// product, so the result decrypts to the number of slots set in every input.
#[derive(Clone)]
pub struct AggregationEngine {
    context: Arc<Context>,
}

impl AggregationEngine {
    pub fn new(context: Arc<Context>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    /// Inputs are consumed in order: the first ciphertext seeds the
    /// accumulator, each following one is multiplied in and relinearized
    /// immediately, then a rotate-and-add pass sums every slot.
    #[instrument(skip_all, fields(inputs = ciphertexts.len()))]
    pub fn aggregate<C: AsRef<[u8]>>(
        &self,
        relin_keys: &[u8],
        galois_keys: &[u8],
        ciphertexts: &[C],
    ) -> Result<Vec<u8>> {
        let (first, rest) = ciphertexts.split_first().ok_or(ServiceError::EmptyInput)?;
        let now: Instant = Instant::now();
        let context: &Context = &self.context;

        // Fail before any work when fresh inputs would already overrun the budget.
        let noise: &NoiseModel = context.noise_model();
        noise.check(noise.aggregate(ciphertexts.len(), context.sum_steps()))?;

        let rlk: RelinearizationKey = RelinearizationKey::from_bytes(context, relin_keys)?;
        let gk: GaloisKeys = GaloisKeys::from_bytes(context, galois_keys)?;
        let evaluator: Evaluator = Evaluator::new(context);

        let mut acc: Ciphertext = Ciphertext::from_bytes(context, first.as_ref())?;
        for (i, ct) in rest.iter().enumerate() {
            let ct: Ciphertext = Ciphertext::from_bytes(context, ct.as_ref())?;
            acc = evaluator.multiply_relinearize(&acc, &ct, &rlk)?;
            debug!(
                step = i + 1,
                noise_bits = acc.noise_estimate_bits(),
                "multiplied"
            );
        }
        let acc: Ciphertext = evaluator.sum_elements(&acc, &gk)?;
        info!(
            inputs = ciphertexts.len(),
            noise_bits = acc.noise_estimate_bits(),
            "Multiplication lasted {:?}",
            now.elapsed()
        );
        Ok(acc.to_bytes(context))
    }
}

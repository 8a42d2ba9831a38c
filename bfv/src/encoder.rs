use crate::context::Context;
use crate::error::{BfvError, Result};
use crate::plaintext::Plaintext;

/// Packs vectors of integers mod t into the slots of a plaintext, so that
/// ciphertext multiplication acts slot by slot.
pub struct BatchEncoder<'a> {
    context: &'a Context,
}

impl<'a> BatchEncoder<'a> {
    pub fn new(context: &'a Context) -> Self {
        Self { context }
    }

    pub fn slots(&self) -> usize {
        self.context.slots()
    }

    /// Missing trailing slots are zero. Vectors longer than the slot count or
    /// holding values >= t are rejected.
    pub fn encode(&self, values: &[u64]) -> Result<Plaintext> {
        let slots: usize = self.slots();
        let t: u64 = self.context.plain_modulus();
        if values.len() > slots {
            return Err(BfvError::Encoding(format!(
                "vector of length {} exceeds the {} available slots",
                values.len(),
                slots
            )));
        }
        if let Some((i, v)) = values.iter().enumerate().find(|(_, v)| **v >= t) {
            return Err(BfvError::Encoding(format!(
                "value {} at slot {} is not below the plain modulus {}",
                v, i, t
            )));
        }
        let mut pt: Plaintext = Plaintext::new(self.context.n());
        values
            .iter()
            .zip(self.context.slot_index.iter())
            .for_each(|(&v, &idx)| pt.0.0[idx] = v);
        self.context.ring_t.intt_inplace(&mut pt.0);
        Ok(pt)
    }

    pub fn decode(&self, pt: &Plaintext) -> Vec<u64> {
        let mut evaluations: Plaintext = pt.clone();
        self.context.ring_t.ntt_inplace(&mut evaluations.0);
        self.context
            .slot_index
            .iter()
            .map(|&idx| evaluations.0.0[idx])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ParametersLiteral;

    #[test]
    fn encode_decode() {
        let context: Context = Context::new(&ParametersLiteral::default()).unwrap();
        let encoder: BatchEncoder = BatchEncoder::new(&context);
        let t: u64 = context.plain_modulus();
        let values: Vec<u64> = (0..100u64).map(|i| (i * 7919) % t).collect();
        let pt: Plaintext = encoder.encode(&values).unwrap();
        let decoded: Vec<u64> = encoder.decode(&pt);
        assert_eq!(&decoded[..values.len()], &values[..]);
        assert!(decoded[values.len()..].iter().all(|&x| x == 0));
    }

    #[test]
    fn rejects_out_of_range() {
        let context: Context = Context::new(&ParametersLiteral::default()).unwrap();
        let encoder: BatchEncoder = BatchEncoder::new(&context);
        let too_long: Vec<u64> = vec![0; context.slots() + 1];
        assert!(matches!(encoder.encode(&too_long), Err(BfvError::Encoding(_))));
        let too_large: Vec<u64> = vec![1, context.plain_modulus()];
        assert!(matches!(encoder.encode(&too_large), Err(BfvError::Encoding(_))));
        assert!(encoder.encode(&[]).is_ok());
    }
}

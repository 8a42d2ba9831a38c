pub mod ntt;

pub trait DFT<O>: Send + Sync {
    fn forward_inplace(&self, x: &mut [O]);
    fn backward_inplace(&self, x: &mut [O]);
}

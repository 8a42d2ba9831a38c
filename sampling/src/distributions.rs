use crate::source::Source;
use rand_distr::{Distribution, Normal, NormalError};

/// Standard deviation of the error distribution.
pub const DEFAULT_SIGMA: f64 = 3.2;

/// Samples are rejected beyond `DEFAULT_BOUND_FACTOR * sigma`.
pub const DEFAULT_BOUND_FACTOR: f64 = 6.0;

/// Rounded Gaussian truncated at a fixed number of standard deviations.
#[derive(Clone, Copy, Debug)]
pub struct TruncatedGaussian {
    normal: Normal<f64>,
    bound: f64,
}

impl TruncatedGaussian {
    pub fn new(sigma: f64, bound_factor: f64) -> Result<Self, NormalError> {
        Ok(Self {
            normal: Normal::new(0.0, sigma)?,
            bound: (sigma * bound_factor).floor(),
        })
    }

    /// Largest absolute value a sample can take.
    pub fn bound(&self) -> f64 {
        self.bound
    }

    pub fn sample_i64(&self, source: &mut Source) -> i64 {
        loop {
            let x: f64 = self.normal.sample(source).round();
            if x.abs() <= self.bound {
                return x as i64;
            }
        }
    }
}

/// Uniform draw in {-1, 0, 1}.
#[inline(always)]
pub fn ternary(source: &mut Source) -> i64 {
    source.next_u64n(3, 3) as i64 - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_respects_bound() {
        let gaussian: TruncatedGaussian =
            TruncatedGaussian::new(DEFAULT_SIGMA, DEFAULT_BOUND_FACTOR).unwrap();
        assert_eq!(gaussian.bound(), 19.0);
        let mut source: Source = Source::new([3u8; 32]);
        (0..4096).for_each(|_| assert!(gaussian.sample_i64(&mut source).abs() <= 19));
    }

    #[test]
    fn ternary_covers_all_values() {
        let mut source: Source = Source::new([4u8; 32]);
        let mut seen: [bool; 3] = [false; 3];
        (0..256).for_each(|_| seen[(ternary(&mut source) + 1) as usize] = true);
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    fn invalid_sigma_is_rejected() {
        assert!(TruncatedGaussian::new(f64::NAN, DEFAULT_BOUND_FACTOR).is_err());
    }
}

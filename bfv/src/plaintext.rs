use rns::poly::Poly;

/// Polynomial with coefficients mod t.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plaintext(pub Poly<u64>);

impl Plaintext {
    pub fn new(n: usize) -> Self {
        Self(Poly::new(n))
    }

    pub fn n(&self) -> usize {
        self.0.n()
    }
}

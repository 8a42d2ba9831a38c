#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Poly<O>(pub Vec<O>);

impl<O> Poly<O>
where
    O: Default + Clone + Copy,
{
    pub fn new(n: usize) -> Self {
        Self(vec![O::default(); n])
    }

    pub fn n(&self) -> usize {
        self.0.len()
    }

    pub fn log_n(&self) -> usize {
        (usize::BITS - (self.n() - 1).leading_zeros()) as _
    }

    pub fn zero(&mut self) {
        self.0.fill(O::default())
    }

    pub fn copy_from(&mut self, other: &Poly<O>) {
        assert!(
            self.n() == other.n(),
            "invalid other.n()={} != self.n()={}",
            other.n(),
            self.n()
        );
        self.0.copy_from_slice(&other.0)
    }

    pub fn as_slice(&self) -> &[O] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [O] {
        &mut self.0
    }
}

/// One [Poly] per modulus of an RNS basis.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PolyRNS<O>(pub Vec<Poly<O>>);

impl<O> PolyRNS<O>
where
    O: Default + Clone + Copy,
{
    pub fn new(n: usize, level: usize) -> Self {
        let mut polyrns: PolyRNS<O> = PolyRNS::<O>::default();
        let mut buf: Vec<Poly<O>> = (0..level + 1).map(|_| Poly::<O>::new(n)).collect();
        polyrns.0.append(&mut buf);
        polyrns
    }

    pub fn n(&self) -> usize {
        self.0[0].n()
    }

    pub fn log_n(&self) -> usize {
        self.0[0].log_n()
    }

    /// Index of the last limb.
    pub fn level(&self) -> usize {
        self.0.len() - 1
    }

    pub fn at(&self, level: usize) -> &Poly<O> {
        assert!(
            level <= self.level(),
            "invalid argument level: level={} > self.level()={}",
            level,
            self.level()
        );
        &self.0[level]
    }

    pub fn at_mut(&mut self, level: usize) -> &mut Poly<O> {
        assert!(
            level <= self.level(),
            "invalid argument level: level={} > self.level()={}",
            level,
            self.level()
        );
        &mut self.0[level]
    }

    pub fn zero(&mut self) {
        self.0.iter_mut().for_each(|poly| poly.zero());
    }

    pub fn copy_from(&mut self, other: &PolyRNS<O>) {
        assert!(
            self.level() == other.level(),
            "invalid other.level()={} != self.level()={}",
            other.level(),
            self.level()
        );
        self.0
            .iter_mut()
            .zip(other.0.iter())
            .for_each(|(a, b)| a.copy_from(b));
    }
}

use crate::estimate::BloomGeometry;
use murmur3::murmur3_32;

/// Bit-array bloom filter whose bits are the slots encrypted by the gateway.
///
/// Hash `i` of an item lands on `mmh3(item, seed = i) mod size`, with the
/// hash read as a signed 32-bit integer and the remainder taken non-negative,
/// so filters built here and by the sensors agree bit for bit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BloomFilter {
    geometry: BloomGeometry,
    bits: Vec<u64>,
}

impl BloomFilter {
    pub fn new(geometry: BloomGeometry) -> Self {
        assert!(geometry.size > 0, "invalid geometry: size=0");
        assert!(geometry.hash_count > 0, "invalid geometry: hash_count=0");
        Self {
            geometry,
            bits: vec![0; geometry.size],
        }
    }

    pub fn for_capacity(capacity: usize, fp_rate: f64) -> Self {
        Self::new(BloomGeometry::for_capacity(capacity, fp_rate))
    }

    pub fn geometry(&self) -> BloomGeometry {
        self.geometry
    }

    pub fn insert<T: AsRef<[u8]>>(&mut self, item: T) {
        let geometry: BloomGeometry = self.geometry;
        (0..geometry.hash_count).for_each(|i| {
            let pos: usize = position(item.as_ref(), i as u32, geometry.size);
            self.bits[pos] = 1;
        });
    }

    /// False positives are possible, false negatives are not.
    pub fn contains<T: AsRef<[u8]>>(&self, item: T) -> bool {
        (0..self.geometry.hash_count)
            .all(|i| self.bits[position(item.as_ref(), i as u32, self.geometry.size)] == 1)
    }

    /// The filter as a plain vector of 0/1 slots.
    pub fn as_slice(&self) -> &[u64] {
        &self.bits
    }

    pub fn set_bits(&self) -> u64 {
        self.bits.iter().sum()
    }

    pub fn estimated_items(&self) -> Option<u64> {
        self.geometry.cardinality(self.set_bits())
    }
}

fn mmh3(item: &[u8], seed: u32) -> i32 {
    let mut reader: &[u8] = item;
    // Reads from a slice never fail.
    murmur3_32(&mut reader, seed).unwrap_or_default() as i32
}

fn position(item: &[u8], seed: u32, size: usize) -> usize {
    (mmh3(item, seed) as i64).rem_euclid(size as i64) as usize
}

//! Byte format of keys and ciphertexts.
//!
//! Every blob starts with a fixed header:
//!
//! | bytes | field                                   |
//! |-------|-----------------------------------------|
//! | 4     | magic `BFVA`                            |
//! | 1     | format version                          |
//! | 1     | artifact kind                           |
//! | 8     | parameter fingerprint                   |
//! | 8     | key id of the consumer public key       |
//!
//! followed by a kind-specific body of little-endian integers. Polynomials
//! are written limb by limb, n u64 words per limb, and every word is checked
//! to be below its modulus when read back. Uniform key components are stored
//! as their 32-byte seed.

use crate::ciphertext::Ciphertext;
use crate::context::Context;
use crate::error::{BfvError, Result};
use crate::keys::{
    GaloisKeys, KeyId, KeySwitchKey, PublicKey, RelinearizationKey, SecretKey, expand_seed,
};
use crate::noise::NoiseModel;
use rns::poly::PolyRNS;
use utils::map::Map;

pub const MAGIC: [u8; 4] = *b"BFVA";
pub const VERSION: u8 = 1;

const HEADER_BYTES: usize = 4 + 1 + 1 + 8 + 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Kind {
    PublicKey = 1,
    SecretKey = 2,
    RelinearizationKey = 3,
    GaloisKeys = 4,
    Ciphertext = 5,
}

impl Kind {
    fn from_byte(b: u8) -> Option<Kind> {
        match b {
            1 => Some(Kind::PublicKey),
            2 => Some(Kind::SecretKey),
            3 => Some(Kind::RelinearizationKey),
            4 => Some(Kind::GaloisKeys),
            5 => Some(Kind::Ciphertext),
            _ => None,
        }
    }

    fn error(&self, msg: String) -> BfvError {
        match self {
            Kind::Ciphertext => BfvError::CiphertextDeserialization(msg),
            _ => BfvError::KeyDeserialization(msg),
        }
    }
}

struct Writer {
    bytes: Vec<u8>,
}

impl Writer {
    fn new(context: &Context, kind: Kind, key_id: KeyId) -> Self {
        let mut bytes: Vec<u8> = Vec::with_capacity(HEADER_BYTES);
        bytes.extend_from_slice(&MAGIC);
        bytes.push(VERSION);
        bytes.push(kind as u8);
        bytes.extend_from_slice(&context.fingerprint());
        bytes.extend_from_slice(&key_id.0);
        Self { bytes }
    }

    fn u8(&mut self, x: u8) {
        self.bytes.push(x)
    }

    fn u32(&mut self, x: u32) {
        self.bytes.extend_from_slice(&x.to_le_bytes())
    }

    fn u64(&mut self, x: u64) {
        self.bytes.extend_from_slice(&x.to_le_bytes())
    }

    fn f64(&mut self, x: f64) {
        self.bytes.extend_from_slice(&x.to_le_bytes())
    }

    fn raw(&mut self, x: &[u8]) {
        self.bytes.extend_from_slice(x)
    }

    fn polyrns(&mut self, a: &PolyRNS<u64>) {
        self.bytes.reserve(8 * a.n() * (a.level() + 1));
        a.0.iter()
            .flat_map(|poly| poly.0.iter())
            .for_each(|x| self.bytes.extend_from_slice(&x.to_le_bytes()));
    }

    fn key_switch_key(&mut self, ksk: &KeySwitchKey) {
        self.u32(ksk.digits() as u32);
        ksk.seeds.iter().zip(ksk.b.iter()).for_each(|(seed, b)| {
            self.raw(seed);
            self.polyrns(b);
        });
    }

    fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

struct Reader<'b> {
    bytes: &'b [u8],
    pos: usize,
    kind: Kind,
}

impl<'b> Reader<'b> {
    /// Validates the header and returns a reader positioned on the body.
    fn new(context: &Context, kind: Kind, bytes: &'b [u8]) -> Result<(Self, KeyId)> {
        let mut reader: Reader<'b> = Self {
            bytes,
            pos: 0,
            kind,
        };
        if reader.array::<4>()? != MAGIC {
            return Err(kind.error("bad magic".to_string()));
        }
        let version: u8 = reader.u8()?;
        if version != VERSION {
            return Err(kind.error(format!("unsupported format version {}", version)));
        }
        let found: u8 = reader.u8()?;
        if found != kind as u8 {
            let name: String = Kind::from_byte(found)
                .map(|k| format!("{:?}", k))
                .unwrap_or_else(|| format!("unknown kind {}", found));
            return Err(kind.error(format!("expected {:?}, found {}", kind, name)));
        }
        if reader.array::<8>()? != context.fingerprint() {
            return Err(kind.error(
                "parameter fingerprint does not match this context".to_string(),
            ));
        }
        let key_id: KeyId = KeyId(reader.array::<8>()?);
        Ok((reader, key_id))
    }

    fn take(&mut self, len: usize) -> Result<&'b [u8]> {
        let end: usize = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| {
                self.kind.error(format!(
                    "truncated input: need {} bytes at offset {}, have {}",
                    len,
                    self.pos,
                    self.bytes.len()
                ))
            })?;
        let bytes: &'b [u8] = self.bytes;
        let out: &'b [u8] = &bytes[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out: [u8; N] = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.array::<1>()?[0])
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array::<4>()?))
    }

    fn u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.array::<8>()?))
    }

    fn f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.array::<8>()?))
    }

    fn polyrns(&mut self, context: &Context) -> Result<PolyRNS<u64>> {
        let mut a: PolyRNS<u64> = context.ring_q.new_polyrns();
        for (i, (poly, ring)) in a.0.iter_mut().zip(context.ring_q.rings.iter()).enumerate() {
            let q: u64 = ring.modulus.q;
            let chunk: &[u8] = self.take(8 * poly.n())?;
            for (x, word) in poly.0.iter_mut().zip(chunk.chunks_exact(8)) {
                let mut buf: [u8; 8] = [0u8; 8];
                buf.copy_from_slice(word);
                *x = u64::from_le_bytes(buf);
                if *x >= q {
                    return Err(self.kind.error(format!(
                        "coefficient {} of limb {} is not below its modulus {}",
                        x, i, q
                    )));
                }
            }
        }
        Ok(a)
    }

    fn key_switch_key(&mut self, context: &Context) -> Result<KeySwitchKey> {
        let digits: usize = self.u32()? as usize;
        let want: usize = context.ring_q.level() + 1;
        if digits != want {
            return Err(self.kind.error(format!(
                "key switching key has {} digits, expected {}",
                digits, want
            )));
        }
        let mut seeds: Vec<[u8; 32]> = Vec::with_capacity(digits);
        let mut b: Vec<PolyRNS<u64>> = Vec::with_capacity(digits);
        let mut a: Vec<PolyRNS<u64>> = Vec::with_capacity(digits);
        for _ in 0..digits {
            let seed: [u8; 32] = self.array::<32>()?;
            b.push(self.polyrns(context)?);
            a.push(expand_seed(context, seed));
            seeds.push(seed);
        }
        Ok(KeySwitchKey { seeds, b, a })
    }

    fn finish(self) -> Result<()> {
        if self.pos != self.bytes.len() {
            return Err(self.kind.error(format!(
                "{} trailing bytes",
                self.bytes.len() - self.pos
            )));
        }
        Ok(())
    }
}

impl PublicKey {
    pub fn to_bytes(&self, context: &Context) -> Vec<u8> {
        let mut w: Writer = Writer::new(context, Kind::PublicKey, self.key_id);
        w.raw(&self.seed);
        w.polyrns(&self.p0);
        w.finish()
    }

    pub fn from_bytes(context: &Context, bytes: &[u8]) -> Result<Self> {
        let (mut r, key_id) = Reader::new(context, Kind::PublicKey, bytes)?;
        let seed: [u8; 32] = r.array::<32>()?;
        let p0: PolyRNS<u64> = r.polyrns(context)?;
        r.finish()?;
        if KeyId::derive(context, &seed, &p0) != key_id {
            return Err(BfvError::KeyDeserialization(
                "key id does not match the key material".to_string(),
            ));
        }
        Ok(Self {
            key_id,
            seed,
            p0,
            p1: expand_seed(context, seed),
        })
    }
}

impl SecretKey {
    pub fn to_bytes(&self, context: &Context) -> Vec<u8> {
        let mut w: Writer = Writer::new(context, Kind::SecretKey, self.key_id);
        self.values.iter().for_each(|&v| w.u8((v + 1) as u8));
        w.finish()
    }

    pub fn from_bytes(context: &Context, bytes: &[u8]) -> Result<Self> {
        let (mut r, key_id) = Reader::new(context, Kind::SecretKey, bytes)?;
        let raw: &[u8] = r.take(context.n())?;
        let values: Vec<i64> = raw
            .iter()
            .map(|&b| match b {
                0..=2 => Ok(b as i64 - 1),
                _ => Err(BfvError::KeyDeserialization(format!(
                    "invalid ternary coefficient {}",
                    b
                ))),
            })
            .collect::<Result<Vec<i64>>>()?;
        r.finish()?;
        Ok(SecretKey::from_values(context, key_id, values))
    }
}

impl RelinearizationKey {
    pub fn to_bytes(&self, context: &Context) -> Vec<u8> {
        let mut w: Writer = Writer::new(context, Kind::RelinearizationKey, self.key_id);
        w.key_switch_key(&self.key);
        w.finish()
    }

    pub fn from_bytes(context: &Context, bytes: &[u8]) -> Result<Self> {
        let (mut r, key_id) = Reader::new(context, Kind::RelinearizationKey, bytes)?;
        let key: KeySwitchKey = r.key_switch_key(context)?;
        r.finish()?;
        Ok(Self { key_id, key })
    }
}

impl GaloisKeys {
    /// Keys are written in increasing Galois element order.
    pub fn to_bytes(&self, context: &Context) -> Vec<u8> {
        let mut w: Writer = Writer::new(context, Kind::GaloisKeys, self.key_id);
        let elements: Vec<usize> = self.galois_elements();
        w.u32(elements.len() as u32);
        for gal_el in elements {
            if let Some(ksk) = self.keys.get(&gal_el) {
                w.u64(gal_el as u64);
                w.key_switch_key(ksk);
            }
        }
        w.finish()
    }

    pub fn from_bytes(context: &Context, bytes: &[u8]) -> Result<Self> {
        let (mut r, key_id) = Reader::new(context, Kind::GaloisKeys, bytes)?;
        let count: usize = r.u32()? as usize;
        let cyclotomic_order: u64 = 2 * context.n() as u64;
        let mut keys: Map<usize, KeySwitchKey> = Map::new();
        for _ in 0..count {
            let gal_el: u64 = r.u64()?;
            if gal_el & 1 == 0 || gal_el >= cyclotomic_order {
                return Err(BfvError::KeyDeserialization(format!(
                    "invalid galois element {}",
                    gal_el
                )));
            }
            let ksk: KeySwitchKey = r.key_switch_key(context)?;
            if keys.insert(gal_el as usize, ksk).is_some() {
                return Err(BfvError::KeyDeserialization(format!(
                    "duplicate galois element {}",
                    gal_el
                )));
            }
        }
        r.finish()?;
        Ok(Self { key_id, keys })
    }
}

impl Ciphertext {
    pub fn to_bytes(&self, context: &Context) -> Vec<u8> {
        let mut w: Writer = Writer::new(context, Kind::Ciphertext, self.key_id);
        w.f64(self.noise);
        w.u8(self.parts.len() as u8);
        self.parts.iter().for_each(|part| w.polyrns(part));
        w.finish()
    }

    pub fn from_bytes(context: &Context, bytes: &[u8]) -> Result<Self> {
        let (mut r, key_id) = Reader::new(context, Kind::Ciphertext, bytes)?;
        let noise: f64 = r.f64()?;
        if !noise.is_finite() || noise < 0.0 {
            return Err(BfvError::CiphertextDeserialization(format!(
                "invalid noise estimate {}",
                noise
            )));
        }
        let size: usize = r.u8()? as usize;
        if !(2..=3).contains(&size) {
            return Err(BfvError::CiphertextDeserialization(format!(
                "invalid ciphertext size {}",
                size
            )));
        }
        let parts: Vec<PolyRNS<u64>> = (0..size)
            .map(|_| r.polyrns(context))
            .collect::<Result<Vec<PolyRNS<u64>>>>()?;
        r.finish()?;
        // The stored estimate is only a hint: never below what a fresh
        // encryption (or a product of two) carries.
        let model: &NoiseModel = context.noise_model();
        let floor: f64 = match size {
            2 => model.fresh(),
            _ => model.multiply(model.fresh(), model.fresh()),
        };
        Ok(Self {
            parts,
            noise: noise.max(floor),
            key_id,
        })
    }
}

//! Residue-number-system polynomial arithmetic over `Z_q[X]/(X^n + 1)`.
//!
//! A [ring::RingRNS] is a product of [ring::Ring]s, one per NTT-friendly
//! prime. Polynomials are stored limb by limb in [poly::PolyRNS] and can be
//! moved in and out of the NTT domain, multiplied, permuted by Galois
//! automorphisms and lifted to big integers through [crt::CrtBasis].

pub mod automorphism;
pub mod bigint;
pub mod crt;
pub mod dft;
pub mod modulus;
pub mod poly;
pub mod ring;

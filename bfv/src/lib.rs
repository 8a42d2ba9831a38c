//! Batched BFV over an RNS coefficient modulus.
//!
//! The crate covers the full lifecycle of the encrypted vectors the
//! aggregation service works on: parameter validation ([parameters]),
//! the shared immutable [context::Context], slot encoding, key generation,
//! encryption, homomorphic multiplication with relinearization, slot
//! rotations and the rotate-and-sum reduction, consumer-side decryption, and
//! the byte format of every artifact ([serialization]).

pub mod ciphertext;
pub mod context;
pub mod decryptor;
pub mod encoder;
pub mod encryptor;
pub mod error;
pub mod evaluator;
pub mod key_generator;
pub mod key_switching;
pub mod keys;
pub mod noise;
pub mod parameters;
pub mod plaintext;
pub mod serialization;

pub use error::{BfvError, Result};

//! MiMC7 compression over the BN254 scalar field.
//!
//! The round constants are derived once per instance from a Keccak256
//! chain seeded with the ASCII string `"mimc"`, each digest interpreted
//! as a big-endian integer and reduced into the field. This matches the
//! constant schedule used by the arithmetic-circuit verifier, so a root
//! computed here and a root computed inside the circuit agree bit for
//! bit.
//!
//! Deriving the constants costs 91 Keccak256 calls. Build one [`Mimc7`]
//! per process and pass it by reference wherever hashing is needed.

#![warn(missing_docs)]

use ark_bn254::Fr;
use ark_ff::PrimeField;
use sha3::{Digest, Keccak256};

/// Number of `x^7` rounds in the MiMC7 permutation.
pub const ROUNDS: usize = 91;

/// Seed for the Keccak256 round-constant chain.
const CONSTANT_SEED: &[u8] = b"mimc";

/// The MiMC7 hash with its precomputed round-constant table.
#[derive(Debug, Clone)]
pub struct Mimc7 {
    round_constants: Vec<Fr>,
}

impl Mimc7 {
    /// Build an instance, deriving the round constants.
    ///
    /// `c_0` is zero (the first round adds no constant); `c_i` for
    /// `i >= 1` is the `i`-th digest of the Keccak256 chain over the
    /// seed, reduced modulo the field order.
    pub fn new() -> Self {
        let mut round_constants = Vec::with_capacity(ROUNDS);
        round_constants.push(Fr::from(0u64));
        let mut digest = Keccak256::digest(CONSTANT_SEED);
        for _ in 1..ROUNDS {
            digest = Keccak256::digest(digest.as_slice());
            round_constants.push(Fr::from_be_bytes_mod_order(digest.as_slice()));
        }
        Mimc7 { round_constants }
    }

    /// The round-constant table, for cross-checking against the
    /// schedule compiled into the verifier circuit.
    pub fn round_constants(&self) -> &[Fr] {
        &self.round_constants
    }

    /// Compress two field elements into one.
    ///
    /// Round 0 computes `r = (x_in + k)^7`; rounds 1..91 compute
    /// `r = (r + k + c_i)^7`; the result is `r + k`. Deterministic and
    /// order-sensitive: `hash(a, b) != hash(b, a)` in general.
    pub fn hash(&self, x_in: Fr, k: Fr) -> Fr {
        let mut r = pow7(x_in + k);
        for c in &self.round_constants[1..] {
            r = pow7(r + k + c);
        }
        r + k
    }

    /// Absorb a sequence of field elements under a running key.
    ///
    /// Starting from `key`, each element updates the state as
    /// `r = r + x + hash(x, r)`. Used for circuit inputs wider than one
    /// compression, e.g. committing an address alongside content.
    pub fn multi_hash(&self, values: &[Fr], key: Fr) -> Fr {
        let mut r = key;
        for &x in values {
            r = r + x + self.hash(x, r);
        }
        r
    }
}

impl Default for Mimc7 {
    fn default() -> Self {
        Self::new()
    }
}

/// `t^7` via two squarings and two multiplications.
fn pow7(t: Fr) -> Fr {
    let t2 = t * t;
    let t4 = t2 * t2;
    t4 * t2 * t
}

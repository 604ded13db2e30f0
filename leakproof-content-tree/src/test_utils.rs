//! Shared helpers for the crate's tests.

use std::cell::Cell;
use std::sync::OnceLock;

use ark_bn254::Fr;
use leakproof_mimc::Mimc7;

use crate::NodeHasher;

static MIMC: OnceLock<Mimc7> = OnceLock::new();

/// Process-wide hash instance; constant derivation runs once.
pub(crate) fn mimc() -> &'static Mimc7 {
    MIMC.get_or_init(Mimc7::new)
}

/// Deterministic leaf values `1..=n` (zero is reserved for padding, so
/// semantic leaves are kept nonzero).
pub(crate) fn leaves(n: usize) -> Vec<Fr> {
    (1..=n as u64).map(Fr::from).collect()
}

/// Hasher wrapper that counts merge invocations.
pub(crate) struct CountingHasher<'a> {
    inner: &'a Mimc7,
    calls: Cell<usize>,
}

impl<'a> CountingHasher<'a> {
    pub(crate) fn new(inner: &'a Mimc7) -> Self {
        CountingHasher {
            inner,
            calls: Cell::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl NodeHasher for CountingHasher<'_> {
    fn merge(&self, left: Fr, right: Fr) -> Fr {
        self.calls.set(self.calls.get() + 1);
        self.inner.merge(left, right)
    }
}

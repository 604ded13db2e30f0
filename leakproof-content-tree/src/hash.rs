use ark_bn254::Fr;
use leakproof_mimc::Mimc7;

/// Two-input compression used to combine sibling nodes.
///
/// Implementations must be deterministic and order-sensitive, and must
/// match the compression the external proof circuit applies, or the
/// reconstructed root will never equal the circuit's.
pub trait NodeHasher {
    /// Combine a left and a right child value into their parent value.
    fn merge(&self, left: Fr, right: Fr) -> Fr;
}

impl NodeHasher for Mimc7 {
    fn merge(&self, left: Fr, right: Fr) -> Fr {
        self.hash(left, right)
    }
}

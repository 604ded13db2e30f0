//! Root reconstruction for a contiguous leaf range.
//!
//! This is the routine the external arithmetic circuit implements
//! identically: given a run of adjacent leaf values anchored at known
//! generalized indices, plus the audit path for that run, it recomputes
//! the root using only pairwise hashing, never the full tree. It reads
//! only the path levels' depth tags and value order, so a circuit
//! without index wires can follow the exact same steps.

use std::collections::VecDeque;

use ark_bn254::Fr;

use crate::{
    ContentTreeError, MultiProof, NodeHasher, Result,
    index::{GeneralizedIndex, depth_of},
    proof::ProofLevel,
};

/// A contiguous run of leaf values anchored at generalized indices.
///
/// Invariants, enforced at construction: `first <= last`, both at the
/// same depth, and `last - first + 1` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSegment {
    first: GeneralizedIndex,
    last: GeneralizedIndex,
    values: Vec<Fr>,
}

impl LeafSegment {
    /// Validate and assemble a segment.
    pub fn new(first: GeneralizedIndex, last: GeneralizedIndex, values: Vec<Fr>) -> Result<Self> {
        if first == 0 || last < first {
            return Err(ContentTreeError::IndexOutOfRange(format!(
                "[{}, {}] is not a leaf range",
                first, last
            )));
        }
        let first_depth = depth_of(first)?;
        let last_depth = depth_of(last)?;
        if first_depth != last_depth {
            return Err(ContentTreeError::IndexDepthMismatch {
                found: last_depth,
                expected: first_depth,
            });
        }
        let expected = last - first + 1;
        if values.len() as u64 != expected {
            return Err(ContentTreeError::InvalidRangeLength {
                first,
                last,
                values: values.len(),
                expected,
            });
        }
        Ok(LeafSegment { first, last, values })
    }

    /// Generalized index of the run's first leaf.
    pub fn first(&self) -> GeneralizedIndex {
        self.first
    }

    /// Generalized index of the run's last leaf.
    pub fn last(&self) -> GeneralizedIndex {
        self.last
    }

    /// The leaf values, in leaf order.
    pub fn values(&self) -> &[Fr] {
        &self.values
    }

    /// Depth both endpoints sit at.
    pub fn depth(&self) -> u32 {
        // first >= 1 is a construction invariant, so ilog2 is defined.
        self.first.ilog2()
    }
}

/// Recompute the root from a contiguous segment and its audit path.
///
/// Walks from the leaf level to depth 0. At each level, when the first
/// index is a right child the level's next unconsumed sibling is pulled
/// in front of the working values, and when the last index is a left
/// child the next unconsumed sibling is appended; adjacent pairs are
/// then combined with `hasher` and both endpoints promote to their
/// parents. Siblings are consumed in the ascending order the generator
/// emits.
///
/// For the same tree, positions, and hasher, the result equals
/// [`ContentTree::root`](crate::ContentTree::root).
pub fn generate_root<H: NodeHasher>(
    segment: &LeafSegment,
    proof: &MultiProof,
    height: u32,
    hasher: &H,
) -> Result<Fr> {
    if segment.depth() != height {
        return Err(ContentTreeError::IndexDepthMismatch {
            found: segment.depth(),
            expected: height,
        });
    }
    let mut first = segment.first();
    let mut last = segment.last();
    let mut layer: VecDeque<Fr> = segment.values().iter().copied().collect();

    for depth in (1..=height).rev() {
        let level = proof.level_at_depth(depth);
        let mut consumed = 0usize;
        if first % 2 == 1 {
            layer.push_front(next_sibling(level, &mut consumed, depth)?);
            first -= 1;
        }
        if last % 2 == 0 {
            layer.push_back(next_sibling(level, &mut consumed, depth)?);
            last += 1;
        }
        // The span [first, last] now covers whole sibling pairs, so the
        // working layer has even length.
        let mut parents = VecDeque::with_capacity(layer.len() / 2);
        while let (Some(left), Some(right)) = (layer.pop_front(), layer.pop_front()) {
            parents.push_back(hasher.merge(left, right));
        }
        layer = parents;
        first /= 2;
        last /= 2;
    }

    layer.pop_front().ok_or(ContentTreeError::RootNotFound)
}

fn next_sibling(level: Option<&ProofLevel>, consumed: &mut usize, depth: u32) -> Result<Fr> {
    let level = level.ok_or(ContentTreeError::AuditPathUnderrun { depth })?;
    let node = level
        .siblings()
        .get(*consumed)
        .ok_or(ContentTreeError::AuditPathUnderrun { depth })?;
    *consumed += 1;
    Ok(node.value())
}

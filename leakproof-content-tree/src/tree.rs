use ark_bn254::Fr;

use crate::{
    ContentTreeError, NodeHasher, Result,
    index::{GeneralizedIndex, MAX_DEPTH, generalized_index},
    reconstruct::LeafSegment,
};

/// A complete binary Merkle tree committing to an ordered sequence of
/// field-element leaves.
///
/// The leaf sequence is zero-padded to the next power of two and every
/// node, leaves included, is stored in a flat arena indexed by
/// `generalized_index - 1`, giving O(1) lookup for proof generation.
/// The tree is immutable once built; any content change requires a full
/// rebuild.
#[derive(Debug, Clone)]
pub struct ContentTree {
    height: u32,
    leaf_count: usize,
    nodes: Vec<Fr>,
}

impl ContentTree {
    /// Build a tree over `leaves`, combining siblings with `hasher`.
    ///
    /// `height = ceil(log2(leaves.len()))`; the sequence is padded with
    /// zero-valued leaves up to `2^height`, preserving order. A single
    /// leaf produces a height-0 tree whose root is that leaf, with no
    /// hashing. An empty sequence fails with
    /// [`ContentTreeError::EmptyInput`].
    pub fn build<H: NodeHasher>(leaves: &[Fr], hasher: &H) -> Result<Self> {
        if leaves.is_empty() {
            return Err(ContentTreeError::EmptyInput);
        }
        let height = leaves.len().next_power_of_two().ilog2();
        if height > MAX_DEPTH {
            return Err(ContentTreeError::IndexOutOfRange(format!(
                "{} leaves need height {}, above maximum {}",
                leaves.len(),
                height,
                MAX_DEPTH
            )));
        }
        let padded = 1usize << height;
        let mut nodes = vec![Fr::from(0u64); 2 * padded - 1];
        nodes[padded - 1..padded - 1 + leaves.len()].copy_from_slice(leaves);
        // Children of k sit at generalized indices 2k and 2k+1, i.e.
        // arena slots 2k-1 and 2k.
        for k in (1..padded).rev() {
            nodes[k - 1] = hasher.merge(nodes[2 * k - 1], nodes[2 * k]);
        }
        Ok(ContentTree {
            height,
            leaf_count: leaves.len(),
            nodes,
        })
    }

    /// Build a tree over raw byte content, one leaf per byte.
    ///
    /// This is the shape produced by the upstream email-content
    /// extraction step: the verified body bytes, in order.
    pub fn from_bytes<H: NodeHasher>(content: &[u8], hasher: &H) -> Result<Self> {
        let leaves: Vec<Fr> = content.iter().map(|b| Fr::from(u64::from(*b))).collect();
        Self::build(&leaves, hasher)
    }

    /// Number of levels between the leaves and the root; leaves live at
    /// depth `height()`.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of semantic leaves the tree was built from, excluding
    /// zero padding.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Number of leaf slots after padding: `2^height`.
    pub fn padded_leaf_count(&self) -> u64 {
        1u64 << self.height
    }

    /// The root value (generalized index 1).
    ///
    /// Fails with [`ContentTreeError::RootNotFound`] if the arena is
    /// empty, which a correctly built tree never is.
    pub fn root(&self) -> Result<Fr> {
        self.nodes.first().copied().ok_or(ContentTreeError::RootNotFound)
    }

    /// The value stored at a generalized index, anywhere in the tree.
    pub fn node(&self, index: GeneralizedIndex) -> Result<Fr> {
        if index == 0 || index > self.nodes.len() as u64 {
            return Err(ContentTreeError::IndexOutOfRange(format!(
                "index {} outside arena of {} nodes",
                index,
                self.nodes.len()
            )));
        }
        Ok(self.nodes[(index - 1) as usize])
    }

    /// Extract the contiguous run of `len` leaves starting at leaf
    /// offset `offset`, anchored at its generalized indices.
    ///
    /// This is the segment callers pass to the circuit together with
    /// the matching multiproof.
    pub fn extract_segment(&self, offset: u64, len: u64) -> Result<LeafSegment> {
        if len == 0 {
            return Err(ContentTreeError::EmptyInput);
        }
        let end = offset.checked_add(len).ok_or_else(|| {
            ContentTreeError::IndexOutOfRange(format!(
                "segment [{}, ..) of length {} overflows",
                offset, len
            ))
        })?;
        if end > self.padded_leaf_count() {
            return Err(ContentTreeError::IndexOutOfRange(format!(
                "segment [{}, {}) exceeds {} leaf slots",
                offset,
                end,
                self.padded_leaf_count()
            )));
        }
        let first = generalized_index(offset, self.height)?;
        let last = first + len - 1;
        let values = (first..=last)
            .map(|k| self.node(k))
            .collect::<Result<Vec<_>>>()?;
        LeafSegment::new(first, last, values)
    }
}

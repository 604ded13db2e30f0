//! Multiproof generation for the content tree.
//!
//! A multiproof carries, per level, the sibling values needed to walk a
//! set of leaves up to the root. Proving the leaves marked `t` in an
//! eight-leaf tree only requires supplying the nodes marked `s`:
//!
//! ```text
//!          .
//!      .       .
//!    .   s   s   .
//!   t t . . . . t s
//! ```
//!
//! When a sibling pair lands on two target paths, neither side needs
//! external data (the parent follows from target values alone), so the
//! pair is eliminated; levels left empty by elimination are dropped.

use std::collections::{BTreeMap, BTreeSet};

use ark_bn254::Fr;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::{
    ContentTree, ContentTreeError, Result,
    index::{GeneralizedIndex, MAX_DEPTH, depth_of, generalized_index, parent_of, sibling_of},
};

/// Serialized width of one field element.
const FIELD_BYTES: usize = 32;

/// Cap on siblings per decoded level, against absurd allocations from
/// corrupt length prefixes.
const MAX_SIBLINGS_PER_LEVEL: u32 = 1 << 20;

/// A sibling node supplied by a multiproof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofNode {
    pub(crate) index: GeneralizedIndex,
    pub(crate) value: Fr,
}

impl ProofNode {
    /// The sibling's generalized index.
    pub fn index(&self) -> GeneralizedIndex {
        self.index
    }

    /// The sibling's node value.
    pub fn value(&self) -> Fr {
        self.value
    }
}

/// One level of a multiproof: the external siblings needed at `depth`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofLevel {
    pub(crate) depth: u32,
    /// Siblings in ascending generalized-index order. Reconstruction
    /// consumes them in this order; both sides rely on it.
    pub(crate) siblings: Vec<ProofNode>,
}

impl ProofLevel {
    /// Depth the siblings belong to (leaves = tree height).
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The siblings, in ascending generalized-index order.
    pub fn siblings(&self) -> &[ProofNode] {
        &self.siblings
    }
}

/// The audit path for a set of leaf positions: levels ordered from the
/// leaf level upward, root level excluded, empty levels dropped.
///
/// Fields are `pub(crate)` so proofs cannot be hand-assembled around
/// [`ContentTree::multi_proof`]; decode paths revalidate everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiProof {
    pub(crate) levels: Vec<ProofLevel>,
}

impl MultiProof {
    /// The proof's levels, deepest first.
    pub fn levels(&self) -> &[ProofLevel] {
        &self.levels
    }

    /// The level holding siblings for `depth`, if any survived
    /// elimination there.
    pub fn level_at_depth(&self, depth: u32) -> Option<&ProofLevel> {
        self.levels.iter().find(|level| level.depth == depth)
    }

    /// Total number of sibling values across all levels.
    pub fn sibling_count(&self) -> usize {
        self.levels.iter().map(|level| level.siblings.len()).sum()
    }

    /// Encode to bytes.
    ///
    /// Format, all integers big-endian:
    /// `level_count(4)`, then per level `depth(4) sibling_count(4)`
    /// followed by `index(8) value(32)` per sibling. Values use the
    /// canonical little-endian field encoding the circuit consumes.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(4 + self.levels.len() * 8 + self.sibling_count() * 40);
        buf.extend_from_slice(&(self.levels.len() as u32).to_be_bytes());
        for level in &self.levels {
            buf.extend_from_slice(&level.depth.to_be_bytes());
            buf.extend_from_slice(&(level.siblings.len() as u32).to_be_bytes());
            for node in &level.siblings {
                buf.extend_from_slice(&node.index.to_be_bytes());
                node.value.serialize_compressed(&mut buf).map_err(|e| {
                    ContentTreeError::InvalidData(format!("value encode error: {}", e))
                })?;
            }
        }
        Ok(buf)
    }

    /// Decode from bytes, revalidating the generation invariants.
    ///
    /// Rejects truncated or trailing bytes, non-canonical field
    /// encodings, depths of zero or beyond the supported maximum,
    /// non-descending level depths, siblings out of ascending index
    /// order, and siblings whose index does not belong to their level's
    /// depth.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(bytes);
        let level_count = reader.read_u32()?;
        if level_count > MAX_DEPTH {
            return Err(ContentTreeError::InvalidData(format!(
                "{} levels exceed maximum depth {}",
                level_count, MAX_DEPTH
            )));
        }
        let mut levels = Vec::with_capacity(level_count as usize);
        let mut previous_depth: Option<u32> = None;
        for _ in 0..level_count {
            let depth = reader.read_u32()?;
            if depth == 0 || depth > MAX_DEPTH {
                return Err(ContentTreeError::InvalidData(format!(
                    "level depth {} outside 1..={}",
                    depth, MAX_DEPTH
                )));
            }
            if let Some(previous) = previous_depth {
                if depth >= previous {
                    return Err(ContentTreeError::InvalidData(format!(
                        "level depth {} does not descend below {}",
                        depth, previous
                    )));
                }
            }
            previous_depth = Some(depth);
            let sibling_count = reader.read_u32()?;
            if sibling_count == 0 {
                return Err(ContentTreeError::InvalidData(format!(
                    "empty level at depth {}",
                    depth
                )));
            }
            if sibling_count > MAX_SIBLINGS_PER_LEVEL {
                return Err(ContentTreeError::InvalidData(format!(
                    "{} siblings at depth {} exceed the per-level cap",
                    sibling_count, depth
                )));
            }
            let mut siblings = Vec::with_capacity(sibling_count as usize);
            let mut previous_index: Option<GeneralizedIndex> = None;
            for _ in 0..sibling_count {
                let index = reader.read_u64()?;
                if depth_of(index).ok() != Some(depth) {
                    return Err(ContentTreeError::InvalidData(format!(
                        "sibling index {} is not at depth {}",
                        index, depth
                    )));
                }
                if let Some(previous) = previous_index {
                    if index <= previous {
                        return Err(ContentTreeError::InvalidData(format!(
                            "sibling index {} not in ascending order after {}",
                            index, previous
                        )));
                    }
                }
                previous_index = Some(index);
                let value = Fr::deserialize_compressed(reader.read_slice(FIELD_BYTES)?)
                    .map_err(|e| {
                        ContentTreeError::InvalidData(format!("value decode error: {}", e))
                    })?;
                siblings.push(ProofNode { index, value });
            }
            levels.push(ProofLevel { depth, siblings });
        }
        reader.finish()?;
        Ok(MultiProof { levels })
    }
}

impl ContentTree {
    /// Compute the audit path for a set of leaf offsets.
    ///
    /// Duplicates are deduplicated. Every offset must fall inside the
    /// padded leaf range, or the call fails with
    /// [`ContentTreeError::IndexOutOfRange`]; an empty position set
    /// fails with [`ContentTreeError::EmptyInput`].
    ///
    /// The returned path is the minimal sibling set sufficient to
    /// reconstruct the root for exactly the requested positions.
    pub fn multi_proof(&self, positions: &[u64]) -> Result<MultiProof> {
        if positions.is_empty() {
            return Err(ContentTreeError::EmptyInput);
        }
        let mut sibling_sets: BTreeMap<u32, BTreeSet<GeneralizedIndex>> = BTreeMap::new();
        for &position in positions {
            if position >= self.padded_leaf_count() {
                return Err(ContentTreeError::IndexOutOfRange(format!(
                    "position {} outside {} leaf slots",
                    position,
                    self.padded_leaf_count()
                )));
            }
            let mut node = generalized_index(position, self.height())?;
            while node > 1 {
                let depth = depth_of(node)?;
                sibling_sets.entry(depth).or_default().insert(sibling_of(node)?);
                node = parent_of(node)?;
            }
        }

        // Pairwise elimination: when a left sibling and its right
        // neighbour are both recorded, both lie on target paths and
        // their parent needs no external data at this level.
        for set in sibling_sets.values_mut() {
            let left_siblings: Vec<GeneralizedIndex> =
                set.iter().copied().filter(|k| k % 2 == 0).collect();
            for k in left_siblings {
                if set.contains(&(k + 1)) {
                    set.remove(&k);
                    set.remove(&(k + 1));
                }
            }
        }

        // Emit leaf level first; BTreeSet iteration yields ascending
        // indices, which is the ordering contract consumers rely on.
        let mut levels = Vec::new();
        for (depth, set) in sibling_sets.into_iter().rev() {
            if set.is_empty() {
                continue;
            }
            let siblings = set
                .into_iter()
                .map(|index| {
                    Ok(ProofNode {
                        index,
                        value: self.node(index)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            levels.push(ProofLevel { depth, siblings });
        }
        Ok(MultiProof { levels })
    }
}

/// Cursor over proof bytes with truncation-checked reads.
struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        ByteReader { bytes, offset: 0 }
    }

    fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.offset.checked_add(len).ok_or_else(|| {
            ContentTreeError::InvalidData("length overflow in proof data".to_string())
        })?;
        let slice = self.bytes.get(self.offset..end).ok_or_else(|| {
            ContentTreeError::InvalidData(format!(
                "truncated proof data: wanted {} bytes at offset {}, have {}",
                len,
                self.offset,
                self.bytes.len()
            ))
        })?;
        self.offset = end;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_slice(4)?;
        bytes
            .try_into()
            .map(u32::from_be_bytes)
            .map_err(|_| ContentTreeError::InvalidData("bad u32 bytes".to_string()))
    }

    fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.read_slice(8)?;
        bytes
            .try_into()
            .map(u64::from_be_bytes)
            .map_err(|_| ContentTreeError::InvalidData("bad u64 bytes".to_string()))
    }

    fn finish(&self) -> Result<()> {
        if self.offset != self.bytes.len() {
            return Err(ContentTreeError::InvalidData(format!(
                "{} trailing bytes after proof data",
                self.bytes.len() - self.offset
            )));
        }
        Ok(())
    }
}

//! Generalized-index arithmetic for a complete binary tree.
//!
//! A node at horizontal offset `x` and depth `y` (root = depth 0) has
//! the generalized index `2^y + x`:
//!
//! ```text
//!         1
//!      2     3
//!    4   5 6   7
//! ```
//!
//! Indices are unique across the whole tree, the parent of `k` is
//! `k / 2`, and the sibling of `k` is `k ^ 1`. Leaves of a tree of
//! height `h` live at depth `h`, occupying `2^h ..= 2^(h+1) - 1`.

use crate::{ContentTreeError, Result};

/// A node's generalized index: `2^depth + offset`, root = 1.
pub type GeneralizedIndex = u64;

/// Maximum supported tree depth.
///
/// Keeps every index well inside `u64` and bounds arena allocations;
/// depth 32 already covers four billion leaves, far beyond any email
/// body.
pub const MAX_DEPTH: u32 = 32;

/// Compute the generalized index of the node at `offset` within depth
/// `depth`.
///
/// Fails with [`ContentTreeError::IndexOutOfRange`] when `depth`
/// exceeds [`MAX_DEPTH`] or `offset >= 2^depth`, rather than returning
/// a malformed index.
pub fn generalized_index(offset: u64, depth: u32) -> Result<GeneralizedIndex> {
    if depth > MAX_DEPTH {
        return Err(ContentTreeError::IndexOutOfRange(format!(
            "depth {} exceeds maximum {}",
            depth, MAX_DEPTH
        )));
    }
    let width = 1u64 << depth;
    if offset >= width {
        return Err(ContentTreeError::IndexOutOfRange(format!(
            "offset {} does not fit depth {} (width {})",
            offset, depth, width
        )));
    }
    Ok(width + offset)
}

/// The parent of `index`. Fails for the root and for index 0.
pub fn parent_of(index: GeneralizedIndex) -> Result<GeneralizedIndex> {
    if index <= 1 {
        return Err(ContentTreeError::IndexOutOfRange(format!(
            "index {} has no parent",
            index
        )));
    }
    Ok(index / 2)
}

/// The sibling of `index`: `index - 1` for a right child, `index + 1`
/// for a left child. Fails for the root and for index 0.
pub fn sibling_of(index: GeneralizedIndex) -> Result<GeneralizedIndex> {
    if index <= 1 {
        return Err(ContentTreeError::IndexOutOfRange(format!(
            "index {} has no sibling",
            index
        )));
    }
    Ok(index ^ 1)
}

/// The depth encoded by `index`: `floor(log2(index))`. Fails for 0.
pub fn depth_of(index: GeneralizedIndex) -> Result<u32> {
    if index == 0 {
        return Err(ContentTreeError::IndexOutOfRange(
            "0 is not a generalized index".to_string(),
        ));
    }
    Ok(index.ilog2())
}

/// The horizontal offset of `index` within its depth. Fails for 0.
pub fn offset_of(index: GeneralizedIndex) -> Result<u64> {
    let depth = depth_of(index)?;
    Ok(index - (1u64 << depth))
}

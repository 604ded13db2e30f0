use thiserror::Error;

/// Alias for `core::result::Result<T, ContentTreeError>`.
pub type Result<T> = core::result::Result<T, ContentTreeError>;

/// Errors from content tree construction, proving, and reconstruction.
///
/// Every violated invariant surfaces as its own variant before any data
/// is produced; there is no partial-success mode and nothing is
/// recovered silently.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContentTreeError {
    /// Tried to build a tree or a segment from an empty sequence.
    #[error("empty input sequence")]
    EmptyInput,
    /// A position or generalized index fell outside the tree's range.
    #[error("index out of range: {0}")]
    IndexOutOfRange(String),
    /// The node arena has no root slot (construction invariant violated).
    #[error("root not found in node arena")]
    RootNotFound,
    /// A segment's value count disagrees with its index range.
    #[error("segment holds {values} values but [{first}, {last}] spans {expected}")]
    InvalidRangeLength {
        /// First generalized index of the range.
        first: u64,
        /// Last generalized index of the range.
        last: u64,
        /// Number of values supplied.
        values: usize,
        /// Number of values the range implies.
        expected: u64,
    },
    /// An audit-path level was missing or ran out of siblings.
    #[error("audit path underrun at depth {depth}")]
    AuditPathUnderrun {
        /// Depth whose sibling supply was exhausted.
        depth: u32,
    },
    /// Segment endpoints are not at the tree's leaf depth.
    #[error("index depth {found} does not match leaf depth {expected}")]
    IndexDepthMismatch {
        /// Depth encoded by the offending index.
        found: u32,
        /// Leaf depth the operation expected.
        expected: u32,
    },
    /// Malformed proof bytes (truncation, corruption, non-canonical
    /// field encodings).
    #[error("invalid proof data: {0}")]
    InvalidData(String),
}

//! Fixed-boundary block deduplication.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use tracing::debug;

use crate::error::{Error, Result};

/// Nominal length of every block except possibly the last one.
///
/// Zero and negative sizes are rejected at construction, so any `BlockSize`
/// in hand is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockSize(NonZeroUsize);

impl BlockSize {
    /// Validates a block size.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] when `size` is zero.
    pub fn new(size: usize) -> Result<Self> {
        NonZeroUsize::new(size)
            .map(Self)
            .ok_or_else(|| Error::InvalidArgument("block size must be at least 1".into()))
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl TryFrom<i64> for BlockSize {
    type Error = Error;

    fn try_from(size: i64) -> Result<Self> {
        if size <= 0 {
            return Err(Error::InvalidArgument(format!(
                "block size must be at least 1, got {size}"
            )));
        }
        let size = usize::try_from(size).map_err(|_| {
            Error::InvalidArgument(format!("block size {size} exceeds addressable memory"))
        })?;
        Self::new(size)
    }
}

impl TryFrom<u64> for BlockSize {
    type Error = Error;

    fn try_from(size: u64) -> Result<Self> {
        let size = usize::try_from(size).map_err(|_| {
            Error::InvalidArgument(format!("block size {size} exceeds addressable memory"))
        })?;
        Self::new(size)
    }
}

impl core::fmt::Display for BlockSize {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Distinct blocks of a buffer plus the index sequence that restores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTable<'a> {
    pub(crate) block_size: BlockSize,
    pub(crate) unique: Vec<&'a [u8]>,
    pub(crate) sequence: Vec<u32>,
    pub(crate) tail_len: usize,
}

impl<'a> BlockTable<'a> {
    #[must_use]
    pub const fn block_size(&self) -> BlockSize {
        self.block_size
    }

    /// Distinct block contents in first-occurrence order.
    #[must_use]
    pub fn unique_blocks(&self) -> &[&'a [u8]] {
        &self.unique
    }

    /// One table index per block, in original block order.
    #[must_use]
    pub fn sequence(&self) -> &[u32] {
        &self.sequence
    }

    /// Number of blocks the buffer was split into (N).
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.sequence.len()
    }

    /// Length of the final block; zero when there are no blocks.
    #[must_use]
    pub const fn tail_len(&self) -> usize {
        self.tail_len
    }

    /// Length of the buffer this table reconstructs.
    #[must_use]
    pub fn original_len(&self) -> usize {
        match self.sequence.len() {
            0 => 0,
            n => (n - 1) * self.block_size.get() + self.tail_len,
        }
    }

    /// Total bytes held by the unique table.
    #[must_use]
    pub fn unique_len(&self) -> usize {
        self.unique.iter().map(|block| block.len()).sum()
    }
}

/// Splits `data` at multiples of `block_size` and deduplicates the blocks.
///
/// Lookups go through a map keyed by block contents, so a hash collision is
/// settled by comparing the bytes themselves.
///
/// # Errors
/// Returns [`Error::InvalidArgument`] if the block count does not fit the
/// 32-bit count field of the block format.
///
/// # Example
///
/// ```rust
/// use smartfile::{BlockSize, deduplicate};
///
/// let data = [0xAAu8, 0xBB, 0xCC, 0xDD].repeat(3);
/// let table = deduplicate(&data, BlockSize::new(4).unwrap()).unwrap();
/// assert_eq!(table.unique_blocks().len(), 1);
/// assert_eq!(table.sequence(), &[0, 0, 0]);
/// ```
pub fn deduplicate(data: &[u8], block_size: BlockSize) -> Result<BlockTable<'_>> {
    let block_count = data.len().div_ceil(block_size.get());
    if u32::try_from(block_count).is_err() {
        return Err(Error::InvalidArgument(format!(
            "{block_count} blocks of {block_size} bytes exceed the 32-bit block count"
        )));
    }

    let mut index_of: HashMap<&[u8], u32> = HashMap::new();
    let mut unique = Vec::new();
    let mut sequence = Vec::with_capacity(block_count);

    for block in data.chunks(block_size.get()) {
        let next = unique.len() as u32;
        let index = *index_of.entry(block).or_insert_with(|| {
            unique.push(block);
            next
        });
        sequence.push(index);
    }

    let tail_len = match data.len() % block_size.get() {
        0 if data.is_empty() => 0,
        0 => block_size.get(),
        rem => rem,
    };

    debug!(
        len = data.len(),
        block_size = block_size.get(),
        blocks = block_count,
        unique = unique.len(),
        "deduplicated blocks"
    );

    Ok(BlockTable {
        block_size,
        unique,
        sequence,
        tail_len,
    })
}

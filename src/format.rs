//! Smart file layout shared by the encoder, decoder and inspector.
//!
//! Every integer is stored big-endian.
//!
//! Pattern format:
//!
//! | Offset | Size | Field                  |
//! |--------|------|------------------------|
//! | 0      | 1    | tag `0x01`             |
//! | 1      | 8    | pattern length P (u64) |
//! | 9      | 8    | repetitions R (u64)    |
//! | 17     | P    | pattern bytes          |
//!
//! Block format:
//!
//! | Offset | Size | Field                                         |
//! |--------|------|-----------------------------------------------|
//! | 0      | 1    | tag `0x00`                                    |
//! | 1      | 8    | block size B (u64)                            |
//! | 9      | 4    | block count N (u32)                           |
//! | 13     | 4    | unique block count U (u32)                    |
//! | 17     | 8    | final block length T (u64)                    |
//! | 25     | ...  | unique blocks, B bytes each, the last may be T |
//! | ...    | N*w  | sequence indices of width w                   |

use crate::dedup::BlockTable;
use crate::error::FormatError;
use crate::pattern::Pattern;

/// Header length of the pattern format.
pub const PATTERN_HEADER_LEN: usize = 17;

/// Header length of the block format.
pub const BLOCK_HEADER_LEN: usize = 25;

/// Which of the two encodings a smart file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Format {
    Blocks = 0x00,
    Pattern = 0x01,
}

impl Format {
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn header_len(self) -> usize {
        match self {
            Self::Blocks => BLOCK_HEADER_LEN,
            Self::Pattern => PATTERN_HEADER_LEN,
        }
    }
}

impl TryFrom<u8> for Format {
    type Error = FormatError;

    fn try_from(tag: u8) -> Result<Self, FormatError> {
        match tag {
            0x00 => Ok(Self::Blocks),
            0x01 => Ok(Self::Pattern),
            other => Err(FormatError::UnknownTag(other)),
        }
    }
}

impl core::fmt::Display for Format {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Blocks => "blocks",
            Self::Pattern => "pattern",
        })
    }
}

/// Byte width of each stored sequence index.
///
/// Chosen as the narrowest width that can address every unique block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexWidth {
    U8,
    U16,
    U32,
}

impl IndexWidth {
    #[must_use]
    pub const fn for_table_len(table_len: usize) -> Self {
        if table_len <= 1 << 8 {
            Self::U8
        } else if table_len <= 1 << 16 {
            Self::U16
        } else {
            Self::U32
        }
    }

    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }

    pub(crate) fn write(self, index: u32, output: &mut Vec<u8>) {
        match self {
            Self::U8 => output.push(index as u8),
            Self::U16 => output.extend_from_slice(&(index as u16).to_be_bytes()),
            Self::U32 => output.extend_from_slice(&index.to_be_bytes()),
        }
    }

    /// Reads one index from the front of `bytes`, which must hold at least
    /// [`Self::bytes`] bytes.
    pub(crate) fn read(self, bytes: &[u8]) -> u32 {
        match self {
            Self::U8 => u32::from(bytes[0]),
            Self::U16 => u32::from(u16::from_be_bytes([bytes[0], bytes[1]])),
            Self::U32 => u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        }
    }
}

/// A parsed or freshly built smart file.
///
/// Borrows either the raw input (when encoding) or the encoded stream (when
/// decoding); see [`SmartFile::analyze`] and [`SmartFile::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmartFile<'a> {
    Pattern(Pattern<'a>),
    Blocks(BlockTable<'a>),
}

impl SmartFile<'_> {
    #[must_use]
    pub const fn format(&self) -> Format {
        match self {
            Self::Pattern(_) => Format::Pattern,
            Self::Blocks(_) => Format::Blocks,
        }
    }

    /// Length of the data this smart file reconstructs.
    ///
    /// Saturates for pattern headers whose product overflows `u64`.
    #[must_use]
    pub fn original_len(&self) -> u64 {
        match self {
            Self::Pattern(pattern) => (pattern.len() as u64).saturating_mul(pattern.repetitions()),
            Self::Blocks(table) => table.original_len() as u64,
        }
    }

    /// Length of the serialized form.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        match self {
            Self::Pattern(pattern) => PATTERN_HEADER_LEN + pattern.len(),
            Self::Blocks(table) => {
                BLOCK_HEADER_LEN + table.unique_len() + sequence_len(table)
            }
        }
    }
}

/// Bytes occupied by the index sequence of `table`.
pub(crate) fn sequence_len(table: &BlockTable<'_>) -> usize {
    table.block_count() * IndexWidth::for_table_len(table.unique_blocks().len()).bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags() {
        assert_eq!(Format::try_from(0x00u8), Ok(Format::Blocks));
        assert_eq!(Format::try_from(0x01u8), Ok(Format::Pattern));
        assert_eq!(Format::try_from(0x7Fu8), Err(FormatError::UnknownTag(0x7F)));
        assert_eq!(Format::Pattern.tag(), 0x01);
    }

    #[test]
    fn test_index_width_boundaries() {
        assert_eq!(IndexWidth::for_table_len(0), IndexWidth::U8);
        assert_eq!(IndexWidth::for_table_len(256), IndexWidth::U8);
        assert_eq!(IndexWidth::for_table_len(257), IndexWidth::U16);
        assert_eq!(IndexWidth::for_table_len(65_536), IndexWidth::U16);
        assert_eq!(IndexWidth::for_table_len(65_537), IndexWidth::U32);
    }

    #[test]
    fn test_index_width_write_read() {
        for (width, index) in [
            (IndexWidth::U8, 255),
            (IndexWidth::U16, 0xBEEF),
            (IndexWidth::U32, 0xDEAD_BEEF),
        ] {
            let mut out = Vec::new();
            width.write(index, &mut out);
            assert_eq!(out.len(), width.bytes());
            assert_eq!(width.read(&out), index);
        }
    }
}

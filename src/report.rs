//! Size breakdown of an encoded smart file.

use core::fmt;

use crate::error::FormatError;
use crate::format::{Format, SmartFile, sequence_len};

/// Where the bytes of a smart file go, and how much they stand for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub format: Format,
    pub header_len: usize,
    /// Pattern bytes or unique block bytes.
    pub payload_len: usize,
    /// Index bytes; always zero for the pattern format.
    pub sequence_len: usize,
    pub encoded_len: usize,
    pub original_len: u64,
    pub layout: Layout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Pattern {
        repetitions: u64,
    },
    Blocks {
        block_size: usize,
        blocks: usize,
        unique_blocks: usize,
    },
}

impl Report {
    #[must_use]
    pub fn from_smart_file(smart: &SmartFile<'_>) -> Self {
        let (payload_len, sequence_len, layout) = match smart {
            SmartFile::Pattern(pattern) => (
                pattern.len(),
                0,
                Layout::Pattern {
                    repetitions: pattern.repetitions(),
                },
            ),
            SmartFile::Blocks(table) => (
                table.unique_len(),
                sequence_len(table),
                Layout::Blocks {
                    block_size: table.block_size().get(),
                    blocks: table.block_count(),
                    unique_blocks: table.unique_blocks().len(),
                },
            ),
        };

        Self {
            format: smart.format(),
            header_len: smart.format().header_len(),
            payload_len,
            sequence_len,
            encoded_len: smart.encoded_len(),
            original_len: smart.original_len(),
            layout,
        }
    }

    /// Original size divided by encoded size.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.original_len as f64 / self.encoded_len as f64
    }

    /// Percentage of the original size saved; negative when the encoding grew.
    #[must_use]
    pub fn space_saving(&self) -> f64 {
        if self.original_len == 0 {
            return 0.0;
        }
        (1.0 - self.encoded_len as f64 / self.original_len as f64) * 100.0
    }
}

/// Validates `encoded` and reports its size breakdown without expanding it.
///
/// # Errors
/// Returns the same [`FormatError`]s as [`crate::decode`].
pub fn inspect(encoded: &[u8]) -> Result<Report, FormatError> {
    SmartFile::parse(encoded).map(|smart| Report::from_smart_file(&smart))
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "format:        {}", self.format)?;
        match self.layout {
            Layout::Pattern { repetitions } => {
                writeln!(f, "pattern:       {} bytes x {repetitions}", self.payload_len)?;
            }
            Layout::Blocks {
                block_size,
                blocks,
                unique_blocks,
            } => {
                writeln!(f, "block size:    {block_size}")?;
                writeln!(f, "blocks:        {blocks} ({unique_blocks} unique)")?;
            }
        }
        writeln!(f, "header:        {} bytes", self.header_len)?;
        writeln!(f, "unique data:   {} bytes", self.payload_len)?;
        writeln!(f, "sequence data: {} bytes", self.sequence_len)?;
        writeln!(f, "encoded size:  {} bytes", self.encoded_len)?;
        writeln!(f, "original size: {} bytes", self.original_len)?;
        write!(
            f,
            "ratio:         {:.2}:1 ({:.2}% saved)",
            self.ratio(),
            self.space_saving()
        )
    }
}

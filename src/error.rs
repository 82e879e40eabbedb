use thiserror::Error;

/// Structural problems found while parsing a smart file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unexpected end of stream")]
    UnexpectedEof,

    #[error("Unknown format tag 0x{0:02x}")]
    UnknownTag(u8),

    #[error("Pattern length must be at least 1")]
    EmptyPattern,

    #[error("Invalid header: {0}")]
    InvalidHeader(&'static str),

    #[error("Sequence index {index} out of range for table of {table_len} blocks")]
    IndexOutOfRange { index: u32, table_len: usize },

    #[error("Block at position {position} references an entry of the wrong length")]
    BlockLengthMismatch { position: usize },

    #[error("{0} trailing bytes after the encoded data")]
    TrailingBytes(usize),

    #[error("Declared output size exceeds addressable memory")]
    OutputTooLarge,
}

/// Errors surfaced by the encoding and file-level operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("Corrupt smart file")]
    CorruptFormat(#[from] FormatError),

    /// A smart file did not reproduce the file it was checked against.
    #[error("Reconstructed data differs from the original at byte {offset}")]
    Mismatch { offset: u64 },
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

use tracing::{debug, trace};

use crate::dedup::{BlockSize, BlockTable};
use crate::error::FormatError;
use crate::format::{Format, IndexWidth, SmartFile};
use crate::pattern::Pattern;

type Result<T> = core::result::Result<T, FormatError>;

/// Bounds-checked forward cursor over an encoded stream.
struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    const fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    const fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(FormatError::UnexpectedEof);
        }
        let bytes = &self.input[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Result<u64> {
        let b = self.take(8)?;
        Ok(u64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Reads a u64 length field that must fit in memory.
    fn length(&mut self) -> Result<usize> {
        usize::try_from(self.u64()?).map_err(|_| FormatError::OutputTooLarge)
    }

    fn finish(self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            extra => Err(FormatError::TrailingBytes(extra)),
        }
    }
}

impl<'a> SmartFile<'a> {
    /// Parses and validates an encoded stream without expanding it.
    ///
    /// # Errors
    /// Returns a [`FormatError`] for an unknown tag, a truncated header or
    /// body, inconsistent counts, out-of-range indices or trailing bytes.
    pub fn parse(input: &'a [u8]) -> Result<Self> {
        let mut reader = Reader::new(input);
        let format = Format::try_from(reader.u8()?)?;
        trace!(%format, len = input.len(), "parsing smart file");

        let smart = match format {
            Format::Pattern => Self::Pattern(parse_pattern(&mut reader)?),
            Format::Blocks => Self::Blocks(parse_blocks(&mut reader)?),
        };
        reader.finish()?;
        Ok(smart)
    }

    /// Appends the reconstructed data to `output`.
    ///
    /// # Errors
    /// Returns [`FormatError::OutputTooLarge`] if the reconstructed length
    /// cannot be allocated. Nothing is appended in that case.
    pub fn expand(&self, output: &mut Vec<u8>) -> Result<()> {
        let len = usize::try_from(self.original_len()).map_err(|_| FormatError::OutputTooLarge)?;
        output
            .try_reserve_exact(len)
            .map_err(|_| FormatError::OutputTooLarge)?;

        match self {
            Self::Pattern(pattern) => {
                for _ in 0..pattern.repetitions() {
                    output.extend_from_slice(pattern.bytes());
                }
            }
            Self::Blocks(table) => {
                let last = table.block_count().saturating_sub(1);
                for (position, &index) in table.sequence().iter().enumerate() {
                    let block = table.unique_blocks()[index as usize];
                    if position == last {
                        output.extend_from_slice(&block[..table.tail_len()]);
                    } else {
                        output.extend_from_slice(block);
                    }
                }
            }
        }
        Ok(())
    }
}

fn parse_pattern<'a>(reader: &mut Reader<'a>) -> Result<Pattern<'a>> {
    let len = reader.length()?;
    let repetitions = reader.u64()?;
    if len == 0 {
        return Err(FormatError::EmptyPattern);
    }
    if (len as u64)
        .checked_mul(repetitions)
        .and_then(|total| usize::try_from(total).ok())
        .is_none()
    {
        return Err(FormatError::OutputTooLarge);
    }

    let bytes = reader.take(len)?;
    Ok(Pattern::new(bytes, repetitions))
}

fn parse_blocks<'a>(reader: &mut Reader<'a>) -> Result<BlockTable<'a>> {
    let block_size = reader.length()?;
    let block_count = reader.u32()? as usize;
    let unique_count = reader.u32()? as usize;
    let tail_len = reader.length()?;

    let block_size = BlockSize::new(block_size)
        .map_err(|_| FormatError::InvalidHeader("block size is zero"))?;
    if unique_count > block_count {
        return Err(FormatError::InvalidHeader("more unique blocks than blocks"));
    }
    if (block_count == 0) != (unique_count == 0) {
        return Err(FormatError::InvalidHeader("unique block count inconsistent with block count"));
    }
    if (block_count == 0) != (tail_len == 0) || tail_len > block_size.get() {
        return Err(FormatError::InvalidHeader("final block length out of range"));
    }
    (block_count.saturating_sub(1))
        .checked_mul(block_size.get())
        .and_then(|full| full.checked_add(tail_len))
        .ok_or(FormatError::OutputTooLarge)?;

    // Only the final block can be short, and being a distinct length it is
    // always the last table entry.
    let mut unique = Vec::with_capacity(unique_count.min(reader.remaining()));
    for i in 0..unique_count {
        let len = if i + 1 == unique_count && tail_len < block_size.get() {
            tail_len
        } else {
            block_size.get()
        };
        unique.push(reader.take(len)?);
    }

    let width = IndexWidth::for_table_len(unique_count);
    let sequence_len = block_count
        .checked_mul(width.bytes())
        .ok_or(FormatError::UnexpectedEof)?;
    let indices = reader.take(sequence_len)?;

    let last = block_count.saturating_sub(1);
    let mut sequence = Vec::with_capacity(block_count);
    for (position, raw) in indices.chunks_exact(width.bytes()).enumerate() {
        let index = width.read(raw);
        let block = unique
            .get(index as usize)
            .ok_or(FormatError::IndexOutOfRange {
                index,
                table_len: unique_count,
            })?;
        let fits = if position == last {
            block.len() >= tail_len
        } else {
            block.len() == block_size.get()
        };
        if !fits {
            return Err(FormatError::BlockLengthMismatch { position });
        }
        sequence.push(index);
    }

    Ok(BlockTable {
        block_size,
        unique,
        sequence,
        tail_len,
    })
}

/// Decodes a smart file, appending the original data to `output`.
///
/// The stream is fully validated before anything is written, so on error
/// `output` is left untouched.
///
/// # Example
///
/// ```rust
/// use smartfile::{decode, Format};
///
/// // "ab" repeated three times.
/// let mut encoded = vec![0x01];
/// encoded.extend_from_slice(&2u64.to_be_bytes());
/// encoded.extend_from_slice(&3u64.to_be_bytes());
/// encoded.extend_from_slice(b"ab");
///
/// let mut buffer = Vec::new();
/// assert_eq!(decode(&encoded, &mut buffer), Ok(Format::Pattern));
/// assert_eq!(buffer, b"ababab");
/// ```
pub fn decode(input: &[u8], output: &mut Vec<u8>) -> Result<Format> {
    let smart = SmartFile::parse(input)?;
    smart.expand(output)?;
    debug!(
        format = %smart.format(),
        encoded = input.len(),
        decoded = smart.original_len(),
        "decoded smart file"
    );
    Ok(smart.format())
}

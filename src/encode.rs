use tracing::debug;

use crate::dedup::{BlockSize, BlockTable, deduplicate};
use crate::error::Result;
use crate::format::{Format, IndexWidth, SmartFile};
use crate::pattern::{Pattern, find_pattern};

impl<'a> SmartFile<'a> {
    /// Chooses the representation for `data`.
    ///
    /// A whole-buffer repetition always wins, since its stored size does not
    /// depend on the repetition count. Everything else goes through block
    /// deduplication at `block_size`.
    ///
    /// # Errors
    /// Propagates [`crate::Error::InvalidArgument`] from [`deduplicate`].
    pub fn analyze(data: &'a [u8], block_size: BlockSize) -> Result<Self> {
        if let Some(pattern) = find_pattern(data) {
            debug!(
                len = data.len(),
                period = pattern.len(),
                repetitions = pattern.repetitions(),
                "using pattern encoding"
            );
            return Ok(Self::Pattern(pattern));
        }

        let table = deduplicate(data, block_size)?;
        debug!(
            len = data.len(),
            blocks = table.block_count(),
            unique = table.unique_blocks().len(),
            "using block encoding"
        );
        Ok(Self::Blocks(table))
    }

    /// Appends the serialized smart file to `output`.
    ///
    /// Writes exactly [`SmartFile::encoded_len`] bytes.
    pub fn write_to(&self, output: &mut Vec<u8>) {
        output.reserve(self.encoded_len());
        output.push(self.format().tag());

        match self {
            Self::Pattern(pattern) => write_pattern(pattern, output),
            Self::Blocks(table) => write_blocks(table, output),
        }
    }
}

fn write_pattern(pattern: &Pattern<'_>, output: &mut Vec<u8>) {
    output.extend_from_slice(&(pattern.len() as u64).to_be_bytes());
    output.extend_from_slice(&pattern.repetitions().to_be_bytes());
    output.extend_from_slice(pattern.bytes());
}

fn write_blocks(table: &BlockTable<'_>, output: &mut Vec<u8>) {
    // Counts were bounded to u32 by `deduplicate`.
    output.extend_from_slice(&(table.block_size().get() as u64).to_be_bytes());
    output.extend_from_slice(&(table.block_count() as u32).to_be_bytes());
    output.extend_from_slice(&(table.unique_blocks().len() as u32).to_be_bytes());
    output.extend_from_slice(&(table.tail_len() as u64).to_be_bytes());

    for block in table.unique_blocks() {
        output.extend_from_slice(block);
    }

    let width = IndexWidth::for_table_len(table.unique_blocks().len());
    for &index in table.sequence() {
        width.write(index, output);
    }
}

/// Encodes `input` into the smart file format, appending to `output`.
///
/// # Parameters
/// * `input`: The raw data to encode.
/// * `block_size`: Block length used when the input is not a repetition.
/// * `output`: The destination vector (appended to).
///
/// # Errors
/// Returns [`crate::Error::InvalidArgument`] if the input splits into more
/// blocks than the format can count. Nothing is appended in that case.
pub fn encode(input: &[u8], block_size: BlockSize, output: &mut Vec<u8>) -> Result<Format> {
    let smart = SmartFile::analyze(input, block_size)?;
    smart.write_to(output);
    Ok(smart.format())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{BLOCK_HEADER_LEN, PATTERN_HEADER_LEN};

    fn size(n: usize) -> BlockSize {
        BlockSize::new(n).unwrap()
    }

    #[test]
    fn test_pattern_layout() {
        let input = [0x0Fu8, 0xAB, 0xBB].repeat(11);
        let mut out = Vec::new();
        let format = encode(&input, size(4), &mut out).unwrap();

        assert_eq!(format, Format::Pattern);
        assert_eq!(out.len(), 20);
        assert_eq!(out[0], 0x01);
        assert_eq!(&out[1..9], &3u64.to_be_bytes());
        assert_eq!(&out[9..17], &11u64.to_be_bytes());
        assert_eq!(&out[17..], &[0x0F, 0xAB, 0xBB]);
    }

    #[test]
    fn test_block_layout() {
        let input = b"abcdXYZ!abcdab";
        let mut out = Vec::new();
        let format = encode(input, size(4), &mut out).unwrap();

        assert_eq!(format, Format::Blocks);
        assert_eq!(out[0], 0x00);
        assert_eq!(&out[1..9], &4u64.to_be_bytes());
        assert_eq!(&out[9..13], &4u32.to_be_bytes());
        assert_eq!(&out[13..17], &3u32.to_be_bytes());
        assert_eq!(&out[17..25], &2u64.to_be_bytes());
        assert_eq!(&out[25..35], b"abcdXYZ!ab");
        assert_eq!(&out[35..], &[0, 1, 0, 2]);
    }

    #[test]
    fn test_encoded_len_matches_written() {
        let inputs: [&[u8]; 4] = [b"", b"a", b"hello world, hello", &[7u8; 300]];
        for input in inputs {
            let smart = SmartFile::analyze(input, size(5)).unwrap();
            let mut out = Vec::new();
            smart.write_to(&mut out);
            assert_eq!(out.len(), smart.encoded_len());
        }
    }

    #[test]
    fn test_empty_input_is_block_encoded() {
        let mut out = Vec::new();
        assert_eq!(encode(b"", size(8), &mut out).unwrap(), Format::Blocks);
        assert_eq!(out.len(), BLOCK_HEADER_LEN);
        assert_eq!(&out[9..13], &0u32.to_be_bytes());
    }

    #[test]
    fn test_appends_to_existing_buffer() {
        let mut out = vec![0xEE];
        encode(&[1, 2, 1, 2], size(2), &mut out).unwrap();
        assert_eq!(out[0], 0xEE);
        assert_eq!(out.len(), 1 + PATTERN_HEADER_LEN + 2);
    }
}

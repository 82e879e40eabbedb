//! File-level operations.
//!
//! Inputs are read whole. Outputs are written to a temporary file next to the
//! destination, synced, then renamed over it, so a failed run never leaves a
//! partial file at the destination path. A new output gets the permissions a
//! plain create would give it (mode 0666 less the umask on unix); a replaced
//! output keeps the permissions it had.

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::dedup::BlockSize;
use crate::error::{Error, Result};
use crate::format::{Format, SmartFile};
use crate::sample::repeat_pattern;

/// Extension appended to the input name when no output path is given.
pub const SMART_EXTENSION: &str = "smart";

/// Sizes involved in one file-level operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub format: Format,
    pub input_len: u64,
    pub output_len: u64,
}

/// `input.bin` becomes `input.bin.smart`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(".");
    name.push(SMART_EXTENSION);
    PathBuf::from(name)
}

/// Encodes the file at `input` and writes the smart file to `output`.
///
/// # Errors
/// [`crate::Error::Io`] if reading or writing fails and
/// [`crate::Error::InvalidArgument`] if the input cannot be block encoded at
/// `block_size`. No output file is created on error.
pub fn deconstruct(input: &Path, block_size: BlockSize, output: &Path) -> Result<Summary> {
    let data = fs::read(input)?;
    let smart = SmartFile::analyze(&data, block_size)?;

    let mut encoded = Vec::new();
    smart.write_to(&mut encoded);
    write_atomic(output, &encoded)?;

    let summary = Summary {
        format: smart.format(),
        input_len: data.len() as u64,
        output_len: encoded.len() as u64,
    };
    info!(
        input = %input.display(),
        output = %output.display(),
        format = %summary.format,
        original = summary.input_len,
        encoded = summary.output_len,
        "deconstructed"
    );
    Ok(summary)
}

/// Decodes the smart file at `input` and writes the original data to `output`.
///
/// # Errors
/// [`crate::Error::Io`] if reading or writing fails and
/// [`crate::Error::CorruptFormat`] if `input` is not a valid smart file. No
/// output file is created on error.
pub fn reconstruct(input: &Path, output: &Path) -> Result<Summary> {
    let encoded = fs::read(input)?;
    let smart = SmartFile::parse(&encoded)?;

    let mut decoded = Vec::new();
    smart.expand(&mut decoded)?;
    write_atomic(output, &decoded)?;

    let summary = Summary {
        format: smart.format(),
        input_len: encoded.len() as u64,
        output_len: decoded.len() as u64,
    };
    info!(
        input = %input.display(),
        output = %output.display(),
        format = %summary.format,
        encoded = summary.input_len,
        decoded = summary.output_len,
        "reconstructed"
    );
    Ok(summary)
}

/// Checks that the smart file at `smart` reconstructs the file at `original`
/// exactly. Nothing is written.
///
/// # Errors
/// [`crate::Error::Io`] if either file cannot be read,
/// [`crate::Error::CorruptFormat`] if `smart` is not a valid smart file and
/// [`crate::Error::Mismatch`] if the reconstruction differs.
pub fn verify(original: &Path, smart: &Path) -> Result<Summary> {
    let expected = fs::read(original)?;
    let encoded = fs::read(smart)?;
    let parsed = SmartFile::parse(&encoded)?;

    let mut decoded = Vec::new();
    parsed.expand(&mut decoded)?;
    if let Some(offset) = first_difference(&expected, &decoded) {
        debug!(
            original = %original.display(),
            smart = %smart.display(),
            offset,
            "reconstruction differs"
        );
        return Err(Error::Mismatch { offset });
    }

    let summary = Summary {
        format: parsed.format(),
        input_len: encoded.len() as u64,
        output_len: decoded.len() as u64,
    };
    info!(
        original = %original.display(),
        smart = %smart.display(),
        format = %summary.format,
        len = summary.output_len,
        "verified"
    );
    Ok(summary)
}

/// Offset of the first differing byte, or of the end of the shorter buffer
/// when one is a prefix of the other.
fn first_difference(a: &[u8], b: &[u8]) -> Option<u64> {
    a.iter()
        .zip(b)
        .position(|(x, y)| x != y)
        .or_else(|| (a.len() != b.len()).then(|| a.len().min(b.len())))
        .map(|offset| offset as u64)
}

/// Writes `pattern` repeated `repetitions` times to `path`, returning the
/// number of bytes written.
///
/// # Errors
/// [`crate::Error::InvalidArgument`] if the sample does not fit in memory and
/// [`crate::Error::Io`] if the file cannot be written.
pub fn generate(path: &Path, pattern: &[u8], repetitions: usize) -> Result<u64> {
    let data = repeat_pattern(pattern, repetitions)?;
    write_atomic(path, &data)?;
    info!(
        path = %path.display(),
        pattern_len = pattern.len(),
        repetitions,
        len = data.len(),
        "generated sample"
    );
    Ok(data.len() as u64)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let existing = fs::metadata(path).ok().map(|meta| meta.permissions());

    #[cfg_attr(not(unix), allow(unused_mut))]
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Requested at creation so the umask applies, as with `File::create`.
        builder.permissions(fs::Permissions::from_mode(0o666));
    }

    // Dropped (and deleted) on any early return below.
    let mut tmp = builder.tempfile_in(dir)?;
    if let Some(permissions) = existing {
        tmp.as_file().set_permissions(permissions)?;
    }
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    debug!(tmp = %tmp.path().display(), dest = %path.display(), len = bytes.len(), "persisting");
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

//! Whole-buffer repetition detection.

use tracing::trace;

/// A buffer expressed as `bytes` repeated `repetitions` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern<'a> {
    bytes: &'a [u8],
    repetitions: u64,
}

impl<'a> Pattern<'a> {
    pub(crate) const fn new(bytes: &'a [u8], repetitions: u64) -> Self {
        Self { bytes, repetitions }
    }

    /// The repeated unit.
    #[must_use]
    pub const fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Length of the repeated unit (P).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// How many times the unit is repeated (R).
    #[must_use]
    pub const fn repetitions(&self) -> u64 {
        self.repetitions
    }
}

/// Finds the shortest unit whose repetition reproduces `data` exactly.
///
/// Returns `None` for empty input, and whenever the only valid decomposition
/// is the buffer itself (a single repetition saves nothing).
///
/// # Example
///
/// ```rust
/// use smartfile::find_pattern;
///
/// let pattern = find_pattern(b"abcabcabc").unwrap();
/// assert_eq!(pattern.bytes(), b"abc");
/// assert_eq!(pattern.repetitions(), 3);
///
/// assert!(find_pattern(b"abcabcab").is_none());
/// ```
#[must_use]
pub fn find_pattern(data: &[u8]) -> Option<Pattern<'_>> {
    if data.len() < 2 {
        return None;
    }

    let period = minimal_period(data);
    if period == data.len() || data.len() % period != 0 {
        trace!(len = data.len(), period, "no whole-buffer repetition");
        return None;
    }

    let repetitions = (data.len() / period) as u64;
    trace!(len = data.len(), period, repetitions, "found repetition");
    Some(Pattern::new(&data[..period], repetitions))
}

/// Returns the smallest `p` such that `data[i] == data[i + p]` for every
/// valid `i`, computed from the prefix function in linear time.
///
/// The result only describes a whole-buffer repetition when it divides
/// `data.len()`. Empty input has period 0.
#[must_use]
pub fn minimal_period(data: &[u8]) -> usize {
    match data.len() {
        0 => 0,
        n if u32::try_from(n).is_ok() => n - longest_border::<u32>(data),
        n => n - longest_border::<usize>(data),
    }
}

/// Entry type of the prefix table. Every entry is below `data.len()`.
trait BorderLen: Copy {
    const ZERO: Self;
    fn from_usize(len: usize) -> Self;
    fn to_usize(self) -> usize;
}

impl BorderLen for u32 {
    const ZERO: Self = 0;

    fn from_usize(len: usize) -> Self {
        len as Self
    }

    fn to_usize(self) -> usize {
        self as usize
    }
}

impl BorderLen for usize {
    const ZERO: Self = 0;

    fn from_usize(len: usize) -> Self {
        len
    }

    fn to_usize(self) -> usize {
        self
    }
}

/// Length of the longest proper border of non-empty `data`, whose length
/// must fit in `T`.
fn longest_border<T: BorderLen>(data: &[u8]) -> usize {
    let n = data.len();

    // prefix[i]: length of the longest proper border of data[..=i].
    let mut prefix = vec![T::ZERO; n];
    let mut k = 0;
    for i in 1..n {
        while k > 0 && data[i] != data[k] {
            k = prefix[k - 1].to_usize();
        }
        if data[i] == data[k] {
            k += 1;
        }
        prefix[i] = T::from_usize(k);
    }

    prefix[n - 1].to_usize()
}

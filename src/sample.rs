//! Sample inputs made of a repeated pattern.

/// Returns `pattern` concatenated `repetitions` times.
///
/// ```rust
/// use smartfile::sample::repeat_pattern;
///
/// assert_eq!(repeat_pattern(&[0x0F, 0xAB, 0xBB], 11).unwrap().len(), 33);
/// ```
///
/// # Errors
/// Returns [`crate::Error::InvalidArgument`] if the result cannot be
/// allocated.
pub fn repeat_pattern(pattern: &[u8], repetitions: usize) -> crate::Result<Vec<u8>> {
    let too_large = || {
        crate::Error::InvalidArgument(format!(
            "{} bytes repeated {repetitions} times does not fit in memory",
            pattern.len()
        ))
    };
    if pattern.is_empty() {
        return Ok(Vec::new());
    }

    let len = pattern.len().checked_mul(repetitions).ok_or_else(too_large)?;
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|_| too_large())?;
    for _ in 0..repetitions {
        data.extend_from_slice(pattern);
    }
    Ok(data)
}

/// Parses a hex string such as `"0fabbb"` or `"0F AB BB"` into bytes.
///
/// # Errors
/// Returns [`crate::Error::InvalidArgument`] for odd-length or non-hex input,
/// or when the pattern is empty.
pub fn parse_hex_pattern(text: &str) -> crate::Result<Vec<u8>> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = hex::decode(&digits)
        .map_err(|e| crate::Error::InvalidArgument(format!("invalid hex pattern: {e}")))?;
    if bytes.is_empty() {
        return Err(crate::Error::InvalidArgument("pattern must not be empty".into()));
    }
    Ok(bytes)
}

//! Binary content detection.

/// Returns `true` when the buffer holds at least one NUL byte.
///
/// Any file with an embedded NUL is treated as binary, including text in encodings such as
/// UTF-16. No other sniffing is applied.
pub fn is_binary(bytes: &[u8]) -> bool {
    bytes.contains(&0)
}

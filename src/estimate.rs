//! Payload size accounting: estimate the decoded byte size of a base64
//! string without decoding it.
//!
//! Used for diagnostics and telemetry only — never for control flow. The
//! estimate is O(1) over the encoded length: base64 expands 3 bytes into 4
//! characters, so `len * 3/4` minus the trailing padding is within a couple
//! of bytes of the truth.

/// Estimated decoded size in bytes of a base64 payload.
///
/// Accepts either a bare base64 string or a full data URI; anything up to
/// and including the first `,` is treated as the prefix and skipped.
pub fn estimated_bytes(encoded: &str) -> u64 {
    let payload = match encoded.split_once(',') {
        Some((_prefix, rest)) => rest,
        None => encoded,
    };
    let padding = payload
        .as_bytes()
        .iter()
        .rev()
        .take_while(|&&b| b == b'=')
        .take(2)
        .count() as u64;
    let chars = payload.len() as u64;
    (chars * 3 / 4).saturating_sub(padding)
}

/// Estimated decoded size in kilobytes, rounded to the nearest integer.
pub fn estimated_kilobytes(encoded: &str) -> u32 {
    ((estimated_bytes(encoded) as f64) / 1024.0).round() as u32
}

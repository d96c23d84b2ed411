//! # PackBits Run-Length Encoding
//!
//! Raster lines are compressed with PackBits before they go on the wire.
//! The stream is a sequence of tokens, each a control byte followed by data:
//!
//! | Control byte | Meaning | Data |
//! |--------------|---------|------|
//! | 0..=127 | literal run of `n + 1` bytes | the bytes verbatim |
//! | 129..=255 | repeat run of `257 - n` bytes | one byte, repeated |
//!
//! Runs and literals are both capped at 128 bytes.
//!
//! ## Greedy Rule
//!
//! ```text
//! input:   01 02  03 03 03  04
//!          └─┬─┘  └───┬──┘  └┬┘
//! tokens:  lit 2   rep 3   lit 1
//! output:  01 01 02  FE 03  00 04
//! ```
//!
//! At each position the encoder first measures the run of identical bytes.
//! Two or more becomes a repeat token. Otherwise it collects a literal that
//! stops one byte before the next pair of identical bytes, so the pair can
//! start a repeat token. The printer firmware expects exactly this byte
//! layout, not merely something that decodes to the same data.

/// Longest literal or repeat run in one token.
pub const MAX_RUN: usize = 128;

/// Length of the run of identical bytes starting at `start` (capped).
#[inline]
fn run_length(data: &[u8], start: usize) -> usize {
    let first = data[start];
    data[start..]
        .iter()
        .take(MAX_RUN)
        .take_while(|&&b| b == first)
        .count()
}

/// Length of the literal run starting at `start` (capped).
#[inline]
fn literal_length(data: &[u8], start: usize) -> usize {
    let mut len = 1;
    while start + len < data.len() && len < MAX_RUN {
        let i = start + len;
        // Leave a repeating pair for the next token
        if i + 1 < data.len() && data[i] == data[i + 1] {
            break;
        }
        len += 1;
    }
    len
}

/// Encode `data` as PackBits.
///
/// ```
/// use labelpress::protocol::packbits;
///
/// assert_eq!(packbits::encode(&[65, 65, 65]), vec![254, 65]);
/// assert_eq!(packbits::encode(&[1, 2, 3]), vec![2, 1, 2, 3]);
/// assert_eq!(packbits::encode(&[]), Vec::<u8>::new());
/// ```
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / MAX_RUN + 1);
    let mut pos = 0;

    while pos < data.len() {
        let run = run_length(data, pos);
        if run > 1 {
            debug_assert!(run <= MAX_RUN, "repeat run of {} exceeds {}", run, MAX_RUN);
            out.push((257 - run) as u8);
            out.push(data[pos]);
            pos += run;
            continue;
        }

        let len = literal_length(data, pos);
        debug_assert!(
            (1..=MAX_RUN).contains(&len),
            "literal run of {} outside 1..={}",
            len,
            MAX_RUN
        );
        out.push((len - 1) as u8);
        out.extend_from_slice(&data[pos..pos + len]);
        pos += len;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_run() {
        assert_eq!(encode(&[65, 65, 65]), vec![254, 65]);
        assert_eq!(encode(&[7, 7]), vec![255, 7]);
    }

    #[test]
    fn test_literal_run() {
        assert_eq!(encode(&[1, 2, 3]), vec![2, 1, 2, 3]);
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(encode(&[]), Vec::<u8>::new());
        assert_eq!(encode(&[42]), vec![0, 42]);
    }

    #[test]
    fn test_literal_stops_before_pair() {
        assert_eq!(encode(&[1, 2, 3, 3, 3, 4]), vec![1, 1, 2, 254, 3, 0, 4]);
        assert_eq!(encode(&[1, 2, 2]), vec![0, 1, 255, 2]);
    }

    #[test]
    fn test_long_run_split() {
        let out = encode(&[0xAA; 300]);
        // 128 + 128 + 44
        assert_eq!(out, vec![129, 0xAA, 129, 0xAA, 213, 0xAA]);
    }

    #[test]
    fn test_long_literal_split() {
        let data: Vec<u8> = (0..200u32).map(|i| (i % 251) as u8).collect();
        let out = encode(&data);
        assert_eq!(out[0], 127);
        assert_eq!(out[129], 71);
        assert_eq!(out.len(), 2 + 200);
    }

    #[test]
    fn test_all_white_raster_line() {
        // 16 bytes of zeros, as a blank 128-dot line
        assert_eq!(encode(&[0u8; 16]), vec![241, 0]);
    }
}

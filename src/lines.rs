//! Line/byte index and snippet helpers
//!
//! Line numbers are 1-based. Conversions clamp instead of failing: an offset
//! past the end maps to the last line and a line past the end maps to
//! `buf.len()`, so presentation code never has to handle an error here.

use crate::range::ByteRange;

/// Number of the line containing the byte at `offset`
///
/// Counts newlines strictly before `offset`. `offset == buf.len()` is valid
/// and larger offsets are clamped to it.
pub fn byte_to_line(buf: &[u8], offset: usize) -> usize {
    let end = offset.min(buf.len());
    1 + buf[..end].iter().filter(|&&b| b == b'\n').count()
}

/// Byte offset of the first byte of `line`
///
/// Lines `0` and `1` both map to offset 0. A line beyond the end of the
/// buffer clamps to `buf.len()`.
pub fn line_to_byte(buf: &[u8], line: usize) -> usize {
    if line <= 1 {
        return 0;
    }
    let mut remaining = line - 1;
    for (i, &b) in buf.iter().enumerate() {
        if b == b'\n' {
            remaining -= 1;
            if remaining == 0 {
                return i + 1;
            }
        }
    }
    buf.len()
}

/// Number of lines in `buf`; a trailing unterminated line counts, an empty buffer has none
pub fn line_count(buf: &[u8]) -> usize {
    let newlines = buf.iter().filter(|&&b| b == b'\n').count();
    match buf.last() {
        Some(&last) if last != b'\n' => newlines + 1,
        _ => newlines,
    }
}

/// Widen `range` to whole lines
///
/// `lo` moves back to the start of its line and `hi` forward to just past the
/// next newline (or the end of the buffer). An empty range at offset 0 grows
/// to cover the first line.
pub fn expand_to_lines(buf: &[u8], range: ByteRange) -> ByteRange {
    let mut lo = range.lo.min(buf.len());
    let mut hi = range.hi.min(buf.len()).max(lo);
    while lo > 0 && buf[lo - 1] != b'\n' {
        lo -= 1;
    }
    while hi < buf.len() && (hi == 0 || buf[hi - 1] != b'\n') {
        hi += 1;
    }
    ByteRange::new(lo, hi)
}

/// Offset from which to start showing leading context for `offset`
///
/// Walks back across at most `max_lines` line boundaries and stops on the
/// line start reached at the last one, or at the start of the buffer.
pub fn context_start(buf: &[u8], offset: usize, max_lines: usize) -> usize {
    let mut mark = offset.min(buf.len());
    let mut remaining = max_lines;
    while mark > 0 && remaining > 0 {
        if buf[mark - 1] == b'\n' {
            remaining -= 1;
            if remaining == 0 {
                break;
            }
        }
        mark -= 1;
    }
    mark
}

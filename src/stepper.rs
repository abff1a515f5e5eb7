//! Numeric and regex steppers
//!
//! `step` moves a range by whole lines or by runes, `search` finds the next
//! regex match after a position with wraparound. Both are pure functions of
//! their arguments.

use crate::error::AddressError;
use crate::range::{ByteRange, Direction};
use regex::bytes::Regex;
use tracing::trace;

/// Apply a count in `direction` to `range`
///
/// Forward steps start from `range.hi`, backward steps from `range.lo`. In
/// line mode a forward step selects the `count`-th line after `hi`. A
/// backward step counts the line start it snaps to as its first boundary, so
/// `count` 1 is the empty range there and `count` 2 the line before it. A
/// count of 0 just snaps to a line boundary. In rune mode the result is the
/// empty range after (or before) the `count`-th rune. `Direction::None`
/// counts from the start of the buffer.
pub fn step(
    buf: &[u8],
    range: ByteRange,
    direction: Direction,
    count: usize,
    char_offset: bool,
) -> Result<ByteRange, AddressError> {
    trace!(?range, ?direction, count, char_offset, "step");
    match (direction, char_offset) {
        (Direction::None, true) => forward_runes(buf, 0, count),
        (Direction::None, false) => forward_lines(buf, 0, count),
        (Direction::Forward, true) => forward_runes(buf, range.hi, count),
        (Direction::Forward, false) => forward_lines(buf, range.hi, count),
        (Direction::Backward, true) => backward_runes(buf, range.lo, count),
        (Direction::Backward, false) => backward_lines(buf, range.lo, count),
    }
}

fn forward_lines(buf: &[u8], mut hi: usize, count: usize) -> Result<ByteRange, AddressError> {
    // Snap to the start of the next line unless already on a boundary
    if hi > 0 {
        while hi < buf.len() && buf[hi - 1] != b'\n' {
            hi += 1;
        }
    }
    if count == 0 {
        return Ok(ByteRange::at(hi));
    }

    let mut lo = hi;
    let mut remaining = count;
    for pos in hi..buf.len() {
        if buf[pos] != b'\n' {
            continue;
        }
        remaining -= 1;
        if remaining == 0 {
            return Ok(ByteRange::new(lo, pos + 1));
        }
        lo = pos + 1;
    }

    // Unterminated last line
    if remaining == 1 && lo < buf.len() {
        return Ok(ByteRange::new(lo, buf.len()));
    }
    Err(AddressError::AddressOutOfRange)
}

fn backward_lines(buf: &[u8], mut lo: usize, count: usize) -> Result<ByteRange, AddressError> {
    while lo > 0 && buf[lo - 1] != b'\n' {
        lo -= 1;
    }
    if count == 0 {
        return Ok(ByteRange::at(lo));
    }

    // The snapped line start is the first boundary counted
    let mut hi = lo;
    let mut remaining = count;
    loop {
        remaining -= 1;
        if remaining == 0 {
            return Ok(ByteRange::new(lo, hi));
        }
        hi = lo;
        if lo == 0 {
            return Err(AddressError::AddressOutOfRange);
        }
        lo -= 1;
        while lo > 0 && buf[lo - 1] != b'\n' {
            lo -= 1;
        }
    }
}

fn forward_runes(buf: &[u8], hi: usize, count: usize) -> Result<ByteRange, AddressError> {
    let mut pos = hi;
    let mut remaining = count;
    while remaining > 0 && pos < buf.len() {
        pos += rune_len(&buf[pos..]);
        remaining -= 1;
    }
    if remaining > 0 {
        return Err(AddressError::AddressOutOfRange);
    }
    Ok(ByteRange::at(pos))
}

fn backward_runes(buf: &[u8], lo: usize, count: usize) -> Result<ByteRange, AddressError> {
    let mut pos = lo;
    let mut remaining = count;
    while remaining > 0 && pos > 0 {
        pos -= 1;
        if !is_continuation(buf[pos]) {
            remaining -= 1;
        }
    }
    if remaining > 0 {
        return Err(AddressError::AddressOutOfRange);
    }
    Ok(ByteRange::at(pos))
}

/// Length of the rune at the start of `bytes`; invalid UTF-8 counts as one byte
fn rune_len(bytes: &[u8]) -> usize {
    let window = &bytes[..bytes.len().min(4)];
    match std::str::from_utf8(window) {
        Ok(s) => s.chars().next().map_or(1, char::len_utf8),
        Err(e) if e.valid_up_to() > 0 => {
            let valid = &window[..e.valid_up_to()];
            // valid_up_to marks a UTF-8 boundary, so this cannot fail
            std::str::from_utf8(valid)
                .ok()
                .and_then(|s| s.chars().next())
                .map_or(1, char::len_utf8)
        }
        Err(_) => 1,
    }
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xc0 == 0x80
}

/// Find the first match of `pattern` at or after `hi`, wrapping to the start
///
/// Only forward (or unsigned) searches are supported.
pub fn search(
    buf: &[u8],
    hi: usize,
    pattern: &str,
    direction: Direction,
) -> Result<ByteRange, AddressError> {
    if direction == Direction::Backward {
        return Err(AddressError::UnsupportedDirection);
    }
    let re = Regex::new(pattern).map_err(|e| AddressError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let start = hi.min(buf.len());
    if let Some(m) = re.find(&buf[start..]) {
        return Ok(ByteRange::new(start + m.start(), start + m.end()));
    }
    if start > 0 {
        trace!(pattern, start, "no match after position, wrapping");
        if let Some(m) = re.find(buf) {
            return Ok(ByteRange::new(m.start(), m.end()));
        }
    }
    Err(AddressError::NoMatch {
        pattern: pattern.to_string(),
    })
}

//! Byte ranges and stepping directions shared by the address engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open byte interval `[lo, hi)` within a buffer
///
/// Every range handed out by the engine satisfies `lo <= hi <= buf.len()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByteRange {
    pub lo: usize,
    pub hi: usize,
}

impl ByteRange {
    pub fn new(lo: usize, hi: usize) -> Self {
        debug_assert!(lo <= hi, "range out of order: {lo} > {hi}");
        Self { lo, hi }
    }

    /// Empty range positioned at `pos`
    pub fn at(pos: usize) -> Self {
        Self { lo: pos, hi: pos }
    }

    pub fn is_empty(&self) -> bool {
        self.lo == self.hi
    }

    pub fn len(&self) -> usize {
        self.hi - self.lo
    }

    /// The bytes of `buf` covered by this range
    pub fn slice<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[self.lo..self.hi]
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{},#{}", self.lo, self.hi)
    }
}

/// Pending stepping direction while an address is evaluated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    /// No sign seen yet: counts are absolute from the start of the buffer
    #[default]
    None,
    Forward,
    Backward,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_basics() {
        let range = ByteRange::new(6, 12);
        assert_eq!(range.len(), 6);
        assert!(!range.is_empty());
        assert!(ByteRange::at(4).is_empty());
        assert_eq!(ByteRange::default(), ByteRange::at(0));
    }

    #[test]
    fn test_range_slice_and_display() {
        let buf = b"line1\nline2\n";
        let range = ByteRange::new(6, 12);
        assert_eq!(range.slice(buf), b"line2\n");
        assert_eq!(range.to_string(), "#6,#12");
    }
}

//! Fileprint rendering
//!
//! A fileprint is a whole file split around a highlighted line range, with a
//! mark placed a few lines before the highlight so a viewer can scroll there
//! and still see some leading context.

use crate::lines::{byte_to_line, context_start, expand_to_lines, line_to_byte};
use crate::range::ByteRange;
use crate::walk::{Step, Walk};
use colored::*;
use std::io::IsTerminal;

/// A buffer split into head, context, highlight and tail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fileprint<'a> {
    buf: &'a [u8],
    /// Start of the leading context
    pub mark: usize,
    /// Highlighted bytes, whole lines
    pub highlight: ByteRange,
}

impl<'a> Fileprint<'a> {
    /// Highlight lines `lo_line..=hi_line`
    ///
    /// `hi_line` below `lo_line` is raised to it. Lines past the end of the
    /// buffer clamp to its end, which leaves an empty highlight.
    pub fn new(buf: &'a [u8], lo_line: usize, hi_line: usize, context_lines: usize) -> Self {
        let hi_line = hi_line.max(lo_line);
        let lo = line_to_byte(buf, lo_line);
        let hi = line_to_byte(buf, hi_line.saturating_add(1));
        Self {
            buf,
            mark: context_start(buf, lo, context_lines),
            highlight: ByteRange::new(lo, hi),
        }
    }

    /// Highlight the lines touched by a resolved address
    pub fn from_range(buf: &'a [u8], range: ByteRange, context_lines: usize) -> Self {
        let highlight = expand_to_lines(buf, range);
        Self {
            buf,
            mark: context_start(buf, highlight.lo, context_lines),
            highlight,
        }
    }

    pub fn head(&self) -> &'a [u8] {
        &self.buf[..self.mark]
    }

    pub fn context(&self) -> &'a [u8] {
        &self.buf[self.mark..self.highlight.lo]
    }

    pub fn highlighted(&self) -> &'a [u8] {
        self.highlight.slice(self.buf)
    }

    pub fn tail(&self) -> &'a [u8] {
        &self.buf[self.highlight.hi..]
    }

    /// Lines from `start` to `end` with their line number and whether they are highlighted
    fn lines(&self, start: usize, end: usize) -> Vec<(usize, &'a [u8], bool)> {
        let mut result = Vec::new();
        let mut line_num = byte_to_line(self.buf, start);
        let mut pos = start;
        while pos < end {
            let line_end = self.buf[pos..end]
                .iter()
                .position(|&b| b == b'\n')
                .map_or(end, |i| pos + i);
            let highlighted = pos >= self.highlight.lo && pos < self.highlight.hi;
            result.push((line_num, &self.buf[pos..line_end], highlighted));
            line_num += 1;
            pos = line_end + 1;
        }
        result
    }
}

pub struct FileprintFormatter;

impl FileprintFormatter {
    /// Auto-detect if we should use colors
    pub fn should_use_color() -> bool {
        // Check NO_COLOR env var (https://no-color.org/)
        if std::env::var("NO_COLOR").is_ok() {
            return false;
        }

        std::io::stdout().is_terminal()
    }

    /// Format the context and highlighted lines, or the whole file when `full` is set
    pub fn format(fileprint: &Fileprint<'_>, use_color: bool, full: bool) -> String {
        let (start, end) = if full {
            (0, fileprint.buf.len())
        } else {
            (fileprint.mark, fileprint.highlight.hi)
        };

        let mut output = String::new();
        for (line_num, content, highlighted) in fileprint.lines(start, end) {
            let content = String::from_utf8_lossy(content);
            let indicator = if highlighted { ">" } else { " " };

            if use_color {
                let colored_line = if highlighted {
                    format!(
                        "L{}: {} {}\n",
                        line_num,
                        indicator.yellow().bold(),
                        content.yellow().bold()
                    )
                } else {
                    format!("L{}: {} {}\n", line_num, indicator, content.dimmed())
                };
                output.push_str(&colored_line);
            } else {
                output.push_str(&format!("L{}: {} {}\n", line_num, indicator, content));
            }
        }

        output
    }

    /// Format a file header followed by its fileprint
    pub fn format_snippet(file: &str, fileprint: &Fileprint<'_>, use_color: bool) -> String {
        let mut output = String::new();
        if use_color {
            output.push_str(&format!("{}\n", file.bold().cyan()));
        } else {
            output.push_str(&format!("{}\n", file));
        }
        output.push_str(&Self::format(fileprint, use_color, false));
        output
    }

    /// Format the step list of a walk
    pub fn format_walk(walk: &Walk, use_color: bool) -> String {
        let mut output = String::new();

        if use_color {
            output.push_str(&format!("{}\n\n", walk.title.bold().white()));
        } else {
            output.push_str(&format!("{}\n\n", walk.title));
        }

        if walk.steps.is_empty() {
            output.push_str("No steps.\n");
            return output;
        }

        for (i, step) in walk.steps.iter().enumerate() {
            output.push_str(&Self::format_step(i + 1, step, use_color));
        }

        let failed = walk.failed_steps().count();
        if failed > 0 {
            let summary = format!("\n{} of {} steps failed to resolve\n", failed, walk.steps.len());
            if use_color {
                output.push_str(&summary.red().to_string());
            } else {
                output.push_str(&summary);
            }
        }

        output
    }

    fn format_step(number: usize, step: &Step, use_color: bool) -> String {
        let mut output = String::new();
        if use_color {
            output.push_str(&format!(
                "{:>3}. {}  {}\n",
                number,
                step.to_string().cyan(),
                step.title.bold()
            ));
        } else {
            output.push_str(&format!("{:>3}. {}  {}\n", number, step, step.title));
        }

        if let Some(error) = &step.error {
            if use_color {
                output.push_str(&format!("     {} {}\n", "error:".red().bold(), error.red()));
            } else {
                output.push_str(&format!("     error: {}\n", error));
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &[u8] = b"l1\nl2\nl3\nl4\nl5\nl6\nl7\n";

    #[test]
    fn test_fileprint_segments() {
        let fp = Fileprint::new(TEXT, 6, 6, 4);
        assert_eq!(fp.highlighted(), b"l6\n");
        // Four boundaries back from line 6 is the start of line 3
        assert_eq!(fp.context(), b"l3\nl4\nl5\n");
        assert_eq!(fp.head(), b"l1\nl2\n");
        assert_eq!(fp.tail(), b"l7\n");
    }

    #[test]
    fn test_fileprint_clamps() {
        let fp = Fileprint::new(TEXT, 3, 1, 0);
        assert_eq!(fp.highlighted(), b"l3\n");
        assert_eq!(fp.mark, fp.highlight.lo);

        let fp = Fileprint::new(TEXT, 50, 60, 4);
        assert!(fp.highlight.is_empty());
        assert_eq!(fp.highlight.lo, TEXT.len());
    }

    #[test]
    fn test_fileprint_last_line_number_saturates() {
        let fp = Fileprint::new(TEXT, 1, usize::MAX, 4);
        assert_eq!(fp.highlight, ByteRange::new(0, TEXT.len()));
        assert_eq!(fp.tail(), b"");

        let fp = Fileprint::new(TEXT, usize::MAX, usize::MAX, 4);
        assert!(fp.highlight.is_empty());
        assert_eq!(fp.highlight.lo, TEXT.len());
    }

    #[test]
    fn test_fileprint_from_range() {
        let fp = Fileprint::from_range(TEXT, ByteRange::new(4, 7), 1);
        assert_eq!(fp.highlighted(), b"l2\nl3\n");
        assert_eq!(fp.mark, 3);
    }

    #[test]
    fn test_format_plain() {
        let fp = Fileprint::new(TEXT, 2, 3, 2);
        let output = FileprintFormatter::format(&fp, false, false);
        assert_eq!(output, "L1:   l1\nL2: > l2\nL3: > l3\n");
    }

    #[test]
    fn test_format_full() {
        let fp = Fileprint::new(b"a\nb\nc", 2, 2, 0);
        let output = FileprintFormatter::format(&fp, false, true);
        assert_eq!(output, "L1:   a\nL2: > b\nL3:   c\n");
    }

    #[test]
    fn test_format_snippet_header() {
        let fp = Fileprint::new(TEXT, 1, 1, 0);
        let output = FileprintFormatter::format_snippet("src/lib.rs", &fp, false);
        assert_eq!(output, "src/lib.rs\nL1: > l1\n");
    }

    #[test]
    fn test_format_invalid_utf8_is_lossy() {
        let buf = [b'a', 0xff, b'\n'];
        let fp = Fileprint::new(&buf, 1, 1, 0);
        let output = FileprintFormatter::format(&fp, false, false);
        assert_eq!(output, "L1: > a\u{fffd}\n");
    }
}

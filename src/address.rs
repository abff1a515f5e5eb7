//! Address Evaluator
//!
//! Resolves sam-style addresses (see Table II of the sam paper) to byte
//! ranges. An address is tokenized up front and then evaluated left to
//! right, with the pending direction and rune mode carried in an explicit
//! [`Evaluator`] state instead of loop-local flags.
//!
//! Supported syntax:
//! - `n` line n, `#n` rune n
//! - `+n`, `-n`, `+#n`, `-#n` relative steps; a bare sign means a count of 1
//!   (`-` alone is the start of the current line, `-2` the line before)
//! - `/re/` forward search with wraparound
//! - `$` end of buffer
//! - `a1,a2` from the start of a1 to the end of a2

use crate::error::AddressError;
use crate::range::{ByteRange, Direction};
use crate::stepper::{search, step};
use tracing::debug;

/// One lexical element of an address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Number(usize),
    Plus,
    Minus,
    Hash,
    /// Regex source with `\/` already unescaped
    Pattern(String),
    Comma,
    Dollar,
}

impl Token {
    fn is_direction(&self) -> bool {
        matches!(self, Token::Plus | Token::Minus)
    }
}

/// Split an address into tokens
pub fn tokenize(expr: &str) -> Result<Vec<Token>, AddressError> {
    let mut tokens = Vec::new();
    let mut chars = expr.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '#' => Token::Hash,
            ',' => Token::Comma,
            '$' => Token::Dollar,
            '0'..='9' => {
                let mut end = offset + 1;
                while let Some(&(i, d)) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    end = i + 1;
                    chars.next();
                }
                let literal = &expr[offset..end];
                let n = literal.parse::<usize>().map_err(|_| AddressError::ParseError {
                    literal: literal.to_string(),
                })?;
                Token::Number(n)
            }
            '/' => {
                // Runs to the closing slash, or to the end if there is none
                let mut pattern = String::new();
                while let Some((_, p)) = chars.next() {
                    match p {
                        '/' => break,
                        '\\' => match chars.next() {
                            Some((_, '/')) => pattern.push('/'),
                            Some((_, escaped)) => {
                                pattern.push('\\');
                                pattern.push(escaped);
                            }
                            None => pattern.push('\\'),
                        },
                        other => pattern.push(other),
                    }
                }
                Token::Pattern(pattern)
            }
            _ => return Err(AddressError::InvalidAddress { ch: c, offset }),
        };
        tokens.push(token);
    }

    Ok(tokens)
}

/// Resolve `expr` against `buf`, starting from `initial`
///
/// `initial` is normally `ByteRange::default()`, the empty range before
/// everything.
pub fn resolve(expr: &str, buf: &[u8], initial: ByteRange) -> Result<ByteRange, AddressError> {
    let tokens = tokenize(expr)?;
    let result = evaluate(&tokens, buf, initial);
    match &result {
        Ok(range) => debug!(expr, %range, "resolved address"),
        Err(e) => debug!(expr, error = %e, "address failed"),
    }
    result
}

/// Evaluate a token stream; a comma splits it into a simple address and the rest
fn evaluate(tokens: &[Token], buf: &[u8], initial: ByteRange) -> Result<ByteRange, AddressError> {
    let Some(comma) = tokens.iter().position(|t| *t == Token::Comma) else {
        return Evaluator::new(buf, initial).run(tokens);
    };

    let left = Evaluator::new(buf, initial).run(&tokens[..comma])?;
    let rest = &tokens[comma + 1..];
    let hi = if rest.is_empty() {
        buf.len()
    } else {
        evaluate(rest, buf, ByteRange::at(left.hi))?.hi
    };

    if left.lo > hi {
        return Err(AddressError::AddressOutOfRange);
    }
    Ok(ByteRange::new(left.lo, hi))
}

/// State for one comma-free address
struct Evaluator<'a> {
    buf: &'a [u8],
    range: ByteRange,
    pending: Direction,
    char_offset: bool,
}

impl<'a> Evaluator<'a> {
    fn new(buf: &'a [u8], initial: ByteRange) -> Self {
        Self {
            buf,
            range: initial,
            pending: Direction::None,
            char_offset: false,
        }
    }

    fn run(mut self, tokens: &[Token]) -> Result<ByteRange, AddressError> {
        let mut previous: Option<&Token> = None;

        for (i, token) in tokens.iter().enumerate() {
            match token {
                Token::Number(n) => self.apply_count(*n)?,
                Token::Plus | Token::Minus => {
                    if previous.is_some_and(Token::is_direction) {
                        self.finalize()?;
                    }
                    self.pending = if *token == Token::Plus {
                        Direction::Forward
                    } else {
                        Direction::Backward
                    };
                }
                Token::Hash => self.char_offset = true,
                Token::Dollar => {
                    self.range = ByteRange::at(self.buf.len());
                    // `$-`, `$/re/`: whatever follows steps from the end. A sign
                    // already pending (`+$`) steps from the end too.
                    let more = tokens.get(i + 1).is_some_and(|next| *next != Token::Comma);
                    if self.pending == Direction::None && more {
                        self.pending = Direction::Forward;
                    }
                }
                Token::Pattern(pattern) => {
                    self.range = search(self.buf, self.range.hi, pattern, self.pending)?;
                    self.pending = Direction::None;
                    self.char_offset = false;
                }
                Token::Comma => unreachable!("commas are split off before evaluation"),
            }
            previous = Some(token);
        }

        self.finalize()?;
        Ok(self.range)
    }

    fn apply_count(&mut self, count: usize) -> Result<(), AddressError> {
        self.range = step(self.buf, self.range, self.pending, count, self.char_offset)?;
        self.pending = Direction::None;
        self.char_offset = false;
        Ok(())
    }

    /// A sign with no count after it steps by one
    fn finalize(&mut self) -> Result<(), AddressError> {
        if self.pending != Direction::None {
            self.range = step(self.buf, self.range, self.pending, 1, self.char_offset)?;
            self.pending = Direction::None;
        }
        Ok(())
    }
}

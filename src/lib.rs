//! codewalk: sam-style address resolution for code walks
//!
//! The core is a small address evaluator: given a buffer and an address such
//! as `12,20`, `/pattern/`, `+#5` or `$`, it returns the byte range the
//! address selects. Around it sit line/byte conversions, snippet helpers, a
//! walk-document loader and a fileprint renderer used by the binary.

pub mod address;
pub mod config;
pub mod error;
pub mod error_helpers;
pub mod fileprint;
pub mod lines;
pub mod logger;
pub mod range;
pub mod stepper;
pub mod walk;

// Re-export commonly used types for convenience
pub use address::{resolve, tokenize, Token};
pub use error::AddressError;
pub use fileprint::{Fileprint, FileprintFormatter};
pub use lines::{byte_to_line, context_start, expand_to_lines, line_count, line_to_byte};
pub use range::{ByteRange, Direction};
pub use stepper::{search, step};
pub use walk::{Step, StepLocation, Walk};

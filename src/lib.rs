//! # Smart file encoding
//!
//! `smartfile` stores a file either as a single pattern repeated verbatim, or
//! as a table of distinct fixed-size blocks plus the index sequence that puts
//! them back in order. Decoding reproduces the original bytes exactly.
//!
//! ## Example
//!
//! ```rust
//! use smartfile::{BlockSize, Format, decode, encode};
//!
//! // 0F AB BB repeated 11 times: stored as a 17-byte header plus the pattern.
//! let original = [0x0Fu8, 0xAB, 0xBB].repeat(11);
//!
//! let mut encoded = Vec::new();
//! let format = encode(&original, BlockSize::new(4).unwrap(), &mut encoded).unwrap();
//! assert_eq!(format, Format::Pattern);
//! assert_eq!(encoded.len(), 20);
//!
//! let mut buffer = Vec::new();
//! decode(&encoded, &mut buffer).expect("Decoding failed");
//! assert_eq!(buffer, original);
//! ```

#![forbid(unsafe_code)]

pub mod decode;
pub mod dedup;
pub mod encode;
pub mod error;
pub mod format;
pub mod fs;
pub mod pattern;
pub mod report;
pub mod sample;

pub use decode::decode;
pub use dedup::{BlockSize, BlockTable, deduplicate};
pub use encode::encode;
pub use error::{Error, FormatError, Result};
pub use format::{Format, SmartFile};
pub use pattern::{Pattern, find_pattern};
pub use report::{Report, inspect};

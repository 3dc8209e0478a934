//! Shared foundational types used across the Kairos timing toolchain.
//!
//! This crate provides interned identifiers for cell, net and port names,
//! frequency values, content hashing for design checksums, and the common
//! internal-error result type.

#![warn(missing_docs)]

pub mod frequency;
pub mod hash;
pub mod ident;
pub mod result;

pub use frequency::{Frequency, ParseFrequencyError};
pub use hash::{ContentHash, ContentHashBuilder};
pub use ident::{Ident, Interner};
pub use result::{InternalError, KairosResult};

//! Common utilities for b3dkit.
//!
//! This crate provides the foundational pieces shared by the B3D and RES crates:
//!
//! - [`BinaryReader`] - Zero-copy little-endian reading from byte slices
//! - [`BinaryWriter`] - Little-endian writing with reserve/backpatch [`Placeholder`]s
//! - [`text`] - cp1251 text codec, NUL-terminated strings and fixed 32-byte names
//! - [`NameFilter`] - Wildcard (fnmatch-style) record selection

mod error;
mod filter;
mod reader;
mod writer;

pub mod text;

pub use error::{Error, Result};
pub use filter::NameFilter;
pub use reader::BinaryReader;
pub use writer::{BinaryWriter, Placeholder};

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Re-export memchr for NUL-terminator searching
pub use memchr;

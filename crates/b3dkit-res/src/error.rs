//! Error types for RES parsing and writing.

use thiserror::Error;

use crate::SectionKind;

/// Errors that can occur when reading, transforming or writing RES archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] b3dkit_common::Error),

    /// A section header that is not `"<NAME> <count>"`.
    #[error("invalid section header {0:?}")]
    InvalidHeader(String),

    /// A section name outside the eight known ones.
    #[error("unknown section {0:?}")]
    UnknownSection(String),

    /// The same section appears twice.
    #[error("section {0} appears more than once")]
    DuplicateSection(SectionKind),

    /// Two records of one section share a name.
    #[error("{section} has more than one record named {name:?}")]
    DuplicateRecord { section: SectionKind, name: String },

    /// A record row that cannot be parsed.
    #[error("invalid {section} record {row:?}")]
    InvalidRecord { section: SectionKind, row: String },

    /// A cross-reference that does not resolve to a record.
    #[error("{record:?}: {key} {index} does not resolve to one of {count} {section} records")]
    IndexOutOfRange {
        section: SectionKind,
        record: String,
        key: String,
        index: u32,
        count: usize,
    },

    /// A material whose parent material is gone.
    #[error("material {record:?} inherits from removed material {parent:?}")]
    DanglingParent { record: String, parent: String },

    /// A selection mode the section does not support.
    #[error("{section} cannot be selected by reference")]
    InvalidSelection { section: SectionKind },
}

/// Result type for RES operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for B3D parsing and writing.

use thiserror::Error;

/// Errors that can occur when reading, transforming or writing B3D archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] b3dkit_common::Error),

    /// Invalid magic bytes (not a B3D file).
    #[error("invalid B3D magic: expected 'b3d\\0', got {actual:?}")]
    InvalidMagic { actual: Vec<u8> },

    /// A 4-byte chunk marker that is none of begin/end/group/end-chunks.
    #[error("unknown chunk marker {marker:#010x} at offset {offset}")]
    UnknownChunk { marker: u32, offset: usize },

    /// A node type tag with no known body layout.
    #[error("unknown node type {node_type} at offset {offset}")]
    UnknownNodeType { node_type: u32, offset: usize },

    /// An end marker with no open node.
    #[error("end marker at offset {offset} closes no node")]
    UnbalancedEnd { offset: usize },

    /// The node section ran out before the end-chunks marker.
    #[error("node section ends without an end-chunks marker")]
    MissingEndChunks,

    /// Vertex data does not have the shape its polygon format requires.
    #[error("vertex layout does not match format {format:#x} of a type {node_type} node")]
    VertexLayoutMismatch { node_type: u32, format: u32 },

    /// A root name that is not present in the archive.
    #[error("root {0:?} not found")]
    UnknownRoot(String),

    /// A texture index outside the accompanying materials list.
    #[error("root {root:?} references texnum {texnum} but only {count} materials exist")]
    TexnumOutOfRange { root: String, texnum: u32, count: usize },
}

/// Result type for B3D operations.
pub type Result<T> = std::result::Result<T, Error>;

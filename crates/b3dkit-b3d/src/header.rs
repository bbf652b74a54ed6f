//! B3D file header structure.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// B3D file header.
///
/// Every offset and size is measured in 4-byte words.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct B3dHeader {
    /// Magic bytes, `b3d\0`.
    pub magic: [u8; 4],
    /// Total file size.
    pub total_words: u32,
    /// Offset of the materials section (count + names).
    pub materials_offset: u32,
    /// Size of the materials section.
    pub materials_size: u32,
    /// Offset of the node section (begin-chunks marker onwards).
    pub nodes_offset: u32,
    /// Size of the node section, including both boundary markers.
    pub nodes_size: u32,
}

impl B3dHeader {
    /// The magic bytes at the start of a B3D file.
    pub const MAGIC: &'static [u8; 4] = b"b3d\0";

    /// Size of the header in bytes.
    pub const SIZE: usize = 24;

    /// Check the magic bytes.
    pub fn is_valid(&self) -> bool {
        &self.magic == Self::MAGIC
    }
}

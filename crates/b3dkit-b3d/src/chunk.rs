//! Chunk markers that delimit the B3D node tree.

use b3dkit_common::{BinaryReader, BinaryWriter};

use crate::{Error, Result};

/// One of the four 4-byte markers of the node section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunk {
    /// Opens a node (also used once as the begin-chunks marker).
    Begin,
    /// Closes the innermost open node.
    End,
    /// Separates children; carries no structure.
    Group,
    /// Terminates the node section.
    EndChunks,
}

impl Chunk {
    pub const BEGIN: u32 = 0x0000_014D;
    pub const END: u32 = 0x0000_022B;
    pub const GROUP: u32 = 0x0000_01BC;
    pub const END_CHUNKS: u32 = 0x0000_00DE;

    /// Map a raw marker to a chunk, if it is one.
    pub fn from_marker(marker: u32) -> Option<Self> {
        match marker {
            Self::BEGIN => Some(Self::Begin),
            Self::END => Some(Self::End),
            Self::GROUP => Some(Self::Group),
            Self::END_CHUNKS => Some(Self::EndChunks),
            _ => None,
        }
    }

    /// The raw 4-byte marker value.
    pub fn marker(self) -> u32 {
        match self {
            Self::Begin => Self::BEGIN,
            Self::End => Self::END,
            Self::Group => Self::GROUP,
            Self::EndChunks => Self::END_CHUNKS,
        }
    }

    /// Read the next marker.
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        if reader.is_empty() {
            return Err(Error::MissingEndChunks);
        }
        let offset = reader.position();
        let marker = reader.read_u32()?;
        Self::from_marker(marker).ok_or(Error::UnknownChunk { marker, offset })
    }

    /// Write this marker.
    pub fn write(self, writer: &mut BinaryWriter) -> Result<()> {
        writer.write_u32(self.marker())?;
        Ok(())
    }
}

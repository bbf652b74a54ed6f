//! B3D container writer.

use b3dkit_common::BinaryWriter;

use crate::chunk::Chunk;
use crate::{B3dHeader, Result};

/// Emit a complete archive from a materials list and root blobs.
///
/// Each blob is a root's bytes from its begin marker through its end marker,
/// with texnums already rewritten for `materials`. The five header size
/// fields are reserved up front and backpatched once the layout is known.
pub fn write_archive<'a, I>(materials: &[String], roots: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut writer = BinaryWriter::with_capacity(4096);
    writer.write_bytes(B3dHeader::MAGIC)?;
    let total_words = writer.reserve_u32()?;
    let materials_offset = writer.reserve_u32()?;
    let materials_size = writer.reserve_u32()?;
    let nodes_offset = writer.reserve_u32()?;
    let nodes_size = writer.reserve_u32()?;

    let materials_start = writer.word_position();
    writer.write_u32(materials.len() as u32)?;
    for material in materials {
        writer.write_name32(material)?;
    }

    let nodes_start = writer.word_position();
    Chunk::Begin.write(&mut writer)?;
    let mut root_count = 0usize;
    for root in roots {
        writer.write_bytes(root)?;
        root_count += 1;
    }
    Chunk::EndChunks.write(&mut writer)?;
    let end = writer.word_position();

    writer.patch_u32(total_words, end);
    writer.patch_u32(materials_offset, materials_start);
    writer.patch_u32(materials_size, nodes_start - materials_start);
    writer.patch_u32(nodes_offset, nodes_start);
    writer.patch_u32(nodes_size, end - nodes_start);

    log::debug!(
        "wrote B3D: {} materials, {} roots, {} words",
        materials.len(),
        root_count,
        end
    );
    Ok(writer.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use b3dkit_common::{BinaryReader, FromBytes};

    #[test]
    fn test_empty_archive_layout() {
        let bytes = write_archive(&["wood".to_string()], std::iter::empty()).unwrap();
        // header 24 + count 4 + one name 32 + two markers 8
        assert_eq!(bytes.len(), 68);

        let header = B3dHeader::read_from_bytes(&bytes[..B3dHeader::SIZE]).unwrap();
        assert!(header.is_valid());
        let (total, mat_off, mat_size, nodes_off, nodes_size) = (
            header.total_words,
            header.materials_offset,
            header.materials_size,
            header.nodes_offset,
            header.nodes_size,
        );
        assert_eq!(total, 17);
        assert_eq!(mat_off, 6);
        assert_eq!(mat_size, 9);
        assert_eq!(nodes_off, 15);
        assert_eq!(nodes_size, 2);

        let mut reader = BinaryReader::new_at(&bytes, nodes_off as usize * 4);
        assert_eq!(reader.read_u32().unwrap(), Chunk::BEGIN);
        assert_eq!(reader.read_u32().unwrap(), Chunk::END_CHUNKS);
    }

    #[test]
    fn test_roots_are_concatenated() {
        let a = [1u8, 2, 3, 4];
        let b = [5u8, 6, 7, 8];
        let bytes = write_archive(&[], [&a[..], &b[..]]).unwrap();
        assert_eq!(&bytes[32..40], &[1, 2, 3, 4, 5, 6, 7, 8]);
    }
}

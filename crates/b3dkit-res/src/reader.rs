//! Section reader.

use std::ops::Range;

use b3dkit_common::{text, BinaryReader};
use rustc_hash::FxHashSet;

use crate::section::RecordShape;
use crate::{Error, Result, SectionKind};

/// A record located in the archive bytes.
///
/// Payloads are not copied; they are read through the stored ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Record {
    /// Record name: the row without flags, the sound name, or the whole row for COLORS.
    pub name: String,
    /// The full text row.
    pub row: String,
    /// Bytes of the whole record, row through payload.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub span: Range<usize>,
    /// Payload bytes of a blob record.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub payload: Option<Range<usize>>,
}

/// A section and its records in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Section {
    pub kind: SectionKind,
    pub records: Vec<Record>,
}

/// Name of a record given its row.
pub(crate) fn record_name(kind: SectionKind, row: &str) -> &str {
    match kind {
        SectionKind::Colors => row,
        SectionKind::Sounds => row.rsplit_once(' ').map_or(row, |(name, _)| name),
        _ => row.split(' ').next().unwrap_or(row),
    }
}

/// Parse a `"<NAME> <count>"` header.
pub(crate) fn parse_header(header: &str) -> Result<(SectionKind, usize)> {
    let (name, count) = header
        .split_once(' ')
        .ok_or_else(|| Error::InvalidHeader(header.to_owned()))?;
    let kind = SectionKind::from_name(name).ok_or_else(|| Error::UnknownSection(name.to_owned()))?;
    let count = count
        .trim()
        .parse()
        .map_err(|_| Error::InvalidHeader(header.to_owned()))?;
    Ok((kind, count))
}

/// Read the next section, or `None` at the end of the sections.
///
/// An empty header or the end of the data ends the sections. Record names
/// must be unique within a section; COLORS rows are not names and may repeat.
pub(crate) fn read_section(reader: &mut BinaryReader<'_>) -> Result<Option<Section>> {
    if reader.is_empty() {
        return Ok(None);
    }
    let header = text::decode(reader.read_cstring_bytes()?);
    if header.is_empty() {
        return Ok(None);
    }
    let (kind, count) = parse_header(&header)?;

    let mut records = Vec::with_capacity(count.min(reader.remaining()));
    for _ in 0..count {
        let start = reader.position();
        let row = text::decode(reader.read_cstring_bytes()?).into_owned();
        let payload = match kind.shape() {
            RecordShape::Blob => {
                let size = reader.read_u32()? as usize;
                let payload_start = reader.position();
                reader.skip(size)?;
                Some(payload_start..payload_start + size)
            }
            RecordShape::Text => None,
        };
        records.push(Record {
            name: record_name(kind, &row).to_owned(),
            row,
            span: start..reader.position(),
            payload,
        });
    }

    if kind != SectionKind::Colors {
        let mut seen = FxHashSet::default();
        if let Some(record) = records.iter().find(|&r| !seen.insert(r.name.as_str())) {
            return Err(Error::DuplicateRecord {
                section: kind,
                name: record.name.clone(),
            });
        }
    }

    log::debug!("{kind}: {} records", records.len());
    Ok(Some(Section { kind, records }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use b3dkit_common::BinaryWriter;

    #[test]
    fn test_record_names() {
        assert_eq!(record_name(SectionKind::TextureFiles, "wall.txr noload"), "wall.txr");
        assert_eq!(record_name(SectionKind::Materials, "wall tex 1"), "wall");
        assert_eq!(record_name(SectionKind::Sounds, "big engine 2"), "big engine");
        assert_eq!(record_name(SectionKind::Colors, "12 40 3"), "12 40 3");
    }

    #[test]
    fn test_headers() {
        assert_eq!(parse_header("SOUNDS 4").unwrap(), (SectionKind::Sounds, 4));
        assert!(matches!(parse_header("SOUNDS"), Err(Error::InvalidHeader(_))));
        assert!(matches!(parse_header("SOUNDS x"), Err(Error::InvalidHeader(_))));
        assert!(matches!(parse_header("MUSIC 1"), Err(Error::UnknownSection(_))));
    }

    #[test]
    fn test_read_sections() {
        let mut writer = BinaryWriter::new();
        writer.write_cstring("TEXTUREFILES 2").unwrap();
        writer.write_cstring("a.txr").unwrap();
        writer.write_u32(3).unwrap();
        writer.write_bytes(&[1, 2, 3]).unwrap();
        writer.write_cstring("b.txr memfix").unwrap();
        writer.write_u32(0).unwrap();
        writer.write_cstring("MATERIALS 1").unwrap();
        writer.write_cstring("m tex 1").unwrap();
        writer.write_cstring("").unwrap();
        writer.write_cstring("SOUNDS 0").unwrap();
        let bytes = writer.finish().unwrap();

        let mut reader = BinaryReader::new(&bytes);
        let textures = read_section(&mut reader).unwrap().unwrap();
        assert_eq!(textures.kind, SectionKind::TextureFiles);
        assert_eq!(textures.records.len(), 2);
        assert_eq!(textures.records[1].name, "b.txr");
        assert_eq!(textures.records[1].row, "b.txr memfix");
        let payload = textures.records[0].payload.clone().unwrap();
        assert_eq!(&bytes[payload], &[1, 2, 3]);
        assert_eq!(textures.records[0].span.end, textures.records[1].span.start);

        let materials = read_section(&mut reader).unwrap().unwrap();
        assert_eq!(materials.records[0].name, "m");
        assert_eq!(materials.records[0].payload, None);

        // The empty header stops reading.
        assert_eq!(read_section(&mut reader).unwrap(), None);
    }

    #[test]
    fn test_truncated_payload() {
        let mut writer = BinaryWriter::new();
        writer.write_cstring("BACKFILES 1").unwrap();
        writer.write_cstring("sky.txr").unwrap();
        writer.write_u32(100).unwrap();
        let bytes = writer.finish().unwrap();
        assert!(matches!(
            read_section(&mut BinaryReader::new(&bytes)),
            Err(Error::Common(_))
        ));
    }
}

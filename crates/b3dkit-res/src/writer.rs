//! RES writer.

use std::borrow::Cow;

use b3dkit_common::BinaryWriter;

use crate::{Result, SectionKind};

/// A record queued for output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutRecord<'a> {
    /// A record copied byte for byte from a source archive.
    Raw(&'a [u8]),
    Blob { row: String, payload: Cow<'a, [u8]> },
    Text(String),
}

impl<'a> OutRecord<'a> {
    pub fn blob(row: impl Into<String>, payload: impl Into<Cow<'a, [u8]>>) -> Self {
        OutRecord::Blob {
            row: row.into(),
            payload: payload.into(),
        }
    }

    pub fn text(row: impl Into<String>) -> Self {
        OutRecord::Text(row.into())
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        match self {
            OutRecord::Raw(bytes) => writer.write_bytes(bytes)?,
            OutRecord::Blob { row, payload } => {
                writer.write_cstring(row)?;
                writer.write_u32(payload.len() as u32)?;
                writer.write_bytes(payload)?;
            }
            OutRecord::Text(row) => writer.write_cstring(row)?,
        }
        Ok(())
    }
}

/// Collects records per section and writes all eight sections in on-disk order.
///
/// Sections with no records are still written, with a count of 0.
#[derive(Debug, Default)]
pub struct ResWriter<'a> {
    sections: [Vec<OutRecord<'a>>; 8],
}

impl<'a> ResWriter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: SectionKind, record: OutRecord<'a>) {
        self.sections[kind.index()].push(record);
    }

    pub fn extend<I>(&mut self, kind: SectionKind, records: I)
    where
        I: IntoIterator<Item = OutRecord<'a>>,
    {
        self.sections[kind.index()].extend(records);
    }

    pub fn count(&self, kind: SectionKind) -> usize {
        self.sections[kind.index()].len()
    }

    pub fn finish(self) -> Result<Vec<u8>> {
        let mut writer = BinaryWriter::with_capacity(4096);
        for (kind, records) in SectionKind::ALL.into_iter().zip(&self.sections) {
            writer.write_cstring(&format!("{} {}", kind.name(), records.len()))?;
            for record in records {
                record.write(&mut writer)?;
            }
            log::debug!("wrote {kind}: {} records", records.len());
        }
        Ok(writer.finish()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_archive_has_every_header() {
        let bytes = ResWriter::new().finish().unwrap();
        let expected = b"PALETTEFILES 0\0SOUNDFILES 0\0BACKFILES 0\0MASKFILES 0\0\
TEXTUREFILES 0\0COLORS 0\0MATERIALS 0\0SOUNDS 0\0";
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_records_land_in_their_section() {
        let mut writer = ResWriter::new();
        writer.push(SectionKind::Sounds, OutRecord::text("engine 1"));
        writer.push(SectionKind::SoundFiles, OutRecord::blob("rev.wav", vec![7u8, 8]));
        writer.push(SectionKind::SoundFiles, OutRecord::Raw(b"x\0\0\0\0\0"));
        assert_eq!(writer.count(SectionKind::SoundFiles), 2);
        let bytes = writer.finish().unwrap();

        let expected: &[u8] = b"PALETTEFILES 0\0SOUNDFILES 2\0rev.wav\0\x02\0\0\0\x07\x08x\0\0\0\0\0\
BACKFILES 0\0MASKFILES 0\0TEXTUREFILES 0\0COLORS 0\0MATERIALS 0\0SOUNDS 1\0engine 1\0";
        assert_eq!(bytes, expected);
    }
}

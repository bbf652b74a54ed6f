//! RES archive index.

use std::path::Path;

use b3dkit_common::BinaryReader;

use crate::reader::{read_section, Record, Section};
use crate::{Error, Material, Result, SectionKind, Sound};

/// A parsed RES archive.
///
/// The archive owns the file bytes; records are addressed by byte range.
/// Sections absent from the file read as empty.
#[derive(Debug, Clone)]
pub struct ResArchive {
    data: Vec<u8>,
    sections: [Option<Section>; 8],
}

impl ResArchive {
    /// Read and parse a RES file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_vec(data)
    }

    /// Parse a RES archive from bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::from_vec(data.to_vec())
    }

    /// Parse a RES archive, taking ownership of the bytes.
    pub fn from_vec(data: Vec<u8>) -> Result<Self> {
        let mut sections: [Option<Section>; 8] = Default::default();
        let mut reader = BinaryReader::new(&data);
        while let Some(section) = read_section(&mut reader)? {
            let slot = &mut sections[section.kind.index()];
            if slot.is_some() {
                return Err(Error::DuplicateSection(section.kind));
            }
            *slot = Some(section);
        }
        log::debug!(
            "parsed RES: {} sections",
            sections.iter().filter(|s| s.is_some()).count()
        );
        Ok(Self { data, sections })
    }

    /// The raw file bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// A section, if the file has it.
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections[kind.index()].as_ref()
    }

    /// Sections present in the file, in on-disk order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().flatten()
    }

    /// Records of a section; empty if the section is absent.
    pub fn records(&self, kind: SectionKind) -> &[Record] {
        self.section(kind)
            .map(|section| section.records.as_slice())
            .unwrap_or(&[])
    }

    /// Record names of a section in file order.
    pub fn names(&self, kind: SectionKind) -> Vec<&str> {
        self.records(kind).iter().map(|r| r.name.as_str()).collect()
    }

    /// The payload of a blob record.
    pub fn payload(&self, record: &Record) -> Option<&[u8]> {
        record.payload.clone().map(|range| &self.data[range])
    }

    /// The whole record as stored, row through payload.
    pub fn record_bytes(&self, record: &Record) -> &[u8] {
        &self.data[record.span.clone()]
    }

    /// Parse every MATERIALS row.
    pub fn materials(&self) -> Result<Vec<Material>> {
        self.records(SectionKind::Materials)
            .iter()
            .map(|record| Material::parse(&record.row))
            .collect()
    }

    /// Parse every SOUNDS row.
    pub fn sounds(&self) -> Result<Vec<Sound>> {
        self.records(SectionKind::Sounds)
            .iter()
            .map(|record| Sound::parse(&record.row))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::section::RecordShape;
    use crate::writer::{OutRecord, ResWriter};

    /// Build an archive from blob names and text rows per section.
    pub(crate) fn build(sections: &[(SectionKind, &[&str])]) -> Vec<u8> {
        let mut writer = ResWriter::new();
        for &(kind, rows) in sections {
            for (index, row) in rows.iter().enumerate() {
                let record = match kind.shape() {
                    RecordShape::Blob => OutRecord::blob(*row, vec![index as u8; index + 1]),
                    RecordShape::Text => OutRecord::text(*row),
                };
                writer.push(kind, record);
            }
        }
        writer.finish().unwrap()
    }

    #[test]
    fn test_parse_all_sections() {
        let data = build(&[
            (SectionKind::TextureFiles, &["t1.txr", "t2.txr noload"]),
            (SectionKind::Materials, &["m1 tex 2"]),
            (SectionKind::Sounds, &["engine 1"]),
            (SectionKind::SoundFiles, &["rev.wav"]),
        ]);
        let archive = ResArchive::parse(&data).unwrap();
        assert_eq!(archive.sections().count(), 8);
        assert_eq!(archive.names(SectionKind::TextureFiles), vec!["t1.txr", "t2.txr"]);
        assert!(archive.records(SectionKind::Colors).is_empty());

        let texture = &archive.records(SectionKind::TextureFiles)[1];
        assert_eq!(archive.payload(texture), Some(&[1u8, 1][..]));

        let materials = archive.materials().unwrap();
        assert_eq!(materials[0].name, "m1");
        assert_eq!(archive.sounds().unwrap()[0].soundfile, 1);
    }

    #[test]
    fn test_missing_sections_read_as_empty() {
        let archive = ResArchive::parse(b"SOUNDS 0\0").unwrap();
        assert_eq!(archive.sections().count(), 1);
        assert!(archive.section(SectionKind::Materials).is_none());
        assert!(archive.records(SectionKind::Materials).is_empty());
        assert!(archive.materials().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_section() {
        assert!(matches!(
            ResArchive::parse(b"SOUNDS 0\0SOUNDS 0\0"),
            Err(Error::DuplicateSection(SectionKind::Sounds))
        ));
    }

    #[test]
    fn test_duplicate_record_names() {
        let data = build(&[
            (SectionKind::TextureFiles, &["a.txr", "a.txr noload"]),
            (SectionKind::Materials, &["m1 tex 1", "m2 tex 2"]),
        ]);
        assert!(matches!(
            ResArchive::parse(&data),
            Err(Error::DuplicateRecord { section: SectionKind::TextureFiles, name }) if name == "a.txr"
        ));

        let data = build(&[(SectionKind::Sounds, &["engine 1", "engine 2"])]);
        assert!(matches!(
            ResArchive::parse(&data),
            Err(Error::DuplicateRecord { section: SectionKind::Sounds, .. })
        ));

        // Palette rows may repeat.
        let data = build(&[(SectionKind::Colors, &["0 0 0", "0 0 0"])]);
        assert_eq!(ResArchive::parse(&data).unwrap().records(SectionKind::Colors).len(), 2);
    }
}

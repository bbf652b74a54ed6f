//! Record selection.

use b3dkit_common::NameFilter;

use crate::reader::Record;
use crate::{Error, Result, SectionKind};

/// How the records of one section are chosen.
#[derive(Debug, Clone, Default)]
pub enum Selection {
    /// Every record.
    #[default]
    All,
    /// Records whose name matches the filter. An empty filter selects nothing.
    Matching(NameFilter),
    /// Records referenced by the other selected records.
    ///
    /// SOUNDFILES follow SOUNDS; TEXTUREFILES and MASKFILES follow MATERIALS.
    Ref,
}

impl Selection {
    /// Select by wildcard patterns.
    pub fn patterns<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Selection::Matching(NameFilter::patterns(patterns)?))
    }

    /// Select exactly the named records.
    pub fn exact<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Selection::Matching(NameFilter::exact(names))
    }

    /// Select nothing.
    pub fn none() -> Self {
        Selection::Matching(NameFilter::default())
    }

    /// Whether the section can be selected by reference.
    pub fn supports_ref(kind: SectionKind) -> bool {
        matches!(
            kind,
            SectionKind::SoundFiles | SectionKind::TextureFiles | SectionKind::MaskFiles
        )
    }

    /// Check the selection is valid for a section.
    pub fn validate(&self, kind: SectionKind) -> Result<()> {
        match self {
            Selection::Ref if !Self::supports_ref(kind) => {
                Err(Error::InvalidSelection { section: kind })
            }
            _ => Ok(()),
        }
    }

    /// Indices of the directly selected records, in file order.
    ///
    /// `Ref` selections are resolved elsewhere and select nothing here.
    pub(crate) fn resolve(&self, records: &[Record]) -> Vec<usize> {
        match self {
            Selection::All => (0..records.len()).collect(),
            Selection::Matching(filter) => records
                .iter()
                .enumerate()
                .filter(|(_, record)| filter.matches(&record.name))
                .map(|(index, _)| index)
                .collect(),
            Selection::Ref => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(names: &[&str]) -> Vec<Record> {
        names
            .iter()
            .map(|name| Record {
                name: name.to_string(),
                row: name.to_string(),
                span: 0..0,
                payload: None,
            })
            .collect()
    }

    #[test]
    fn test_resolve() {
        let records = records(&["wall.txr", "roof.txr", "wall2.txr"]);
        assert_eq!(Selection::All.resolve(&records), vec![0, 1, 2]);
        assert_eq!(
            Selection::patterns(["wall*"]).unwrap().resolve(&records),
            vec![0, 2]
        );
        assert_eq!(Selection::exact(["roof.txr"]).resolve(&records), vec![1]);
        assert!(Selection::none().resolve(&records).is_empty());
        assert!(Selection::patterns(["nothing*"]).unwrap().resolve(&records).is_empty());
    }

    #[test]
    fn test_ref_is_limited_to_file_sections() {
        assert!(Selection::Ref.validate(SectionKind::TextureFiles).is_ok());
        assert!(Selection::Ref.validate(SectionKind::SoundFiles).is_ok());
        assert!(matches!(
            Selection::Ref.validate(SectionKind::Materials),
            Err(Error::InvalidSelection {
                section: SectionKind::Materials
            })
        ));
        assert!(Selection::All.validate(SectionKind::Colors).is_ok());
    }
}

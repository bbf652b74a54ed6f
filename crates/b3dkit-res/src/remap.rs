//! Cross-reference renumbering.
//!
//! Maps work on 0-based slots; stored indices are 1-based with 0 meaning
//! "no reference", and are converted only in [`IndexMap::get`].

use rustc_hash::FxHashMap;

use crate::{Error, Material, Result, SectionKind, Sound};

/// Old index to new index for the records of one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMap {
    slots: Vec<Option<u32>>,
}

impl IndexMap {
    /// Renumber the kept records densely, in the order given.
    pub fn keep(count: usize, kept: &[usize]) -> Self {
        let mut slots = vec![None; count];
        for (new, &old) in kept.iter().enumerate() {
            slots[old] = Some(new as u32);
        }
        Self { slots }
    }

    /// Map each old record to the position of the same name in `new`.
    pub fn by_name<A, B>(old: &[A], new: &[B]) -> Self
    where
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut positions: FxHashMap<&str, u32> = FxHashMap::default();
        for (index, name) in new.iter().enumerate() {
            positions.entry(name.as_ref()).or_insert(index as u32);
        }
        Self {
            slots: old
                .iter()
                .map(|name| positions.get(name.as_ref()).copied())
                .collect(),
        }
    }

    /// Number of old records.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Translate a stored index. `0` maps to `0`; dropped or out of range gives `None`.
    pub fn get(&self, index: u32) -> Option<u32> {
        if index == 0 {
            return Some(0);
        }
        self.slots
            .get(index as usize - 1)
            .copied()
            .flatten()
            .map(|slot| slot + 1)
    }
}

/// Fail unless a stored index is 0 or within `count` records.
pub(crate) fn check_range(
    section: SectionKind,
    record: &str,
    key: &str,
    index: u32,
    count: usize,
) -> Result<()> {
    if index as usize > count {
        return Err(Error::IndexOutOfRange {
            section,
            record: record.to_owned(),
            key: key.to_owned(),
            index,
            count,
        });
    }
    Ok(())
}

/// Index maps for the sections that records point into.
///
/// Sections without a map pass their indices through unchanged, after a
/// range check against the source count when one was given.
#[derive(Debug, Default)]
pub(crate) struct Remapper {
    maps: [Option<IndexMap>; 8],
    counts: [Option<usize>; 8],
}

impl Remapper {
    pub(crate) fn set(&mut self, kind: SectionKind, map: IndexMap) {
        self.maps[kind.index()] = Some(map);
    }

    /// Keep indices into `kind` as they are, within `count` source records.
    pub(crate) fn pass_through(&mut self, kind: SectionKind, count: usize) {
        self.maps[kind.index()] = None;
        self.counts[kind.index()] = Some(count);
    }

    fn resolve(&self, section: SectionKind, record: &str, key: &str, index: u32) -> Result<u32> {
        let Some(map) = &self.maps[section.index()] else {
            if let Some(count) = self.counts[section.index()] {
                check_range(section, record, key, index, count)?;
            }
            return Ok(index);
        };
        map.get(index).ok_or_else(|| Error::IndexOutOfRange {
            section,
            record: record.to_owned(),
            key: key.to_owned(),
            index,
            count: map.len(),
        })
    }

    pub(crate) fn material(&self, material: &Material) -> Result<Material> {
        material.map_links(|key, index| self.resolve(key.target(), &material.name, key.name(), index))
    }

    pub(crate) fn sound(&self, sound: &Sound) -> Result<Sound> {
        let soundfile = self.resolve(SectionKind::SoundFiles, &sound.name, "soundfile", sound.soundfile)?;
        Ok(Sound {
            name: sound.name.clone(),
            soundfile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keep_is_dense() {
        let map = IndexMap::keep(5, &[1, 3, 4]);
        let mapped: Vec<Option<u32>> = (0..=6).map(|i| map.get(i)).collect();
        assert_eq!(
            mapped,
            vec![Some(0), None, Some(1), None, Some(2), Some(3), None]
        );
    }

    #[test]
    fn test_by_name() {
        let map = IndexMap::by_name(&["rev.wav", "boom.wav"], &["boom.wav", "rev.wav"]);
        assert_eq!(map.get(1), Some(2));
        assert_eq!(map.get(2), Some(1));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_remapper() {
        let mut remapper = Remapper::default();
        remapper.set(SectionKind::TextureFiles, IndexMap::keep(3, &[2]));

        let material = Material::parse("m tex 3  msk 7").unwrap();
        // MASKFILES has no map, so msk passes through.
        assert_eq!(remapper.material(&material).unwrap().to_row(), "m tex 1  msk 7");

        let dropped = Material::parse("m tex 1").unwrap();
        assert!(matches!(
            remapper.material(&dropped),
            Err(Error::IndexOutOfRange {
                section: SectionKind::TextureFiles,
                index: 1,
                ..
            })
        ));

        remapper.pass_through(SectionKind::MaskFiles, 7);
        assert!(remapper.material(&material).is_ok());
        remapper.pass_through(SectionKind::MaskFiles, 6);
        assert!(matches!(
            remapper.material(&material),
            Err(Error::IndexOutOfRange {
                section: SectionKind::MaskFiles,
                index: 7,
                count: 6,
                ..
            })
        ));

        remapper.set(SectionKind::SoundFiles, IndexMap::keep(2, &[1, 0]));
        let sound = Sound::parse("horn 1").unwrap();
        assert_eq!(remapper.sound(&sound).unwrap().soundfile, 2);
    }

    #[test]
    fn test_check_range() {
        assert!(check_range(SectionKind::MaskFiles, "m", "msk", 0, 0).is_ok());
        assert!(check_range(SectionKind::MaskFiles, "m", "msk", 2, 2).is_ok());
        assert!(check_range(SectionKind::MaskFiles, "m", "msk", 3, 2).is_err());
    }
}

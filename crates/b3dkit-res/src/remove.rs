//! Removing records.

use std::collections::BTreeMap;

use b3dkit_common::NameFilter;

use crate::extract::{write_plan, Plan, ResOutput};
use crate::remap::check_range;
use crate::{Error, MaterialKey, ResArchive, Result, SectionKind};

/// Options for [`remove`].
#[derive(Debug, Clone, Default)]
pub struct RemoveOptions {
    /// Records to drop, per section.
    pub patterns: BTreeMap<SectionKind, NameFilter>,
}

impl RemoveOptions {
    pub fn with(mut self, kind: SectionKind, filter: NameFilter) -> Self {
        self.patterns.insert(kind, filter);
        self
    }
}

/// Drop matching records and renumber what remains.
///
/// MATERIALS whose texture or mask was removed, and SOUNDS whose sound file
/// was removed, are dropped as well. This cascade goes one level: a material
/// whose parent is gone is an error.
pub fn remove(archive: &ResArchive, options: &RemoveOptions) -> Result<ResOutput> {
    let materials = archive.materials()?;
    let sounds = archive.sounds()?;

    let mut removed: BTreeMap<SectionKind, Vec<bool>> = BTreeMap::new();
    for kind in SectionKind::ALL {
        let flags = archive
            .records(kind)
            .iter()
            .map(|record| {
                options
                    .patterns
                    .get(&kind)
                    .is_some_and(|filter| filter.matches(&record.name))
            })
            .collect();
        removed.insert(kind, flags);
    }

    let is_removed = |removed: &BTreeMap<SectionKind, Vec<bool>>, kind: SectionKind, index: u32| {
        index > 0 && removed[&kind][index as usize - 1]
    };

    let mut cascaded = Vec::new();
    for (position, material) in materials.iter().enumerate() {
        if removed[&SectionKind::Materials][position] {
            continue;
        }
        for (key, index) in material.links() {
            let target = key.target();
            check_range(target, &material.name, key.name(), index, archive.records(target).len())?;
            if key != MaterialKey::Par && is_removed(&removed, target, index) {
                cascaded.push((SectionKind::Materials, position));
                break;
            }
        }
    }
    for (position, sound) in sounds.iter().enumerate() {
        if removed[&SectionKind::Sounds][position] {
            continue;
        }
        let count = archive.records(SectionKind::SoundFiles).len();
        check_range(SectionKind::SoundFiles, &sound.name, "soundfile", sound.soundfile, count)?;
        if is_removed(&removed, SectionKind::SoundFiles, sound.soundfile) {
            cascaded.push((SectionKind::Sounds, position));
        }
    }
    for (kind, position) in cascaded {
        log::info!("{kind}: dropping {:?}, its reference was removed", archive.records(kind)[position].name);
        if let Some(flags) = removed.get_mut(&kind) {
            flags[position] = true;
        }
    }

    for (position, material) in materials.iter().enumerate() {
        if removed[&SectionKind::Materials][position] {
            continue;
        }
        if let Some(parent) = material.get(MaterialKey::Par) {
            if is_removed(&removed, SectionKind::Materials, parent) {
                return Err(Error::DanglingParent {
                    record: material.name.clone(),
                    parent: materials[parent as usize - 1].name.clone(),
                });
            }
        }
    }

    let plan: Plan = removed
        .iter()
        .map(|(&kind, flags)| {
            let kept = (0..flags.len()).filter(|&i| !flags[i]).collect();
            (kind, kept)
        })
        .collect();
    write_plan(
        archive,
        &plan,
        &SectionKind::ALL.into_iter().collect(),
        &materials,
        &sounds,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::build;

    fn sample() -> ResArchive {
        let data = build(&[
            (SectionKind::SoundFiles, &["rev.wav", "boom.wav", "honk.wav"]),
            (SectionKind::MaskFiles, &["glass.msk"]),
            (SectionKind::TextureFiles, &["brick.txr", "glass.txr", "sky.txr"]),
            (
                SectionKind::Materials,
                &["brick tex 1", "glass tex 2  msk 1", "sky tex 3", "window par 2  col 1"],
            ),
            (SectionKind::Sounds, &["engine 1", "explosion 2", "horn 3"]),
        ]);
        ResArchive::parse(&data).unwrap()
    }

    #[test]
    fn test_cascade() {
        let archive = sample();
        let options = RemoveOptions::default()
            .with(SectionKind::TextureFiles, NameFilter::exact(["brick.txr"]))
            .with(SectionKind::SoundFiles, NameFilter::patterns(["b*"]).unwrap());
        let output = remove(&archive, &options).unwrap();

        assert_eq!(output.records[&SectionKind::TextureFiles], vec!["glass.txr", "sky.txr"]);
        assert_eq!(output.records[&SectionKind::Materials], vec!["glass", "sky", "window"]);
        assert_eq!(output.dropped[&SectionKind::Materials], vec!["brick"]);
        assert_eq!(output.records[&SectionKind::Sounds], vec!["engine", "horn"]);

        let result = ResArchive::parse(&output.data).unwrap();
        let rows: Vec<&str> = result
            .records(SectionKind::Materials)
            .iter()
            .map(|r| r.row.as_str())
            .collect();
        assert_eq!(rows, vec!["glass tex 1  msk 1", "sky tex 2", "window par 1  col 1"]);

        // No surviving record points at a removed one.
        let soundfiles = result.records(SectionKind::SoundFiles).len();
        for sound in result.sounds().unwrap() {
            assert!((1..=soundfiles as u32).contains(&sound.soundfile));
        }
        assert_eq!(result.sounds().unwrap()[1].soundfile, 2);
    }

    #[test]
    fn test_dangling_parent() {
        let archive = sample();
        let options = RemoveOptions::default()
            .with(SectionKind::TextureFiles, NameFilter::exact(["glass.txr"]));
        assert!(matches!(
            remove(&archive, &options),
            Err(Error::DanglingParent { record, parent }) if record == "window" && parent == "glass"
        ));
    }

    #[test]
    fn test_remove_nothing_round_trips() {
        let archive = sample();
        let output = remove(&archive, &RemoveOptions::default()).unwrap();
        assert_eq!(output.data, archive.data());
    }

    #[test]
    fn test_out_of_range_reference() {
        let data = build(&[(SectionKind::Materials, &["bad tex 4"])]);
        let archive = ResArchive::parse(&data).unwrap();
        assert!(matches!(
            remove(&archive, &RemoveOptions::default()),
            Err(Error::IndexOutOfRange { index: 4, count: 0, .. })
        ));
    }
}

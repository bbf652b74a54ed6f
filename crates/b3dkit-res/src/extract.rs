//! Extracting records into a new archive.

use std::collections::{BTreeMap, BTreeSet};

use crate::remap::{check_range, IndexMap, Remapper};
use crate::writer::{OutRecord, ResWriter};
use crate::{Material, MaterialKey, ResArchive, Result, SectionKind, Selection, Sound};

static SELECT_ALL: Selection = Selection::All;

/// Options for [`extract`].
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Sections written with records. The others are written with a count of 0.
    pub sections: BTreeSet<SectionKind>,
    /// Per-section selection; sections not listed select everything.
    pub selections: BTreeMap<SectionKind, Selection>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            sections: SectionKind::ALL.into_iter().collect(),
            selections: BTreeMap::new(),
        }
    }
}

impl ExtractOptions {
    /// Set the selection for one section.
    pub fn select(mut self, kind: SectionKind, selection: Selection) -> Self {
        self.selections.insert(kind, selection);
        self
    }

    /// Write only the given sections.
    pub fn only<I: IntoIterator<Item = SectionKind>>(mut self, sections: I) -> Self {
        self.sections = sections.into_iter().collect();
        self
    }

    pub fn selection(&self, kind: SectionKind) -> &Selection {
        self.selections.get(&kind).unwrap_or(&SELECT_ALL)
    }
}

/// A written archive and what went into it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResOutput {
    pub data: Vec<u8>,
    /// Record names written, per section, in output order.
    pub records: BTreeMap<SectionKind, Vec<String>>,
    /// Source records left out, per section.
    pub dropped: BTreeMap<SectionKind, Vec<String>>,
}

/// Records chosen per section, as source indices in output order.
pub(crate) type Plan = BTreeMap<SectionKind, Vec<usize>>;

/// Extract the selected records into a new archive.
///
/// Cross-references of the kept MATERIALS and SOUNDS are renumbered for the
/// kept target records. A reference into a written section whose target was
/// not kept is an error; references into sections that are not written pass
/// through unchanged.
pub fn extract(archive: &ResArchive, options: &ExtractOptions) -> Result<ResOutput> {
    for kind in SectionKind::ALL {
        options.selection(kind).validate(kind)?;
    }
    let materials = archive.materials()?;
    let sounds = archive.sounds()?;

    let mut plan = Plan::new();
    for kind in SectionKind::ALL {
        let records = archive.records(kind);
        let kept = match (kind, options.selection(kind)) {
            (SectionKind::Materials, Selection::Matching(_)) => {
                let direct = options.selection(kind).resolve(records);
                with_parents(&materials, direct)?
            }
            (_, selection) => selection.resolve(records),
        };
        plan.insert(kind, kept);
    }

    let kept_materials = plan[&SectionKind::Materials].clone();
    let kept_sounds = plan[&SectionKind::Sounds].clone();
    for kind in [SectionKind::TextureFiles, SectionKind::MaskFiles, SectionKind::SoundFiles] {
        if !matches!(options.selection(kind), Selection::Ref) {
            continue;
        }
        let count = archive.records(kind).len();
        let mut referenced = BTreeSet::new();
        if kind == SectionKind::SoundFiles {
            for sound in kept_sounds.iter().map(|&i| &sounds[i]) {
                check_range(kind, &sound.name, "soundfile", sound.soundfile, count)?;
                if sound.soundfile > 0 {
                    referenced.insert(sound.soundfile as usize - 1);
                }
            }
        } else {
            for material in kept_materials.iter().map(|&i| &materials[i]) {
                for (key, index) in material.links().filter(|(key, _)| key.target() == kind) {
                    check_range(kind, &material.name, key.name(), index, count)?;
                    if index > 0 {
                        referenced.insert(index as usize - 1);
                    }
                }
            }
        }
        log::debug!("{kind}: {} records by reference", referenced.len());
        plan.insert(kind, referenced.into_iter().collect());
    }

    write_plan(archive, &plan, &options.sections, &materials, &sounds)
}

/// Add every ancestor reachable through `par` and sort by name.
fn with_parents(materials: &[Material], direct: Vec<usize>) -> Result<Vec<usize>> {
    let mut selected = vec![false; materials.len()];
    let mut stack = direct;
    while let Some(index) = stack.pop() {
        if std::mem::replace(&mut selected[index], true) {
            continue;
        }
        let material = &materials[index];
        if let Some(parent) = material.get(MaterialKey::Par) {
            check_range(SectionKind::Materials, &material.name, "par", parent, materials.len())?;
            if parent > 0 {
                stack.push(parent as usize - 1);
            }
        }
    }
    let mut kept: Vec<usize> = (0..materials.len()).filter(|&i| selected[i]).collect();
    kept.sort_by(|&a, &b| materials[a].name.cmp(&materials[b].name));
    Ok(kept)
}

/// Write the planned records of the written sections.
pub(crate) fn write_plan(
    archive: &ResArchive,
    plan: &Plan,
    sections: &BTreeSet<SectionKind>,
    materials: &[Material],
    sounds: &[Sound],
) -> Result<ResOutput> {
    let mut remapper = Remapper::default();
    for kind in [
        SectionKind::TextureFiles,
        SectionKind::MaskFiles,
        SectionKind::SoundFiles,
        SectionKind::Materials,
    ] {
        let count = archive.records(kind).len();
        if sections.contains(&kind) {
            remapper.set(kind, IndexMap::keep(count, &plan[&kind]));
        } else {
            remapper.pass_through(kind, count);
        }
    }

    let mut writer = ResWriter::new();
    let mut output = ResOutput::default();
    for kind in SectionKind::ALL {
        let records = archive.records(kind);
        let kept: &[usize] = if sections.contains(&kind) { &plan[&kind] } else { &[] };

        for &index in kept {
            let record = &records[index];
            let raw = OutRecord::Raw(archive.record_bytes(record));
            let out = match kind {
                SectionKind::Materials => {
                    let mapped = remapper.material(&materials[index])?;
                    if mapped == materials[index] { raw } else { OutRecord::text(mapped.to_row()) }
                }
                SectionKind::Sounds => {
                    let mapped = remapper.sound(&sounds[index])?;
                    if mapped == sounds[index] { raw } else { OutRecord::text(mapped.to_row()) }
                }
                _ => raw,
            };
            writer.push(kind, out);
        }

        let mut written = vec![false; records.len()];
        for &index in kept {
            written[index] = true;
        }
        let name = |index: usize| records[index].name.clone();
        output.records.insert(kind, kept.iter().map(|&i| name(i)).collect());
        output.dropped.insert(kind, (0..records.len()).filter(|&i| !written[i]).map(name).collect());
    }

    output.data = writer.finish()?;
    log::info!(
        "wrote RES: {}",
        SectionKind::ALL
            .iter()
            .map(|kind| format!("{kind} {}", output.records[kind].len()))
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::build;
    use crate::Error;

    fn textures_scenario() -> ResArchive {
        let data = build(&[
            (SectionKind::TextureFiles, &["t1.txr", "t2.txr"]),
            (SectionKind::Materials, &["m1 tex 1", "m2 tex 2"]),
        ]);
        ResArchive::parse(&data).unwrap()
    }

    #[test]
    fn test_extract_material_with_referenced_textures() {
        let archive = textures_scenario();
        let options = ExtractOptions::default()
            .select(SectionKind::Materials, Selection::exact(["m1"]))
            .select(SectionKind::TextureFiles, Selection::Ref);
        let output = extract(&archive, &options).unwrap();
        assert_eq!(output.records[&SectionKind::TextureFiles], vec!["t1.txr"]);
        assert_eq!(output.records[&SectionKind::Materials], vec!["m1"]);

        let extracted = ResArchive::parse(&output.data).unwrap();
        assert_eq!(extracted.names(SectionKind::TextureFiles), vec!["t1.txr"]);
        assert_eq!(extracted.materials().unwrap()[0].get(MaterialKey::Tex), Some(1));
    }

    #[test]
    fn test_reference_is_renumbered() {
        let archive = textures_scenario();
        let options = ExtractOptions::default()
            .select(SectionKind::Materials, Selection::exact(["m2"]))
            .select(SectionKind::TextureFiles, Selection::Ref);
        let output = extract(&archive, &options).unwrap();
        let extracted = ResArchive::parse(&output.data).unwrap();
        assert_eq!(extracted.names(SectionKind::TextureFiles), vec!["t2.txr"]);
        assert_eq!(extracted.records(SectionKind::Materials)[0].row, "m2 tex 1");
        assert_eq!(output.dropped[&SectionKind::TextureFiles], vec!["t1.txr"]);
    }

    #[test]
    fn test_untouched_archive_round_trips() {
        let data = build(&[
            (SectionKind::PaletteFiles, &["common.plm"]),
            (SectionKind::SoundFiles, &["a.wav", "b.wav"]),
            (SectionKind::MaskFiles, &["m.msk"]),
            (SectionKind::TextureFiles, &["t1.txr", "t2.txr noload"]),
            (SectionKind::Colors, &["10 20 30"]),
            (SectionKind::Materials, &["wood tex 2  \"msk 1\"", "oak par 1  col 3"]),
            (SectionKind::Sounds, &["creak 2"]),
        ]);
        let archive = ResArchive::parse(&data).unwrap();
        let output = extract(&archive, &ExtractOptions::default()).unwrap();
        assert_eq!(output.data, data);
    }

    #[test]
    fn test_parents_are_pulled_in_and_sorted() {
        let data = build(&[(
            SectionKind::Materials,
            &["zeta", "child par 3", "base", "other"],
        )]);
        let archive = ResArchive::parse(&data).unwrap();
        let options = ExtractOptions::default()
            .select(SectionKind::Materials, Selection::patterns(["ch*", "zeta"]).unwrap());
        let output = extract(&archive, &options).unwrap();
        assert_eq!(output.records[&SectionKind::Materials], vec!["base", "child", "zeta"]);

        let extracted = ResArchive::parse(&output.data).unwrap();
        let child = &extracted.materials().unwrap()[1];
        assert_eq!(child.get(MaterialKey::Par), Some(1));
    }

    #[test]
    fn test_density_of_material_references() {
        let data = build(&[
            (SectionKind::MaskFiles, &["m1", "m2", "m3"]),
            (SectionKind::TextureFiles, &["t1", "t2", "t3", "t4"]),
            (
                SectionKind::Materials,
                &["a tex 4  msk 3", "b tex 2  ttx 4  itx 2", "c tex 1  msk 1", "d par 2  tex 3"],
            ),
        ]);
        let archive = ResArchive::parse(&data).unwrap();
        let options = ExtractOptions::default()
            .select(SectionKind::Materials, Selection::exact(["a", "d"]))
            .select(SectionKind::TextureFiles, Selection::Ref)
            .select(SectionKind::MaskFiles, Selection::Ref);
        let output = extract(&archive, &options).unwrap();
        let extracted = ResArchive::parse(&output.data).unwrap();

        let textures = extracted.records(SectionKind::TextureFiles).len();
        let masks = extracted.records(SectionKind::MaskFiles).len();
        let materials = extracted.materials().unwrap();
        assert_eq!(materials.len(), 3);
        let mut used = BTreeSet::new();
        for material in &materials {
            for (key, index) in material.links() {
                let count = match key.target() {
                    SectionKind::TextureFiles => textures,
                    SectionKind::MaskFiles => masks,
                    _ => materials.len(),
                };
                assert!((1..=count as u32).contains(&index), "{key} {index}");
                if key.target() == SectionKind::TextureFiles {
                    used.insert(index);
                }
            }
        }
        assert_eq!(used.len(), textures);
    }

    #[test]
    fn test_excluded_sections_are_empty_and_pass_references_through() {
        let archive = textures_scenario();
        let options = ExtractOptions::default().only([SectionKind::Materials]);
        let output = extract(&archive, &options).unwrap();
        let extracted = ResArchive::parse(&output.data).unwrap();
        assert_eq!(extracted.sections().count(), 8);
        assert!(extracted.records(SectionKind::TextureFiles).is_empty());
        assert_eq!(extracted.records(SectionKind::Materials)[1].row, "m2 tex 2");
    }

    #[test]
    fn test_reference_into_excluded_section_is_range_checked() {
        let data = build(&[
            (SectionKind::TextureFiles, &["t1.txr"]),
            (SectionKind::Materials, &["m tex 9"]),
        ]);
        let archive = ResArchive::parse(&data).unwrap();
        let options = ExtractOptions::default().only([SectionKind::Materials]);
        assert!(matches!(
            extract(&archive, &options),
            Err(Error::IndexOutOfRange {
                section: SectionKind::TextureFiles,
                index: 9,
                count: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_reference_to_unkept_record_fails() {
        let archive = textures_scenario();
        let options = ExtractOptions::default()
            .select(SectionKind::TextureFiles, Selection::exact(["t1.txr"]));
        assert!(matches!(
            extract(&archive, &options),
            Err(Error::IndexOutOfRange {
                section: SectionKind::TextureFiles,
                index: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_ref_on_materials_is_rejected() {
        let archive = textures_scenario();
        let options = ExtractOptions::default().select(SectionKind::Materials, Selection::Ref);
        assert!(matches!(
            extract(&archive, &options),
            Err(Error::InvalidSelection { .. })
        ));
    }
}

//! Merging two archives.

use rustc_hash::FxHashMap;

use crate::extract::ResOutput;
use crate::remap::{check_range, IndexMap, Remapper};
use crate::writer::{OutRecord, ResWriter};
use crate::{Material, ResArchive, Result, SectionKind, Sound};

/// Options for [`merge`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    /// On a name collision the incoming record wins; otherwise the existing one does.
    pub replace: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Into,
    From,
}

/// Records of both archives, with from-file records numbered after the
/// into-file ones.
struct Combined<'a> {
    into: &'a ResArchive,
    from: &'a ResArchive,
}

impl<'a> Combined<'a> {
    fn archive(&self, side: Side) -> &'a ResArchive {
        match side {
            Side::Into => self.into,
            Side::From => self.from,
        }
    }

    fn names(&self, kind: SectionKind) -> Vec<&'a str> {
        let mut names = self.into.names(kind);
        names.extend(self.from.names(kind));
        names
    }

    /// Index offset applied to from-file references into `kind`.
    fn offset(&self, side: Side, kind: SectionKind) -> u32 {
        match side {
            Side::Into => 0,
            Side::From => self.into.records(kind).len() as u32,
        }
    }

    /// Winning record per name, sorted by name.
    fn winners(&self, kind: SectionKind, replace: bool) -> (Vec<(Side, usize)>, Vec<String>) {
        let mut chosen: FxHashMap<&str, (Side, usize)> = FxHashMap::default();
        let mut dropped = Vec::new();
        for (index, record) in self.into.records(kind).iter().enumerate() {
            if chosen.contains_key(record.name.as_str()) {
                dropped.push(record.name.clone());
            } else {
                chosen.insert(&record.name, (Side::Into, index));
            }
        }
        for (index, record) in self.from.records(kind).iter().enumerate() {
            match chosen.get_mut(record.name.as_str()) {
                Some(slot) if replace && slot.0 == Side::Into => {
                    *slot = (Side::From, index);
                    dropped.push(record.name.clone());
                }
                Some(_) => dropped.push(record.name.clone()),
                None => {
                    chosen.insert(&record.name, (Side::From, index));
                }
            }
        }
        let mut winners: Vec<(&str, (Side, usize))> = chosen.into_iter().collect();
        winners.sort_by(|a, b| a.0.cmp(b.0));
        (winners.into_iter().map(|(_, winner)| winner).collect(), dropped)
    }
}

/// Merge the records of `from` into `into`.
///
/// Every section is the union of both by record name, sorted by name. From-file
/// references are first shifted past the into-file records of their target
/// section, then all references are renumbered for the merged order. COLORS is
/// taken from the into-file, or from the from-file when the into-file has none.
pub fn merge(into: &ResArchive, from: &ResArchive, options: &MergeOptions) -> Result<ResOutput> {
    let combined = Combined { into, from };
    let parsed_materials = [into.materials()?, from.materials()?];
    let parsed_sounds = [into.sounds()?, from.sounds()?];
    let side_index = |side: Side| match side {
        Side::Into => 0,
        Side::From => 1,
    };

    let mut remapper = Remapper::default();
    let mut plans = FxHashMap::default();
    let mut output = ResOutput::default();
    for kind in SectionKind::ALL {
        if kind == SectionKind::Colors {
            continue;
        }
        let (winners, dropped) = combined.winners(kind, options.replace);
        let merged: Vec<&str> = winners
            .iter()
            .map(|&(side, index)| combined.archive(side).records(kind)[index].name.as_str())
            .collect();
        remapper.set(kind, IndexMap::by_name(&combined.names(kind), &merged));
        output.records.insert(kind, merged.iter().map(|name| name.to_string()).collect());
        output.dropped.insert(kind, dropped);
        plans.insert(kind, winners);
    }

    let colors_side = if into.records(SectionKind::Colors).is_empty() { Side::From } else { Side::Into };
    let colors = combined.archive(colors_side).records(SectionKind::Colors);
    output
        .records
        .insert(SectionKind::Colors, colors.iter().map(|r| r.name.clone()).collect());
    output.dropped.insert(SectionKind::Colors, Vec::new());

    let mut writer = ResWriter::new();
    for kind in SectionKind::ALL {
        if kind == SectionKind::Colors {
            let archive = combined.archive(colors_side);
            writer.extend(kind, colors.iter().map(|r| OutRecord::Raw(archive.record_bytes(r))));
            continue;
        }
        for &(side, index) in &plans[&kind] {
            let archive = combined.archive(side);
            let raw = OutRecord::Raw(archive.record_bytes(&archive.records(kind)[index]));
            let out = match kind {
                SectionKind::Materials => {
                    let original = &parsed_materials[side_index(side)][index];
                    let mapped = remapper.material(&shift_material(&combined, side, original)?)?;
                    if mapped == *original { raw } else { OutRecord::text(mapped.to_row()) }
                }
                SectionKind::Sounds => {
                    let original = &parsed_sounds[side_index(side)][index];
                    let mapped = remapper.sound(&shift_sound(&combined, side, original)?)?;
                    if mapped == *original { raw } else { OutRecord::text(mapped.to_row()) }
                }
                _ => raw,
            };
            writer.push(kind, out);
        }
    }

    output.data = writer.finish()?;
    log::info!(
        "merged RES: {} materials, {} sounds, {} textures",
        output.records[&SectionKind::Materials].len(),
        output.records[&SectionKind::Sounds].len(),
        output.records[&SectionKind::TextureFiles].len()
    );
    Ok(output)
}

/// Check a material's references against its own archive and move them into
/// the combined numbering.
fn shift_material(combined: &Combined<'_>, side: Side, material: &Material) -> Result<Material> {
    let archive = combined.archive(side);
    material.map_links(|key, index| {
        let target = key.target();
        check_range(target, &material.name, key.name(), index, archive.records(target).len())?;
        Ok(if index == 0 { 0 } else { index + combined.offset(side, target) })
    })
}

fn shift_sound(combined: &Combined<'_>, side: Side, sound: &Sound) -> Result<Sound> {
    let kind = SectionKind::SoundFiles;
    let count = combined.archive(side).records(kind).len();
    check_range(kind, &sound.name, "soundfile", sound.soundfile, count)?;
    let soundfile = if sound.soundfile == 0 { 0 } else { sound.soundfile + combined.offset(side, kind) };
    Ok(Sound {
        name: sound.name.clone(),
        soundfile,
    })
}

//! Merging two archives.

use rustc_hash::FxHashMap;

use crate::extract::RootOrder;
use crate::materials::{merged_materials, TexnumMap};
use crate::writer::write_archive;
use crate::{B3dArchive, Result, RootNode};

/// Options for [`merge`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    /// On a name collision the incoming root wins; otherwise the existing one does.
    pub replace: bool,
    pub order: RootOrder,
}

/// Result of [`merge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
    pub materials: Vec<String>,
    /// Incoming roots whose names were new.
    pub added: Vec<String>,
    /// Existing roots overwritten by incoming ones.
    pub replaced: Vec<String>,
    /// Incoming roots dropped because the name already existed, including
    /// repeats of a name earlier in the from-file.
    pub skipped: Vec<String>,
    pub data: Vec<u8>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Into,
    From,
}

/// Merge the roots of `from` into `into`.
///
/// The materials lists are unioned and sorted by name, and each side's
/// texnums are rewritten into the merged list. In source order the into-file
/// roots come first, replaced ones keeping their position, followed by the
/// added roots in from-file order.
pub fn merge(into: &B3dArchive, from: &B3dArchive, options: &MergeOptions) -> Result<Merged> {
    let materials = merged_materials(into.materials(), from.materials());
    let into_map = TexnumMap::by_name(into.materials(), &materials);
    let from_map = TexnumMap::by_name(from.materials(), &materials);

    let mut entries: Vec<(Side, &RootNode)> =
        into.roots().iter().map(|root| (Side::Into, root)).collect();
    let mut positions: FxHashMap<&str, usize> = FxHashMap::default();
    for (position, &(_, root)) in entries.iter().enumerate() {
        positions.entry(root.name.as_str()).or_insert(position);
    }

    let (mut added, mut replaced, mut skipped) = (Vec::new(), Vec::new(), Vec::new());
    for root in from.roots() {
        match positions.get(root.name.as_str()) {
            Some(&position) if options.replace && entries[position].0 == Side::Into => {
                entries[position] = (Side::From, root);
                replaced.push(root.name.clone());
            }
            Some(_) => skipped.push(root.name.clone()),
            None => {
                positions.insert(root.name.as_str(), entries.len());
                entries.push((Side::From, root));
                added.push(root.name.clone());
            }
        }
    }

    match options.order {
        RootOrder::Source => {}
        RootOrder::Ascending => entries.sort_by(|(_, a), (_, b)| a.name.cmp(&b.name)),
        RootOrder::Descending => entries.sort_by(|(_, a), (_, b)| b.name.cmp(&a.name)),
    }

    let blobs = entries
        .iter()
        .map(|&(side, root)| match side {
            Side::Into => into_map.apply(into, root),
            Side::From => from_map.apply(from, root),
        })
        .collect::<Result<Vec<_>>>()?;
    let data = write_archive(&materials, blobs.iter().map(Vec::as_slice))?;

    log::info!(
        "merged: {} added, {} replaced, {} skipped, {} materials",
        added.len(),
        replaced.len(),
        skipped.len(),
        materials.len()
    );
    Ok(Merged {
        materials,
        added,
        replaced,
        skipped,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::{build, root};

    fn texnums(archive: &B3dArchive) -> Vec<(String, Vec<u32>)> {
        archive
            .roots()
            .iter()
            .map(|root| {
                let values = root.texnums.iter().map(|site| site.value).collect();
                (root.name.clone(), values)
            })
            .collect()
    }

    fn material_of(archive: &B3dArchive, root: &str) -> String {
        let texnum = archive.root(root).unwrap().texnums[0].value;
        archive.materials()[texnum as usize - 1].clone()
    }

    #[test]
    fn test_disjoint_merge_either_direction() {
        let a = build(
            &["wood", "steel"],
            &[root("crate", &[1], &[]), root("beam", &[2], &[])],
        );
        let b = build(&["glass"], &[root("window", &[1], &[])]);
        let a = B3dArchive::parse(&a).unwrap();
        let b = B3dArchive::parse(&b).unwrap();

        for (into, from) in [(&a, &b), (&b, &a)] {
            let merged = merge(into, from, &MergeOptions::default()).unwrap();
            assert_eq!(merged.materials, vec!["glass", "steel", "wood"]);

            let output = B3dArchive::parse(&merged.data).unwrap();
            assert_eq!(material_of(&output, "crate"), "wood");
            assert_eq!(material_of(&output, "beam"), "steel");
            assert_eq!(material_of(&output, "window"), "glass");
        }

        let merged = merge(&a, &b, &MergeOptions::default()).unwrap();
        let output = B3dArchive::parse(&merged.data).unwrap();
        assert_eq!(
            texnums(&output),
            vec![
                ("crate".to_string(), vec![3]),
                ("beam".to_string(), vec![2]),
                ("window".to_string(), vec![1]),
            ]
        );
        assert_eq!(merged.added, vec!["window"]);
    }

    #[test]
    fn test_collision_skip_and_replace() {
        let into = build(&["old"], &[root("shared", &[1], &[]), root("mine", &[1], &[])]);
        let from = build(&["new"], &[root("shared", &[1], &[]), root("theirs", &[1], &[])]);
        let into = B3dArchive::parse(&into).unwrap();
        let from = B3dArchive::parse(&from).unwrap();

        let kept = merge(&into, &from, &MergeOptions::default()).unwrap();
        assert_eq!(kept.skipped, vec!["shared"]);
        let output = B3dArchive::parse(&kept.data).unwrap();
        assert_eq!(material_of(&output, "shared"), "old");
        assert_eq!(material_of(&output, "theirs"), "new");

        let options = MergeOptions {
            replace: true,
            order: RootOrder::Ascending,
        };
        let replaced = merge(&into, &from, &options).unwrap();
        assert_eq!(replaced.replaced, vec!["shared"]);
        let output = B3dArchive::parse(&replaced.data).unwrap();
        assert_eq!(material_of(&output, "shared"), "new");
        let names: Vec<&str> = output.roots().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["mine", "shared", "theirs"]);
    }

    #[test]
    fn test_repeated_incoming_root_is_skipped() {
        let into = build(&["old"], &[root("shared", &[1], &[])]);
        let from = build(
            &["first", "second"],
            &[
                root("shared", &[1], &[]),
                root("shared", &[2], &[]),
                root("extra", &[1], &[]),
                root("extra", &[2], &[]),
            ],
        );
        let into = B3dArchive::parse(&into).unwrap();
        let from = B3dArchive::parse(&from).unwrap();

        let options = MergeOptions {
            replace: true,
            ..Default::default()
        };
        let merged = merge(&into, &from, &options).unwrap();
        assert_eq!(merged.replaced, vec!["shared"]);
        assert_eq!(merged.added, vec!["extra"]);
        assert_eq!(merged.skipped, vec!["shared", "extra"]);

        let output = B3dArchive::parse(&merged.data).unwrap();
        assert_eq!(output.roots().len(), 2);
        assert_eq!(material_of(&output, "shared"), "first");
        assert_eq!(material_of(&output, "extra"), "first");
    }
}

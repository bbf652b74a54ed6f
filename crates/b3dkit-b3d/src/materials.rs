//! Materials lists and texnum rewriting.
//!
//! Texnums are 1-based on disk with 0 meaning "no material". Maps are built
//! over 0-based slots and converted back only when a field is patched.

use byteorder::{ByteOrder, LittleEndian};
use rustc_hash::FxHashMap;

use crate::{B3dArchive, Error, Result, RootNode};

/// Rewrites one archive's texnums into the slots of an output materials list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TexnumMap {
    /// Old 0-based slot to new 0-based slot.
    slots: Vec<Option<u32>>,
}

impl TexnumMap {
    /// Keep every texnum as is.
    pub fn identity(count: usize) -> Self {
        Self {
            slots: (0..count as u32).map(Some).collect(),
        }
    }

    /// Map each old material to the slot of the same name in `new`.
    ///
    /// Old materials whose name is absent from `new` are left unmapped.
    pub fn by_name(old: &[String], new: &[String]) -> Self {
        let mut positions: FxHashMap<&str, u32> = FxHashMap::default();
        for (index, name) in new.iter().enumerate() {
            positions.entry(name.as_str()).or_insert(index as u32);
        }
        Self {
            slots: old.iter().map(|name| positions.get(name.as_str()).copied()).collect(),
        }
    }

    /// Translate a stored texnum. `0` maps to `0`; unmapped values give `None`.
    pub fn get(&self, texnum: u32) -> Option<u32> {
        if texnum == 0 {
            return Some(0);
        }
        self.slots
            .get(texnum as usize - 1)
            .copied()
            .flatten()
            .map(|slot| slot + 1)
    }

    /// Copy a root's bytes with every texnum rewritten.
    pub fn apply(&self, archive: &B3dArchive, root: &RootNode) -> Result<Vec<u8>> {
        let mut bytes = archive.root_bytes(root).to_vec();
        for site in &root.texnums {
            let texnum = self.get(site.value).ok_or_else(|| Error::TexnumOutOfRange {
                root: root.name.clone(),
                texnum: site.value,
                count: self.slots.len(),
            })?;
            LittleEndian::write_u32(&mut bytes[site.offset..site.offset + 4], texnum);
        }
        Ok(bytes)
    }
}

/// Names of the materials the given roots use, sorted and deduplicated.
pub fn used_materials<'r, I>(materials: &[String], roots: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = &'r RootNode>,
{
    let mut used = Vec::new();
    for root in roots {
        for site in &root.texnums {
            if site.value == 0 {
                continue;
            }
            let name = materials
                .get(site.value as usize - 1)
                .ok_or_else(|| Error::TexnumOutOfRange {
                    root: root.name.clone(),
                    texnum: site.value,
                    count: materials.len(),
                })?;
            used.push(name.clone());
        }
    }
    used.sort();
    used.dedup();
    Ok(used)
}

/// Union of two materials lists, sorted and deduplicated.
pub fn merged_materials(into: &[String], from: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = into.iter().chain(from).cloned().collect();
    merged.sort();
    merged.dedup();
    merged
}

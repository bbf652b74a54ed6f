//! Extracting roots into new archives.

use crate::materials::{used_materials, TexnumMap};
use crate::writer::write_archive;
use crate::{B3dArchive, Error, Result};

/// Which roots an extraction starts from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RootSelection {
    /// Roots nothing references that reference something.
    #[default]
    Natural,
    /// Every root in the archive.
    All,
    /// Roots by name.
    Named(Vec<String>),
}

/// Order of the object roots in an output archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RootOrder {
    /// File order of the source archive.
    #[default]
    Source,
    Ascending,
    Descending,
}

impl RootOrder {
    /// Sort root indices of `archive` in place.
    pub(crate) fn sort(self, archive: &B3dArchive, indices: &mut [usize]) {
        let roots = archive.roots();
        match self {
            RootOrder::Source => indices.sort_unstable(),
            RootOrder::Ascending => indices.sort_by(|&a, &b| {
                roots[a].name.cmp(&roots[b].name).then(a.cmp(&b))
            }),
            RootOrder::Descending => indices.sort_by(|&a, &b| {
                roots[b].name.cmp(&roots[a].name).then(a.cmp(&b))
            }),
        }
    }
}

/// Options for [`extract`].
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub roots: RootSelection,
    /// Pull in every root reachable through type 18 references.
    pub follow_references: bool,
    /// One output per selected root instead of a single output.
    pub split: bool,
    pub order: RootOrder,
    /// Keep the full materials list and leave texnums untouched.
    pub keep_materials: bool,
}

/// One extracted archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// The starting root in split mode.
    pub root: Option<String>,
    pub materials: Vec<String>,
    /// Space roots, in output order.
    pub spaces: Vec<String>,
    /// Object roots, in output order.
    pub roots: Vec<String>,
    pub data: Vec<u8>,
}

/// Extract roots into one or more new archives.
///
/// Each output holds its space roots sorted by name, then its object roots in
/// the requested order. Unless materials are kept, the materials list is cut
/// down to what the emitted roots use and texnums are renumbered densely.
pub fn extract(archive: &B3dArchive, options: &ExtractOptions) -> Result<Vec<Extracted>> {
    let start = select(archive, &options.roots)?;
    log::debug!("extracting from {} starting roots", start.len());

    let groups: Vec<(Option<usize>, Vec<usize>)> = if options.split {
        start.iter().map(|&index| (Some(index), vec![index])).collect()
    } else {
        vec![(None, start)]
    };

    let graph = archive.graph();
    let mut outputs = Vec::with_capacity(groups.len());
    for (root, group) in groups {
        let (mut objects, mut spaces) = if options.follow_references {
            let (visited, spaces) = graph.reach(&group);
            let objects: Vec<usize> = (0..visited.len()).filter(|&i| visited[i]).collect();
            (objects, spaces.into_iter().collect::<Vec<_>>())
        } else {
            (group, Vec::new())
        };
        objects.retain(|index| !spaces.contains(index));
        RootOrder::Ascending.sort(archive, &mut spaces);
        options.order.sort(archive, &mut objects);

        let root = root.map(|index| archive.roots()[index].name.clone());
        outputs.push(emit(archive, root, &spaces, &objects, options.keep_materials)?);
    }
    Ok(outputs)
}

fn select(archive: &B3dArchive, selection: &RootSelection) -> Result<Vec<usize>> {
    Ok(match selection {
        RootSelection::Natural => archive.graph().natural_indices(),
        RootSelection::All => (0..archive.roots().len()).collect(),
        RootSelection::Named(names) => {
            let mut indices = Vec::with_capacity(names.len());
            for name in names {
                let index = archive
                    .root_index(name)
                    .ok_or_else(|| Error::UnknownRoot(name.clone()))?;
                if !indices.contains(&index) {
                    indices.push(index);
                }
            }
            indices
        }
    })
}

fn emit(
    archive: &B3dArchive,
    root: Option<String>,
    spaces: &[usize],
    objects: &[usize],
    keep_materials: bool,
) -> Result<Extracted> {
    let roots = archive.roots();
    let emitted = || spaces.iter().chain(objects).map(|&index| &roots[index]);

    let (materials, map) = if keep_materials {
        let materials = archive.materials().to_vec();
        let map = TexnumMap::identity(materials.len());
        (materials, map)
    } else {
        let materials = used_materials(archive.materials(), emitted())?;
        let map = TexnumMap::by_name(archive.materials(), &materials);
        (materials, map)
    };

    let blobs = emitted()
        .map(|root| map.apply(archive, root))
        .collect::<Result<Vec<_>>>()?;
    let data = write_archive(&materials, blobs.iter().map(Vec::as_slice))?;

    let names = |indices: &[usize]| -> Vec<String> {
        indices.iter().map(|&i| roots[i].name.clone()).collect()
    };
    let extracted = Extracted {
        root,
        spaces: names(spaces),
        roots: names(objects),
        materials,
        data,
    };
    log::info!(
        "extracted {} roots and {} spaces with {} materials",
        extracted.roots.len(),
        extracted.spaces.len(),
        extracted.materials.len()
    );
    Ok(extracted)
}

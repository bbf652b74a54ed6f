//! Removing roots from an archive.

use b3dkit_common::NameFilter;

use crate::extract::RootOrder;
use crate::materials::TexnumMap;
use crate::writer::write_archive;
use crate::{B3dArchive, Result};

/// Options for [`remove`].
#[derive(Debug, Clone, Default)]
pub struct RemoveOptions {
    /// Roots whose name matches any pattern are dropped.
    pub patterns: NameFilter,
    pub order: RootOrder,
}

/// Result of [`remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removed {
    pub removed: Vec<String>,
    pub kept: Vec<String>,
    pub data: Vec<u8>,
}

/// Drop matching roots. The materials list and all texnums stay as they are.
pub fn remove(archive: &B3dArchive, options: &RemoveOptions) -> Result<Removed> {
    let roots = archive.roots();
    let (removed, mut kept): (Vec<usize>, Vec<usize>) =
        (0..roots.len()).partition(|&index| options.patterns.matches(&roots[index].name));
    options.order.sort(archive, &mut kept);

    let map = TexnumMap::identity(archive.materials().len());
    let blobs = kept
        .iter()
        .map(|&index| map.apply(archive, &roots[index]))
        .collect::<Result<Vec<_>>>()?;
    let data = write_archive(archive.materials(), blobs.iter().map(Vec::as_slice))?;

    let names = |indices: &[usize]| -> Vec<String> {
        indices.iter().map(|&i| roots[i].name.clone()).collect()
    };
    log::info!("removed {} roots, kept {}", removed.len(), kept.len());
    Ok(Removed {
        removed: names(&removed),
        kept: names(&kept),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::{build, root};

    fn sample() -> Vec<u8> {
        build(
            &["m1", "m2"],
            &[
                root("tree_01", &[1], &[]),
                root("house", &[2], &[]),
                root("tree_02", &[2], &[]),
                root("fence", &[1], &[]),
            ],
        )
    }

    #[test]
    fn test_remove_by_wildcard() {
        let archive = B3dArchive::parse(&sample()).unwrap();
        let options = RemoveOptions {
            patterns: NameFilter::patterns(["tree_*"]).unwrap(),
            ..Default::default()
        };
        let removed = remove(&archive, &options).unwrap();
        assert_eq!(removed.removed, vec!["tree_01", "tree_02"]);
        assert_eq!(removed.kept, vec!["house", "fence"]);

        let output = B3dArchive::parse(&removed.data).unwrap();
        assert_eq!(output.materials(), archive.materials());
        let values: Vec<u32> = output.roots().iter().map(|r| r.texnums[0].value).collect();
        assert_eq!(values, vec![2, 1]);
        assert_eq!(output.root_bytes(&output.roots()[0]), archive.root_bytes(&archive.roots()[1]));
    }

    #[test]
    fn test_remove_nothing_keeps_archive() {
        let data = sample();
        let archive = B3dArchive::parse(&data).unwrap();
        let removed = remove(&archive, &RemoveOptions::default()).unwrap();
        assert!(removed.removed.is_empty());
        assert_eq!(removed.data, data);
    }

    #[test]
    fn test_remove_sorted() {
        let archive = B3dArchive::parse(&sample()).unwrap();
        let options = RemoveOptions {
            patterns: NameFilter::exact(["house"]),
            order: RootOrder::Ascending,
        };
        let removed = remove(&archive, &options).unwrap();
        assert_eq!(removed.kept, vec!["fence", "tree_01", "tree_02"]);
    }
}

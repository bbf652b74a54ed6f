//! Archive overview for listings.

use crate::{B3dArchive, RootReference};

/// One root in a [`Summary`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RootSummary {
    pub name: String,
    pub offset: usize,
    pub size: usize,
    pub texnums: usize,
    pub references: Vec<RootReference>,
}

/// Materials, roots and reference structure of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Summary {
    pub materials: Vec<String>,
    pub roots: Vec<RootSummary>,
    pub edges: Vec<(String, String)>,
    pub natural_roots: Vec<String>,
}

impl Summary {
    pub fn new(archive: &B3dArchive) -> Self {
        let graph = archive.graph();
        Self {
            materials: archive.materials().to_vec(),
            roots: archive
                .roots()
                .iter()
                .map(|root| RootSummary {
                    name: root.name.clone(),
                    offset: root.start,
                    size: root.size,
                    texnums: root.texnums.len(),
                    references: root.references.clone(),
                })
                .collect(),
            edges: graph
                .edges()
                .map(|(from, to)| (from.to_owned(), to.to_owned()))
                .collect(),
            natural_roots: graph.natural_roots().into_iter().map(str::to_owned).collect(),
        }
    }
}

//! Reference graph between roots.
//!
//! Roots are vertices, type 18 records are edges. Edges are kept by root
//! index; references to names absent from the archive are dropped with a
//! warning when the graph is built.

use std::collections::{BTreeSet, VecDeque};

use crate::{B3dArchive, Error, Result};

/// An outgoing edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edge {
    target: usize,
    space: Option<usize>,
}

/// Roots and spaces reachable from a starting set of roots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Closure {
    /// Reachable roots, including the starting ones.
    pub roots: BTreeSet<String>,
    /// Space roots named along the way.
    pub spaces: BTreeSet<String>,
}

/// Directed reference graph over an archive's roots.
#[derive(Debug)]
pub struct ReferenceGraph<'a> {
    archive: &'a B3dArchive,
    edges: Vec<Vec<Edge>>,
}

impl<'a> ReferenceGraph<'a> {
    /// Build the graph from each root's type 18 references.
    pub fn new(archive: &'a B3dArchive) -> Self {
        let edges = archive
            .roots()
            .iter()
            .map(|root| {
                root.references
                    .iter()
                    .filter_map(|reference| {
                        let Some(target) = archive.root_index(&reference.add_name) else {
                            log::warn!(
                                "root {:?} references {:?}, which is not in this archive",
                                root.name,
                                reference.add_name
                            );
                            return None;
                        };
                        let space = reference.space().and_then(|space| {
                            let index = archive.root_index(space);
                            if index.is_none() {
                                log::warn!(
                                    "root {:?} names space {:?}, which is not in this archive",
                                    root.name,
                                    space
                                );
                            }
                            index
                        });
                        Some(Edge { target, space })
                    })
                    .collect()
            })
            .collect();
        Self { archive, edges }
    }

    /// Number of edges into each root, indexed like [`B3dArchive::roots`].
    pub fn in_degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.edges.len()];
        for edge in self.edges.iter().flatten() {
            degrees[edge.target] += 1;
        }
        degrees
    }

    /// Number of edges out of each root.
    pub fn out_degrees(&self) -> Vec<usize> {
        self.edges.iter().map(Vec::len).collect()
    }

    /// Roots that nothing references but that reference something, in file order.
    ///
    /// Roots with no edges at all are not natural roots.
    pub fn natural_roots(&self) -> Vec<&'a str> {
        let roots = self.archive.roots();
        self.natural_indices()
            .into_iter()
            .map(|index| roots[index].name.as_str())
            .collect()
    }

    pub(crate) fn natural_indices(&self) -> Vec<usize> {
        let incoming = self.in_degrees();
        let outgoing = self.out_degrees();
        (0..self.edges.len())
            .filter(|&index| incoming[index] == 0 && outgoing[index] > 0)
            .collect()
    }

    /// Edges as (from, to) root names, in file order.
    pub fn edges(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        let roots = self.archive.roots();
        self.edges.iter().enumerate().flat_map(move |(from, edges)| {
            edges
                .iter()
                .map(move |edge| (roots[from].name.as_str(), roots[edge.target].name.as_str()))
        })
    }

    /// Breadth-first closure over references from the named roots.
    pub fn closure<S: AsRef<str>>(&self, start: &[S]) -> Result<Closure> {
        let start = start
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.archive
                    .root_index(name)
                    .ok_or_else(|| Error::UnknownRoot(name.to_owned()))
            })
            .collect::<Result<Vec<_>>>()?;

        let roots = self.archive.roots();
        let (visited, spaces) = self.reach(&start);
        let reached = roots
            .iter()
            .zip(&visited)
            .filter(|(_, seen)| **seen)
            .map(|(root, _)| root.name.clone())
            .collect();
        Ok(Closure {
            roots: reached,
            spaces: spaces.into_iter().map(|index| roots[index].name.clone()).collect(),
        })
    }

    /// Closure by root index: a visited flag per root and the space roots named.
    pub(crate) fn reach(&self, start: &[usize]) -> (Vec<bool>, BTreeSet<usize>) {
        let mut visited = vec![false; self.edges.len()];
        let mut spaces = BTreeSet::new();
        let mut queue = VecDeque::new();

        for &index in start {
            if !visited[index] {
                visited[index] = true;
                queue.push_back(index);
            }
        }

        while let Some(index) = queue.pop_front() {
            for edge in &self.edges[index] {
                if let Some(space) = edge.space {
                    spaces.insert(space);
                }
                if !visited[edge.target] {
                    visited[edge.target] = true;
                    queue.push_back(edge.target);
                }
            }
        }
        (visited, spaces)
    }
}

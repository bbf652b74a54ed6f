//! B3D archive index.
//!
//! Parsing walks the node section once, skipping every body that does not
//! matter for splitting and merging. What remains is, per root, its byte
//! range, the positions of its texnum fields, and its type 18 references.

use std::path::Path;

use b3dkit_common::{text, BinaryReader};
use rustc_hash::FxHashMap;

use crate::chunk::Chunk;
use crate::geometry::{read_many, TexnumSite};
use crate::graph::ReferenceGraph;
use crate::tree::{read_forest, Node};
use crate::walk::{walk_nodes, NodeHeader, NodeVisitor};
use crate::{B3dHeader, Error, NodeBody, Result};

/// A type 18 link from one root to another.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RootReference {
    /// Root providing the space the added root lives in. May be empty.
    pub space_name: String,
    /// Root pulled in by the reference.
    pub add_name: String,
}

impl RootReference {
    /// The space name, unless it is empty or the "no name" sentinel.
    pub fn space(&self) -> Option<&str> {
        let name = self.space_name.as_str();
        (!name.is_empty() && !text::is_empty_name(name)).then_some(name)
    }
}

/// A top-level node and what it depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootNode {
    pub name: String,
    /// Offset of the root's begin marker in the file.
    pub start: usize,
    /// Length from the begin marker through the matching end marker.
    pub size: usize,
    /// Texnum fields in the subtree, with offsets relative to `start`.
    pub texnums: Vec<TexnumSite>,
    /// Type 18 references in the subtree, in file order.
    pub references: Vec<RootReference>,
}

impl RootNode {
    /// Byte range of the root within the file.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.size
    }
}

#[derive(Default)]
struct RootIndexer {
    roots: Vec<RootNode>,
    current: Option<RootNode>,
    sites: Vec<TexnumSite>,
}

impl NodeVisitor for RootIndexer {
    fn begin(&mut self, header: NodeHeader, reader: &mut BinaryReader<'_>) -> Result<()> {
        if header.depth == 0 {
            self.current = Some(RootNode {
                name: header.name,
                start: header.offset,
                size: 0,
                texnums: Vec::new(),
                references: Vec::new(),
            });
        }

        let node_type = header.node_type;
        if !NodeBody::has_texnums(node_type) && node_type != 18 {
            return NodeBody::skip(node_type, reader);
        }

        self.sites.clear();
        let body = NodeBody::read_with_sites(node_type, reader, &mut self.sites)?;
        if let Some(root) = self.current.as_mut() {
            root.texnums.extend(self.sites.iter().map(|site| TexnumSite {
                offset: site.offset - root.start,
                value: site.value,
            }));
            if let Some(reference) = body.as_reference() {
                root.references.push(RootReference {
                    space_name: reference.space_name.clone(),
                    add_name: reference.add_name.clone(),
                });
            }
        }
        Ok(())
    }

    fn end(&mut self, end: usize, depth: usize) -> Result<()> {
        if depth == 0 {
            if let Some(mut root) = self.current.take() {
                root.size = end - root.start;
                log::debug!(
                    "root {:?}: {} bytes, {} texnums, {} references",
                    root.name,
                    root.size,
                    root.texnums.len(),
                    root.references.len()
                );
                self.roots.push(root);
            }
        }
        Ok(())
    }
}

/// A parsed B3D archive.
///
/// The archive owns the file bytes; roots are addressed by byte range.
#[derive(Debug, Clone)]
pub struct B3dArchive {
    data: Vec<u8>,
    header: B3dHeader,
    materials: Vec<String>,
    nodes_start: usize,
    roots: Vec<RootNode>,
    by_name: FxHashMap<String, usize>,
}

impl B3dArchive {
    /// Check if data starts with the B3D magic.
    pub fn is_b3d(data: &[u8]) -> bool {
        data.starts_with(B3dHeader::MAGIC)
    }

    /// Read and parse a B3D file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_vec(data)
    }

    /// Parse a B3D archive from bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::from_vec(data.to_vec())
    }

    /// Parse a B3D archive, taking ownership of the bytes.
    pub fn from_vec(data: Vec<u8>) -> Result<Self> {
        if !Self::is_b3d(&data) {
            return Err(Error::InvalidMagic {
                actual: data[..B3dHeader::MAGIC.len().min(data.len())].to_vec(),
            });
        }

        let mut reader = BinaryReader::new(&data);
        let header: B3dHeader = reader.read_struct()?;

        let material_count = reader.read_u32()? as usize;
        let materials: Vec<String> = read_many(&mut reader, material_count)?;

        let marker_offset = reader.position();
        let marker = reader.read_u32()?;
        if marker != Chunk::BEGIN {
            return Err(Error::UnknownChunk {
                marker,
                offset: marker_offset,
            });
        }
        let nodes_start = reader.position();

        let mut indexer = RootIndexer::default();
        let open = walk_nodes(&mut reader, &mut indexer)?;
        if open > 0 {
            if let Some(root) = &indexer.current {
                log::warn!("root {:?} is not closed before the end of the node section", root.name);
            }
        }

        let mut by_name = FxHashMap::default();
        for (index, root) in indexer.roots.iter().enumerate() {
            if by_name.contains_key(&root.name) {
                log::warn!("duplicate root {:?}; name lookups use the first one", root.name);
            } else {
                by_name.insert(root.name.clone(), index);
            }
        }

        log::debug!(
            "parsed B3D: {} materials, {} roots",
            materials.len(),
            indexer.roots.len()
        );

        Ok(Self {
            data,
            header,
            materials,
            nodes_start,
            roots: indexer.roots,
            by_name,
        })
    }

    /// The file header as stored.
    pub fn header(&self) -> &B3dHeader {
        &self.header
    }

    /// The raw file bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Material names; texnum `n` refers to `materials()[n - 1]`.
    pub fn materials(&self) -> &[String] {
        &self.materials
    }

    /// Roots in file order.
    pub fn roots(&self) -> &[RootNode] {
        &self.roots
    }

    /// Index of the first root with the given name.
    pub fn root_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// First root with the given name.
    pub fn root(&self, name: &str) -> Option<&RootNode> {
        self.root_index(name).map(|index| &self.roots[index])
    }

    /// Raw bytes of a root, begin marker through end marker.
    pub fn root_bytes(&self, root: &RootNode) -> &[u8] {
        &self.data[root.range()]
    }

    /// Reference graph over the roots.
    pub fn graph(&self) -> ReferenceGraph<'_> {
        ReferenceGraph::new(self)
    }

    /// Materialize the whole node forest.
    pub fn read_tree(&self) -> Result<Vec<Node>> {
        let mut reader = BinaryReader::new_at(&self.data, self.nodes_start);
        read_forest(&mut reader)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geometry::{Polygon8, Sphere, Uv, Vertex8};
    use crate::node::{FaceList, Group, Mesh, Reference};
    use crate::writer::write_archive;
    use b3dkit_common::BinaryWriter;

    pub(crate) fn faces(texnums: &[u32]) -> NodeBody {
        NodeBody::Type8(FaceList {
            bound: Sphere::default(),
            polygons: texnums
                .iter()
                .map(|&texnum| Polygon8 {
                    format: 0x0003,
                    unknown_f: 0.0,
                    unknown_i: 0,
                    texnum,
                    vertices: vec![
                        Vertex8 {
                            index: 0,
                            uvs: vec![Uv::default()],
                            normal: None,
                        };
                        3
                    ],
                })
                .collect(),
        })
    }

    pub(crate) fn reference(space: &str, add: &str) -> Node {
        Node::new(
            "ref",
            NodeBody::Type18(Reference {
                bound: Sphere::default(),
                space_name: space.into(),
                add_name: add.into(),
            }),
        )
    }

    /// A root with one face list per texnum group and the given references.
    pub(crate) fn root(name: &str, texnums: &[u32], references: &[(&str, &str)]) -> Node {
        let mut node = Node::new(
            name,
            NodeBody::Type19(Group {
                child_count: (1 + references.len()) as u32,
            }),
        )
        .with_child(Node::new("faces", faces(texnums)));
        for (space, add) in references {
            node = node.with_child(reference(space, add));
        }
        node
    }

    /// Build archive bytes from materials and root nodes.
    pub(crate) fn build(materials: &[&str], roots: &[Node]) -> Vec<u8> {
        let blobs: Vec<Vec<u8>> = roots
            .iter()
            .map(|root| {
                let mut writer = BinaryWriter::new();
                root.write(&mut writer).unwrap();
                writer.finish().unwrap()
            })
            .collect();
        let materials: Vec<String> = materials.iter().map(|m| m.to_string()).collect();
        write_archive(&materials, blobs.iter().map(Vec::as_slice)).unwrap()
    }

    /// The CarBody / Wheel scenario.
    pub(crate) fn car() -> Vec<u8> {
        build(
            &["mat_metal", "mat_rubber"],
            &[
                root("CarBody", &[1], &[("", "Wheel")]),
                root("Wheel", &[2], &[]),
            ],
        )
    }

    #[test]
    fn test_parse_index() {
        let archive = B3dArchive::parse(&car()).unwrap();
        assert_eq!(archive.materials(), &["mat_metal", "mat_rubber"]);
        assert_eq!(archive.roots().len(), 2);

        let car = archive.root("CarBody").unwrap();
        assert_eq!(
            car.references,
            vec![RootReference {
                space_name: String::new(),
                add_name: "Wheel".into()
            }]
        );
        assert_eq!(car.texnums.len(), 1);
        assert_eq!(car.texnums[0].value, 1);

        let wheel = archive.root("Wheel").unwrap();
        assert_eq!(wheel.start, car.start + car.size);
        assert_eq!(wheel.texnums[0].value, 2);

        // Relative offsets point at the stored texnum.
        let bytes = archive.root_bytes(wheel);
        let offset = wheel.texnums[0].offset;
        assert_eq!(&bytes[offset..offset + 4], &2u32.to_le_bytes());
        assert_eq!(&bytes[..4], &Chunk::BEGIN.to_le_bytes());
        assert_eq!(&bytes[bytes.len() - 4..], &Chunk::END.to_le_bytes());
    }

    #[test]
    fn test_mesh_texnums_are_indexed() {
        let mesh = Node::new(
            "mesh",
            NodeBody::Type35(Mesh {
                bound: Sphere::default(),
                mesh_type: 0,
                texnum: 3,
                polygons: match faces(&[1, 2]) {
                    NodeBody::Type8(list) => list.polygons,
                    _ => unreachable!(),
                },
            }),
        );
        let data = build(&["a", "b", "c"], &[mesh]);
        let archive = B3dArchive::parse(&data).unwrap();
        let values: Vec<u32> = archive.roots()[0].texnums.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![3, 1, 2]);
    }

    #[test]
    fn test_invalid_magic() {
        assert!(matches!(
            B3dArchive::parse(b"res\0"),
            Err(Error::InvalidMagic { .. })
        ));
    }

    #[test]
    fn test_read_tree_matches_index() {
        let archive = B3dArchive::parse(&car()).unwrap();
        let tree = archive.read_tree().unwrap();
        assert_eq!(tree.len(), 2);
        for (node, root) in tree.iter().zip(archive.roots()) {
            assert_eq!(node.name, root.name);
            assert_eq!(node.offset, root.start);
        }
    }

    #[test]
    fn test_space_sentinel() {
        let reference = RootReference {
            space_name: "~".into(),
            add_name: "x".into(),
        };
        assert_eq!(reference.space(), None);
        let reference = RootReference {
            space_name: "world".into(),
            add_name: "x".into(),
        };
        assert_eq!(reference.space(), Some("world"));
    }
}

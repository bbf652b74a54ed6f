//! Fully materialized node forest.

use b3dkit_common::{BinaryReader, BinaryWriter};

use crate::chunk::Chunk;
use crate::geometry::Record;
use crate::walk::{walk_nodes, NodeHeader, NodeVisitor};
use crate::{NodeBody, Result};

/// A node with its typed body and nested children.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Node {
    pub name: String,
    pub node_type: u32,
    /// Offset of the node's begin marker in the source file.
    pub offset: usize,
    pub body: NodeBody,
    pub children: Vec<Node>,
}

impl Node {
    /// Create a node with no children. The offset is unknown until written.
    pub fn new(name: impl Into<String>, body: NodeBody) -> Self {
        Self {
            name: name.into(),
            node_type: body.node_type(),
            offset: 0,
            body,
            children: Vec::new(),
        }
    }

    /// Append a child, builder style.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Write this node and its subtree as begin/end chunks.
    pub fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        Chunk::Begin.write(writer)?;
        self.name.write(writer)?;
        writer.write_u32(self.body.node_type())?;
        self.body.write(writer)?;
        for child in &self.children {
            child.write(writer)?;
        }
        Chunk::End.write(writer)
    }

    /// Depth-first iterator over this node and all descendants.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

#[derive(Default)]
struct TreeBuilder {
    roots: Vec<Node>,
    stack: Vec<Node>,
}

impl NodeVisitor for TreeBuilder {
    fn begin(&mut self, header: NodeHeader, reader: &mut BinaryReader<'_>) -> Result<()> {
        let body = NodeBody::read(header.node_type, reader)?;
        self.stack.push(Node {
            name: header.name,
            node_type: header.node_type,
            offset: header.offset,
            body,
            children: Vec::new(),
        });
        Ok(())
    }

    fn end(&mut self, _end: usize, _depth: usize) -> Result<()> {
        if let Some(node) = self.stack.pop() {
            match self.stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => self.roots.push(node),
            }
        }
        Ok(())
    }
}

/// Materialize every node of a node section.
///
/// The reader must be positioned just past the begin-chunks marker.
/// Roots left open at the end-chunks marker are dropped with a warning.
pub(crate) fn read_forest(reader: &mut BinaryReader<'_>) -> Result<Vec<Node>> {
    let mut builder = TreeBuilder::default();
    let open = walk_nodes(reader, &mut builder)?;
    if open > 0 {
        if let Some(root) = builder.stack.first() {
            log::warn!("root {:?} is not closed before the end of the node section", root.name);
        }
    }
    Ok(builder.roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Group, Reference};
    use crate::geometry::Sphere;

    #[test]
    fn test_forest_roundtrip() {
        let root = Node::new("car", NodeBody::Type19(Group { child_count: 2 }))
            .with_child(Node::new(
                "ref",
                NodeBody::Type18(Reference {
                    bound: Sphere::default(),
                    space_name: String::new(),
                    add_name: "wheel".into(),
                }),
            ))
            .with_child(Node::new("inner", NodeBody::Type19(Group { child_count: 0 })));
        let wheel = Node::new("wheel", NodeBody::Type19(Group { child_count: 0 }));

        let mut writer = BinaryWriter::new();
        root.write(&mut writer).unwrap();
        wheel.write(&mut writer).unwrap();
        Chunk::EndChunks.write(&mut writer).unwrap();
        let bytes = writer.finish().unwrap();

        let forest = read_forest(&mut BinaryReader::new(&bytes)).unwrap();
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].name, "car");
        assert_eq!(forest[0].children.len(), 2);
        assert_eq!(forest[0].children[0].body, root.children[0].body);
        assert_eq!(forest[1].name, "wheel");
        assert_eq!(forest[0].offset, 0);
        assert!(forest[1].offset > 0);

        let names: Vec<&str> = forest[0].iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["car", "ref", "inner"]);
    }

    #[test]
    fn test_unterminated_root_is_dropped() {
        let mut writer = BinaryWriter::new();
        Node::new("done", NodeBody::Type19(Group { child_count: 0 }))
            .write(&mut writer)
            .unwrap();
        Chunk::Begin.write(&mut writer).unwrap();
        writer.write_name32("open").unwrap();
        writer.write_u32(19).unwrap();
        writer.write_u32(0).unwrap();
        Chunk::EndChunks.write(&mut writer).unwrap();
        let bytes = writer.finish().unwrap();

        let forest = read_forest(&mut BinaryReader::new(&bytes)).unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].name, "done");
    }
}

//! Depth-tracking walk over the chunk stream of the node section.

use b3dkit_common::BinaryReader;

use crate::chunk::Chunk;
use crate::geometry::Record;
use crate::{Error, Result};

/// Identity of a node at its begin marker.
#[derive(Debug, Clone)]
pub(crate) struct NodeHeader {
    /// Offset of the begin marker.
    pub offset: usize,
    /// Nesting depth; 0 for roots.
    pub depth: usize,
    pub name: String,
    pub node_type: u32,
}

/// Callbacks driven by [`walk_nodes`].
pub(crate) trait NodeVisitor {
    /// Called with the reader positioned on the node body, which must be
    /// consumed in full.
    fn begin(&mut self, header: NodeHeader, reader: &mut BinaryReader<'_>) -> Result<()>;

    /// Called after an end marker. `end` is the offset just past the marker
    /// and `depth` is the depth of the node being closed.
    fn end(&mut self, end: usize, depth: usize) -> Result<()>;
}

/// Walk chunks until the end-chunks marker.
///
/// Returns the nesting depth left open when the end-chunks marker was reached.
pub(crate) fn walk_nodes<V: NodeVisitor>(
    reader: &mut BinaryReader<'_>,
    visitor: &mut V,
) -> Result<usize> {
    let mut depth = 0usize;

    loop {
        let offset = reader.position();
        match Chunk::read(reader)? {
            Chunk::Begin => {
                let name = String::read(reader)?;
                let node_type = reader.read_u32()?;
                visitor.begin(
                    NodeHeader {
                        offset,
                        depth,
                        name,
                        node_type,
                    },
                    reader,
                )?;
                depth += 1;
            }
            Chunk::End => {
                if depth == 0 {
                    return Err(Error::UnbalancedEnd { offset });
                }
                depth -= 1;
                visitor.end(reader.position(), depth)?;
            }
            Chunk::Group => {}
            Chunk::EndChunks => return Ok(depth),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use b3dkit_common::BinaryWriter;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl NodeVisitor for Recorder {
        fn begin(&mut self, header: NodeHeader, reader: &mut BinaryReader<'_>) -> Result<()> {
            crate::NodeBody::skip(header.node_type, reader)?;
            self.events
                .push(format!("begin {} {} @{}", header.name, header.depth, header.offset));
            Ok(())
        }

        fn end(&mut self, end: usize, depth: usize) -> Result<()> {
            self.events.push(format!("end {depth} @{end}"));
            Ok(())
        }
    }

    fn begin_group(writer: &mut BinaryWriter, name: &str, children: u32) {
        writer.write_u32(Chunk::BEGIN).unwrap();
        writer.write_name32(name).unwrap();
        writer.write_u32(19).unwrap();
        writer.write_u32(children).unwrap();
    }

    #[test]
    fn test_walk_nested() {
        let mut writer = BinaryWriter::new();
        begin_group(&mut writer, "root", 1); // 0..44
        begin_group(&mut writer, "child", 0); // 44..88
        writer.write_u32(Chunk::END).unwrap(); // 88..92
        writer.write_u32(Chunk::GROUP).unwrap(); // 92..96
        writer.write_u32(Chunk::END).unwrap(); // 96..100
        writer.write_u32(Chunk::END_CHUNKS).unwrap();
        let bytes = writer.finish().unwrap();

        let mut recorder = Recorder::default();
        let open = walk_nodes(&mut BinaryReader::new(&bytes), &mut recorder).unwrap();
        assert_eq!(open, 0);
        assert_eq!(
            recorder.events,
            vec!["begin root 0 @0", "begin child 1 @44", "end 1 @92", "end 0 @100"]
        );
    }

    #[test]
    fn test_unbalanced_end() {
        let mut writer = BinaryWriter::new();
        writer.write_u32(Chunk::END).unwrap();
        let bytes = writer.finish().unwrap();

        let result = walk_nodes(&mut BinaryReader::new(&bytes), &mut Recorder::default());
        assert!(matches!(result, Err(Error::UnbalancedEnd { offset: 0 })));
    }

    #[test]
    fn test_missing_end_chunks() {
        let mut writer = BinaryWriter::new();
        begin_group(&mut writer, "root", 0);
        writer.write_u32(Chunk::END).unwrap();
        let bytes = writer.finish().unwrap();

        let result = walk_nodes(&mut BinaryReader::new(&bytes), &mut Recorder::default());
        assert!(matches!(result, Err(Error::MissingEndChunks)));
    }

    #[test]
    fn test_open_depth_is_reported() {
        let mut writer = BinaryWriter::new();
        begin_group(&mut writer, "root", 0);
        writer.write_u32(Chunk::END_CHUNKS).unwrap();
        let bytes = writer.finish().unwrap();

        let open = walk_nodes(&mut BinaryReader::new(&bytes), &mut Recorder::default()).unwrap();
        assert_eq!(open, 1);
    }
}

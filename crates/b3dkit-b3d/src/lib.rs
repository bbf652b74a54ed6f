//! B3D scene archive reader, splitter and merger.
//!
//! A B3D file holds a materials list followed by a forest of typed nodes.
//! Each top-level node (a root) is a self-contained unit that can be cut out
//! of one archive and written into another, provided the texture indices
//! (texnums) in its geometry are rewritten for the new materials list.
//!
//! - [`B3dArchive`] - Parses a file into per-root byte ranges, texnum sites
//!   and type 18 references, skipping everything else
//! - [`ReferenceGraph`] - Natural roots and reference closures
//! - [`extract`], [`remove`], [`merge`] - Produce new archives
//! - [`Node`] / [`NodeBody`] - The fully materialized node tree
//!
//! # Example
//!
//! ```no_run
//! use b3dkit_b3d::{extract, B3dArchive, ExtractOptions, RootSelection};
//!
//! let archive = B3dArchive::open("trucks.b3d")?;
//! let options = ExtractOptions {
//!     roots: RootSelection::Named(vec!["CarBody".into()]),
//!     follow_references: true,
//!     ..Default::default()
//! };
//! for output in extract(&archive, &options)? {
//!     std::fs::write("car.b3d", &output.data)?;
//! }
//! # Ok::<(), b3dkit_b3d::Error>(())
//! ```

mod archive;
mod chunk;
mod error;
mod extract;
mod geometry;
mod graph;
mod header;
mod materials;
mod merge;
pub mod node;
mod remove;
mod summary;
mod tree;
mod walk;
mod writer;

pub use archive::{B3dArchive, RootNode, RootReference};
pub use chunk::Chunk;
pub use error::{Error, Result};
pub use extract::{extract, ExtractOptions, Extracted, RootOrder, RootSelection};
pub use geometry::{
    Color, ComplexVertex, Normal, Point3, Polygon28, Polygon8, SimpleVertex, Sphere, TexnumSite,
    Uv, Vertex28, Vertex8,
};
pub use graph::{Closure, ReferenceGraph};
pub use header::B3dHeader;
pub use materials::{merged_materials, used_materials, TexnumMap};
pub use merge::{merge, MergeOptions, Merged};
pub use node::NodeBody;
pub use remove::{remove, RemoveOptions, Removed};
pub use summary::{RootSummary, Summary};
pub use tree::Node;
pub use writer::write_archive;

//! b3dkit - B3D scene and RES resource archive toolkit.
//!
//! This crate provides a unified interface to the b3dkit crates.
//!
//! # Crates
//!
//! - [`b3dkit_common`] - Binary reading and writing, cp1251 names, wildcards
//! - [`b3dkit_b3d`] - B3D scene archives: roots, references, texnum renumbering
//! - [`b3dkit_res`] - RES resource archives: sections, materials, sounds
//!
//! # Example
//!
//! ```no_run
//! use b3dkit::prelude::*;
//!
//! let scene = B3dArchive::open("trucks.b3d")?;
//! let resources = ResArchive::open("trucks.res")?;
//!
//! // Keep only the materials the scene uses.
//! let graph = ReferenceGraph::new(&scene);
//! println!("{} natural roots", graph.natural_roots().len());
//! let used = used_materials(scene.materials(), scene.roots())?;
//! let options = ResExtractOptions::default()
//!     .select(SectionKind::Materials, Selection::exact(&used))
//!     .select(SectionKind::TextureFiles, Selection::Ref);
//! let output = extract_res(&resources, &options)?;
//! println!("{} materials kept", output.records[&SectionKind::Materials].len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use b3dkit_b3d as b3d;
pub use b3dkit_common as common;
pub use b3dkit_res as res;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use b3dkit_b3d::{
        extract as extract_b3d, merge as merge_b3d, remove as remove_b3d, used_materials,
        B3dArchive, ExtractOptions as B3dExtractOptions, MergeOptions as B3dMergeOptions,
        ReferenceGraph, RemoveOptions as B3dRemoveOptions, RootOrder, RootSelection, Summary,
    };
    pub use b3dkit_common::NameFilter;
    pub use b3dkit_res::{
        extract as extract_res, merge as merge_res, remove as remove_res,
        ExtractOptions as ResExtractOptions, MergeOptions as ResMergeOptions, ResArchive,
        ResOutput, RemoveOptions as ResRemoveOptions, SectionKind, Selection,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! RES resource archive reader, extractor and merger.
//!
//! A RES file is a sequence of named sections. File sections (palettes,
//! sounds, backgrounds, masks, textures) hold `name\0` rows followed by a
//! sized payload; COLORS, MATERIALS and SOUNDS hold plain text rows. MATERIALS
//! and SOUNDS point into other sections by 1-based index, so any operation
//! that drops or reorders records renumbers those references.
//!
//! - [`ResArchive`] - Parsed sections with record spans into the source bytes
//! - [`extract`] - Keep selected records, following references on demand
//! - [`remove`] - Drop records, cascading to the records that use them
//! - [`merge`] - Union of two archives by record name
//!
//! # Example
//!
//! ```no_run
//! use b3dkit_res::{extract, ExtractOptions, ResArchive, SectionKind, Selection};
//!
//! let archive = ResArchive::open("common.res")?;
//! let options = ExtractOptions::default()
//!     .select(SectionKind::Materials, Selection::patterns(["glass*"])?)
//!     .select(SectionKind::TextureFiles, Selection::Ref);
//! let output = extract(&archive, &options)?;
//! std::fs::write("glass.res", &output.data)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod archive;
mod error;
mod extract;
mod material;
mod merge;
mod reader;
mod remap;
mod remove;
mod section;
mod selection;
mod sound;
mod writer;

pub use archive::ResArchive;
pub use error::{Error, Result};
pub use extract::{extract, ExtractOptions, ResOutput};
pub use material::{Material, MaterialKey, MaterialParam};
pub use merge::{merge, MergeOptions};
pub use reader::{Record, Section};
pub use remap::IndexMap;
pub use remove::{remove, RemoveOptions};
pub use section::{RecordShape, SectionKind};
pub use selection::Selection;
pub use sound::Sound;
pub use writer::{OutRecord, ResWriter};

//! Section kinds.

use std::fmt;

/// How records of a section are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// `row\0`, `u32` size, payload.
    Blob,
    /// One NUL-terminated line.
    Text,
}

/// One of the eight RES sections, ordered as they appear on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SectionKind {
    PaletteFiles,
    SoundFiles,
    BackFiles,
    MaskFiles,
    TextureFiles,
    Colors,
    Materials,
    Sounds,
}

impl SectionKind {
    /// All sections in on-disk order.
    pub const ALL: [SectionKind; 8] = [
        SectionKind::PaletteFiles,
        SectionKind::SoundFiles,
        SectionKind::BackFiles,
        SectionKind::MaskFiles,
        SectionKind::TextureFiles,
        SectionKind::Colors,
        SectionKind::Materials,
        SectionKind::Sounds,
    ];

    /// The section name used in headers.
    pub fn name(self) -> &'static str {
        match self {
            SectionKind::PaletteFiles => "PALETTEFILES",
            SectionKind::SoundFiles => "SOUNDFILES",
            SectionKind::BackFiles => "BACKFILES",
            SectionKind::MaskFiles => "MASKFILES",
            SectionKind::TextureFiles => "TEXTUREFILES",
            SectionKind::Colors => "COLORS",
            SectionKind::Materials => "MATERIALS",
            SectionKind::Sounds => "SOUNDS",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn shape(self) -> RecordShape {
        match self {
            SectionKind::Colors | SectionKind::Materials | SectionKind::Sounds => RecordShape::Text,
            _ => RecordShape::Blob,
        }
    }

    /// Position in [`SectionKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for (index, kind) in SectionKind::ALL.into_iter().enumerate() {
            assert_eq!(SectionKind::from_name(kind.name()), Some(kind));
            assert_eq!(kind.index(), index);
        }
        assert_eq!(SectionKind::from_name("textures"), None);
    }

    #[test]
    fn test_shapes() {
        assert_eq!(SectionKind::Materials.shape(), RecordShape::Text);
        assert_eq!(SectionKind::TextureFiles.shape(), RecordShape::Blob);
        assert!(SectionKind::PaletteFiles < SectionKind::Sounds);
    }
}

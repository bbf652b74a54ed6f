//! SOUNDS rows: `name soundfile_index`.

use crate::{Error, Result, SectionKind};

/// A parsed SOUNDS row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Sound {
    pub name: String,
    /// 1-based index into SOUNDFILES.
    pub soundfile: u32,
}

impl Sound {
    pub fn parse(row: &str) -> Result<Self> {
        row.rsplit_once(' ')
            .and_then(|(name, index)| {
                Some(Self {
                    name: name.to_owned(),
                    soundfile: index.parse().ok()?,
                })
            })
            .ok_or_else(|| Error::InvalidRecord {
                section: SectionKind::Sounds,
                row: row.to_owned(),
            })
    }

    pub fn to_row(&self) -> String {
        format!("{} {}", self.name, self.soundfile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let sound = Sound::parse("engine 3").unwrap();
        assert_eq!(sound.name, "engine");
        assert_eq!(sound.soundfile, 3);
        assert_eq!(sound.to_row(), "engine 3");
    }

    #[test]
    fn test_invalid() {
        assert!(Sound::parse("engine").is_err());
        assert!(Sound::parse("engine x").is_err());
    }
}

//! MATERIALS rows.
//!
//! A row is the material name, a space, then parameters separated by two
//! spaces: `wall tex 3  col 12  "par 2"`. Parameters may be wrapped in
//! quotes. Five keys hold 1-based indices into other sections; everything
//! else is carried through as written.

use std::fmt;

use crate::{Error, Result, SectionKind};

/// Parameter keys that reference another record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum MaterialKey {
    Tex,
    Ttx,
    Itx,
    Msk,
    Par,
}

impl MaterialKey {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "tex" => MaterialKey::Tex,
            "ttx" => MaterialKey::Ttx,
            "itx" => MaterialKey::Itx,
            "msk" => MaterialKey::Msk,
            "par" => MaterialKey::Par,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            MaterialKey::Tex => "tex",
            MaterialKey::Ttx => "ttx",
            MaterialKey::Itx => "itx",
            MaterialKey::Msk => "msk",
            MaterialKey::Par => "par",
        }
    }

    /// The section the index points into.
    pub fn target(self) -> SectionKind {
        match self {
            MaterialKey::Tex | MaterialKey::Ttx | MaterialKey::Itx => SectionKind::TextureFiles,
            MaterialKey::Msk => SectionKind::MaskFiles,
            MaterialKey::Par => SectionKind::Materials,
        }
    }
}

impl fmt::Display for MaterialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One material parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MaterialParam {
    /// Text as written in the row, quotes included.
    pub raw: String,
    /// The reference this parameter holds, if its key is a reference key.
    pub link: Option<(MaterialKey, u32)>,
}

impl MaterialParam {
    fn parse(raw: &str, row: &str) -> Result<Self> {
        let unquoted = raw.replace('"', "");
        let mut tokens = unquoted.split(' ');
        let link = match tokens.next().and_then(MaterialKey::from_name) {
            Some(key) => {
                let index = tokens
                    .next()
                    .and_then(|value| value.parse().ok())
                    .ok_or_else(|| Error::InvalidRecord {
                        section: SectionKind::Materials,
                        row: row.to_owned(),
                    })?;
                Some((key, index))
            }
            None => None,
        };
        Ok(Self {
            raw: raw.to_owned(),
            link,
        })
    }
}

/// A parsed MATERIALS row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Material {
    pub name: String,
    pub params: Vec<MaterialParam>,
    /// The first parameter follows the name after a single space.
    #[cfg_attr(feature = "serde", serde(skip))]
    inline_first: bool,
}

impl Material {
    pub fn parse(row: &str) -> Result<Self> {
        let mut segments = row.split("  ");
        let first = segments.next().unwrap_or_default();
        let (name, inline) = match first.split_once(' ') {
            Some((name, param)) => (name, Some(param)),
            None => (first, None),
        };
        let params = inline
            .into_iter()
            .chain(segments)
            .map(|raw| MaterialParam::parse(raw, row))
            .collect::<Result<_>>()?;
        Ok(Self {
            name: name.to_owned(),
            params,
            inline_first: inline.is_some(),
        })
    }

    /// References in parameter order.
    pub fn links(&self) -> impl Iterator<Item = (MaterialKey, u32)> + '_ {
        self.params.iter().filter_map(|param| param.link)
    }

    /// The first value of a reference key.
    pub fn get(&self, key: MaterialKey) -> Option<u32> {
        self.links().find(|&(k, _)| k == key).map(|(_, index)| index)
    }

    /// Rewrite every reference through `f`.
    ///
    /// A changed parameter is written back unquoted as `key value`; the rest
    /// keep their original text.
    pub fn map_links<F>(&self, mut f: F) -> Result<Self>
    where
        F: FnMut(MaterialKey, u32) -> Result<u32>,
    {
        let params = self
            .params
            .iter()
            .map(|param| {
                let Some((key, index)) = param.link else {
                    return Ok(param.clone());
                };
                let mapped = f(key, index)?;
                if mapped == index {
                    return Ok(param.clone());
                }
                Ok(MaterialParam {
                    raw: format!("{key} {mapped}"),
                    link: Some((key, mapped)),
                })
            })
            .collect::<Result<_>>()?;
        Ok(Self {
            name: self.name.clone(),
            params,
            inline_first: self.inline_first,
        })
    }

    /// The row as written to disk.
    pub fn to_row(&self) -> String {
        let mut row = self.name.clone();
        for (index, param) in self.params.iter().enumerate() {
            row.push_str(if index == 0 && self.inline_first { " " } else { "  " });
            row.push_str(&param.raw);
        }
        row
    }
}

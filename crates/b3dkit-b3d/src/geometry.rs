//! Fixed-size geometry records and the variable vertex layouts of polygon nodes.

use b3dkit_common::{text, BinaryReader, BinaryWriter};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{Error, Result};

/// A record with a fixed on-disk size.
pub trait Record: Sized {
    /// Size in bytes.
    const SIZE: usize;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self>;

    fn write(&self, writer: &mut BinaryWriter) -> Result<()>;

    fn skip(reader: &mut BinaryReader<'_>) -> Result<()> {
        reader.skip(Self::SIZE)?;
        Ok(())
    }
}

macro_rules! plain_record {
    ($ty:ty) => {
        impl Record for $ty {
            const SIZE: usize = std::mem::size_of::<$ty>();

            fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
                Ok(reader.read_struct::<$ty>()?)
            }

            fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
                writer.write_bytes(self.as_bytes())?;
                Ok(())
            }
        }
    };
}

/// A 3D point or direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(C)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// A texture coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(C)]
pub struct Uv {
    pub u: f32,
    pub v: f32,
}

/// A bounding sphere.
#[derive(Debug, Clone, Copy, Default, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(C)]
pub struct Sphere {
    pub center: Point3,
    pub radius: f32,
}

/// An RGB colour.
#[derive(Debug, Clone, Copy, Default, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// A position with one texture coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(C)]
pub struct SimpleVertex {
    pub position: Point3,
    pub uv: Uv,
}

plain_record!(Point3);
plain_record!(Uv);
plain_record!(Sphere);
plain_record!(Color);
plain_record!(SimpleVertex);

impl Record for u32 {
    const SIZE: usize = 4;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(reader.read_u32()?)
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        writer.write_u32(*self)?;
        Ok(())
    }
}

impl Record for f32 {
    const SIZE: usize = 4;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(reader.read_f32()?)
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        writer.write_f32(*self)?;
        Ok(())
    }
}

/// Fixed 32-byte name field.
impl Record for String {
    const SIZE: usize = text::NAME_LEN;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let field = reader.read_array::<{ text::NAME_LEN }>()?;
        Ok(text::decode_name32(&field))
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        writer.write_name32(self)?;
        Ok(())
    }
}

/// Pairs that appear in a few lookup tables.
impl<A: Record, B: Record> Record for (A, B) {
    const SIZE: usize = A::SIZE + B::SIZE;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok((A::read(reader)?, B::read(reader)?))
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        self.0.write(writer)?;
        self.1.write(writer)
    }
}

/// Read a u32 count followed by that many records.
pub(crate) fn read_counted<T: Record>(reader: &mut BinaryReader<'_>) -> Result<Vec<T>> {
    let count = reader.read_u32()? as usize;
    read_many(reader, count)
}

/// Read `count` records, checking the byte length up front.
pub(crate) fn read_many<T: Record>(reader: &mut BinaryReader<'_>, count: usize) -> Result<Vec<T>> {
    reader.peek_bytes(count.saturating_mul(T::SIZE))?;
    (0..count).map(|_| T::read(reader)).collect()
}

/// Skip a u32 count followed by that many records.
pub(crate) fn skip_counted<T: Record>(reader: &mut BinaryReader<'_>) -> Result<()> {
    let count = reader.read_u32()? as usize;
    skip_many::<T>(reader, count)
}

pub(crate) fn skip_many<T: Record>(reader: &mut BinaryReader<'_>, count: usize) -> Result<()> {
    reader.skip(count.saturating_mul(T::SIZE))?;
    Ok(())
}

pub(crate) fn write_counted<T: Record>(writer: &mut BinaryWriter, items: &[T]) -> Result<()> {
    writer.write_u32(items.len() as u32)?;
    write_many(writer, items)
}

pub(crate) fn write_many<T: Record>(writer: &mut BinaryWriter, items: &[T]) -> Result<()> {
    for item in items {
        item.write(writer)?;
    }
    Ok(())
}

/// A texture index field found while reading, with its absolute offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TexnumSite {
    pub offset: usize,
    pub value: u32,
}

/// Read a texnum field and record where it was.
pub(crate) fn read_texnum(reader: &mut BinaryReader<'_>, sites: &mut Vec<TexnumSite>) -> Result<u32> {
    let offset = reader.position();
    let value = reader.read_u32()?;
    sites.push(TexnumSite { offset, value });
    Ok(value)
}

/// Stored form of a vertex normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalKind {
    /// A full direction vector.
    Vector,
    /// A single scalar.
    Offset,
}

impl NormalKind {
    fn size(self) -> usize {
        match self {
            Self::Vector => Point3::SIZE,
            Self::Offset => f32::SIZE,
        }
    }
}

/// A vertex normal.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Normal {
    Vector(Point3),
    Offset(f32),
}

impl Normal {
    pub fn kind(&self) -> NormalKind {
        match self {
            Self::Vector(_) => NormalKind::Vector,
            Self::Offset(_) => NormalKind::Offset,
        }
    }

    fn read(reader: &mut BinaryReader<'_>, kind: NormalKind) -> Result<Self> {
        Ok(match kind {
            NormalKind::Vector => Self::Vector(Point3::read(reader)?),
            NormalKind::Offset => Self::Offset(reader.read_f32()?),
        })
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        match self {
            Self::Vector(point) => point.write(writer),
            Self::Offset(value) => value.write(writer),
        }
    }
}

/// Per-vertex shape derived from a polygon or mesh format word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    /// Number of texture coordinates stored per vertex.
    pub uvs: usize,
    /// Stored normal, if any.
    pub normal: Option<NormalKind>,
}

impl VertexLayout {
    /// Layout of vertices in polygons of type 8 and 35 nodes.
    ///
    /// The stored format word has its lowest bit inverted.
    pub fn polygon8(format_raw: u32) -> Self {
        let format = format_raw ^ 1;
        let use_uv = format & 0b10 != 0;
        let use_normal = format & 0b10_0000 != 0 && format & 0b1_0000 != 0;
        let uvs = if use_uv {
            ((format & 0xff00) >> 8) as usize + 1
        } else {
            0
        };
        let normal = use_normal.then(|| {
            if format & 1 != 0 {
                NormalKind::Vector
            } else {
                NormalKind::Offset
            }
        });
        Self { uvs, normal }
    }

    /// Layout of vertices in polygons of type 28 nodes. These never carry normals.
    pub fn polygon28(format: u32) -> Self {
        let uvs = if format & 0b10 != 0 {
            ((format & 0xff00) >> 8) as usize + 1
        } else {
            0
        };
        Self { uvs, normal: None }
    }

    /// Layout of the extra data in type 36 and 37 mesh vertices.
    ///
    /// `uvs` counts only the extra coordinates after the first one.
    pub fn mesh(format: u32) -> Self {
        let normal = match format & 0xff {
            1 | 2 => NormalKind::Vector,
            _ => NormalKind::Offset,
        };
        Self {
            uvs: (format >> 8) as usize,
            normal: Some(normal),
        }
    }

    fn normal_size(&self) -> usize {
        self.normal.map_or(0, NormalKind::size)
    }

    fn read_uvs(&self, reader: &mut BinaryReader<'_>) -> Result<Vec<Uv>> {
        read_many(reader, self.uvs)
    }

    fn read_normal(&self, reader: &mut BinaryReader<'_>) -> Result<Option<Normal>> {
        self.normal.map(|kind| Normal::read(reader, kind)).transpose()
    }

    fn matches(&self, uvs: &[Uv], normal: Option<&Normal>) -> bool {
        uvs.len() == self.uvs && normal.map(Normal::kind) == self.normal
    }
}

/// A vertex of a type 8 / 35 polygon.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Vertex8 {
    pub index: u32,
    pub uvs: Vec<Uv>,
    pub normal: Option<Normal>,
}

/// A polygon of a type 8 or type 35 node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Polygon8 {
    pub format: u32,
    pub unknown_f: f32,
    pub unknown_i: u32,
    pub texnum: u32,
    pub vertices: Vec<Vertex8>,
}

/// Size of a polygon header up to and including the vertex count.
pub(crate) const POLYGON_HEADER_SIZE: usize = 20;

impl Polygon8 {
    pub fn layout(&self) -> VertexLayout {
        VertexLayout::polygon8(self.format)
    }

    pub(crate) fn read(reader: &mut BinaryReader<'_>, sites: &mut Vec<TexnumSite>) -> Result<Self> {
        let format = reader.read_u32()?;
        let unknown_f = reader.read_f32()?;
        let unknown_i = reader.read_u32()?;
        let texnum = read_texnum(reader, sites)?;
        let count = reader.read_u32()? as usize;

        let layout = VertexLayout::polygon8(format);
        let vertex_size = 4 + layout.uvs * Uv::SIZE + layout.normal_size();
        reader.peek_bytes(count.saturating_mul(vertex_size))?;

        let vertices = (0..count)
            .map(|_| {
                Ok(Vertex8 {
                    index: reader.read_u32()?,
                    uvs: layout.read_uvs(reader)?,
                    normal: layout.read_normal(reader)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            format,
            unknown_f,
            unknown_i,
            texnum,
            vertices,
        })
    }

    pub(crate) fn skip(reader: &mut BinaryReader<'_>) -> Result<()> {
        let format = reader.read_u32()?;
        reader.skip(12)?;
        let count = reader.read_u32()? as usize;

        let layout = VertexLayout::polygon8(format);
        let vertex_size = 4 + layout.uvs * Uv::SIZE + layout.normal_size();
        reader.skip(count.saturating_mul(vertex_size))?;
        Ok(())
    }

    pub(crate) fn write(&self, writer: &mut BinaryWriter, node_type: u32) -> Result<()> {
        let layout = self.layout();
        writer.write_u32(self.format)?;
        writer.write_f32(self.unknown_f)?;
        writer.write_u32(self.unknown_i)?;
        writer.write_u32(self.texnum)?;
        writer.write_u32(self.vertices.len() as u32)?;
        for vertex in &self.vertices {
            if !layout.matches(&vertex.uvs, vertex.normal.as_ref()) {
                return Err(Error::VertexLayoutMismatch {
                    node_type,
                    format: self.format,
                });
            }
            writer.write_u32(vertex.index)?;
            write_many(writer, &vertex.uvs)?;
            if let Some(normal) = &vertex.normal {
                normal.write(writer)?;
            }
        }
        Ok(())
    }
}

/// A vertex of a type 28 sprite polygon.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Vertex28 {
    pub scale_u: u32,
    pub scale_v: u32,
    pub uvs: Vec<Uv>,
}

/// A polygon of a type 28 sprite node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Polygon28 {
    pub format: u32,
    pub unknown_f: f32,
    pub unknown_i: u32,
    pub texnum: u32,
    pub vertices: Vec<Vertex28>,
}

impl Polygon28 {
    pub fn layout(&self) -> VertexLayout {
        VertexLayout::polygon28(self.format)
    }

    pub(crate) fn read(reader: &mut BinaryReader<'_>, sites: &mut Vec<TexnumSite>) -> Result<Self> {
        let format = reader.read_u32()?;
        let unknown_f = reader.read_f32()?;
        let unknown_i = reader.read_u32()?;
        let texnum = read_texnum(reader, sites)?;
        let count = reader.read_u32()? as usize;

        let layout = VertexLayout::polygon28(format);
        reader.peek_bytes(count.saturating_mul(8 + layout.uvs * Uv::SIZE))?;

        let vertices = (0..count)
            .map(|_| {
                Ok(Vertex28 {
                    scale_u: reader.read_u32()?,
                    scale_v: reader.read_u32()?,
                    uvs: layout.read_uvs(reader)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            format,
            unknown_f,
            unknown_i,
            texnum,
            vertices,
        })
    }

    pub(crate) fn skip(reader: &mut BinaryReader<'_>) -> Result<()> {
        let format = reader.read_u32()?;
        reader.skip(12)?;
        let count = reader.read_u32()? as usize;

        let layout = VertexLayout::polygon28(format);
        reader.skip(count.saturating_mul(8 + layout.uvs * Uv::SIZE))?;
        Ok(())
    }

    pub(crate) fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        let layout = self.layout();
        writer.write_u32(self.format)?;
        writer.write_f32(self.unknown_f)?;
        writer.write_u32(self.unknown_i)?;
        writer.write_u32(self.texnum)?;
        writer.write_u32(self.vertices.len() as u32)?;
        for vertex in &self.vertices {
            if !layout.matches(&vertex.uvs, None) {
                return Err(Error::VertexLayoutMismatch {
                    node_type: 28,
                    format: self.format,
                });
            }
            writer.write_u32(vertex.scale_u)?;
            writer.write_u32(vertex.scale_v)?;
            write_many(writer, &vertex.uvs)?;
        }
        Ok(())
    }
}

/// A vertex of a type 36 / 37 mesh.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ComplexVertex {
    pub position: Point3,
    pub uv: Uv,
    pub extra_uvs: Vec<Uv>,
    pub normal: Normal,
}

impl ComplexVertex {
    fn size(layout: &VertexLayout) -> usize {
        Point3::SIZE + Uv::SIZE + layout.uvs * Uv::SIZE + layout.normal_size()
    }

    pub(crate) fn read_all(
        reader: &mut BinaryReader<'_>,
        format: u32,
        count: usize,
    ) -> Result<Vec<Self>> {
        let layout = VertexLayout::mesh(format);
        let normal_kind = layout.normal.unwrap_or(NormalKind::Offset);
        reader.peek_bytes(count.saturating_mul(Self::size(&layout)))?;
        (0..count)
            .map(|_| {
                let position = Point3::read(reader)?;
                let uv = Uv::read(reader)?;
                let extra_uvs = layout.read_uvs(reader)?;
                let normal = Normal::read(reader, normal_kind)?;
                Ok(Self {
                    position,
                    uv,
                    extra_uvs,
                    normal,
                })
            })
            .collect()
    }

    pub(crate) fn skip_all(reader: &mut BinaryReader<'_>, format: u32, count: usize) -> Result<()> {
        let layout = VertexLayout::mesh(format);
        reader.skip(count.saturating_mul(Self::size(&layout)))?;
        Ok(())
    }

    pub(crate) fn write_all(
        writer: &mut BinaryWriter,
        vertices: &[Self],
        format: u32,
        node_type: u32,
    ) -> Result<()> {
        let layout = VertexLayout::mesh(format);
        for vertex in vertices {
            if !layout.matches(&vertex.extra_uvs, Some(&vertex.normal)) {
                return Err(Error::VertexLayoutMismatch { node_type, format });
            }
            vertex.position.write(writer)?;
            vertex.uv.write(writer)?;
            write_many(writer, &vertex.extra_uvs)?;
            vertex.normal.write(writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sizes() {
        assert_eq!(Point3::SIZE, 12);
        assert_eq!(Uv::SIZE, 8);
        assert_eq!(Sphere::SIZE, 16);
        assert_eq!(Color::SIZE, 12);
        assert_eq!(SimpleVertex::SIZE, 20);
        assert_eq!(String::SIZE, 32);
        assert_eq!(<(Point3, u32)>::SIZE, 16);
    }

    #[test]
    fn test_polygon8_layout() {
        // Stored 0x0003 -> effective 0x0002: one uv, no normal.
        assert_eq!(
            VertexLayout::polygon8(0x0003),
            VertexLayout { uvs: 1, normal: None }
        );
        // Effective 0x0132: two uvs and a scalar normal.
        assert_eq!(
            VertexLayout::polygon8(0x0133),
            VertexLayout {
                uvs: 2,
                normal: Some(NormalKind::Offset)
            }
        );
        // Effective 0x0033: one uv and a vector normal.
        assert_eq!(
            VertexLayout::polygon8(0x0032),
            VertexLayout {
                uvs: 1,
                normal: Some(NormalKind::Vector)
            }
        );
        // Uv bit clear: extra uv count is ignored.
        assert_eq!(VertexLayout::polygon8(0x0201).uvs, 0);
    }

    #[test]
    fn test_mesh_layout() {
        assert_eq!(
            VertexLayout::mesh(0x0102),
            VertexLayout {
                uvs: 1,
                normal: Some(NormalKind::Vector)
            }
        );
        assert_eq!(VertexLayout::mesh(0x0003).normal, Some(NormalKind::Offset));
    }

    #[test]
    fn test_polygon8_read_skip_write_agree() {
        let polygon = Polygon8 {
            format: 0x0133,
            unknown_f: 0.5,
            unknown_i: 7,
            texnum: 3,
            vertices: vec![
                Vertex8 {
                    index: 0,
                    uvs: vec![Uv::default(); 2],
                    normal: Some(Normal::Offset(1.0)),
                },
                Vertex8 {
                    index: 1,
                    uvs: vec![Uv { u: 1.0, v: 0.0 }; 2],
                    normal: Some(Normal::Offset(-1.0)),
                },
            ],
        };
        let mut writer = BinaryWriter::new();
        polygon.write(&mut writer, 8).unwrap();
        let bytes = writer.finish().unwrap();
        assert_eq!(bytes.len(), POLYGON_HEADER_SIZE + 2 * (4 + 16 + 4));

        let mut sites = Vec::new();
        let mut reader = BinaryReader::new(&bytes);
        assert_eq!(Polygon8::read(&mut reader, &mut sites).unwrap(), polygon);
        assert!(reader.is_empty());
        assert_eq!(sites, vec![TexnumSite { offset: 12, value: 3 }]);

        let mut reader = BinaryReader::new(&bytes);
        Polygon8::skip(&mut reader).unwrap();
        assert!(reader.is_empty());
    }

    #[test]
    fn test_polygon_write_rejects_mismatched_vertex() {
        let polygon = Polygon8 {
            format: 0x0003,
            unknown_f: 0.0,
            unknown_i: 0,
            texnum: 1,
            vertices: vec![Vertex8 {
                index: 0,
                uvs: Vec::new(),
                normal: None,
            }],
        };
        let mut writer = BinaryWriter::new();
        assert!(matches!(
            polygon.write(&mut writer, 8),
            Err(Error::VertexLayoutMismatch { node_type: 8, .. })
        ));
    }

    #[test]
    fn test_truncated_vertex_list() {
        let mut writer = BinaryWriter::new();
        for word in [0x0003u32, 0, 0, 1, 1000] {
            writer.write_u32(word).unwrap();
        }
        let bytes = writer.finish().unwrap();
        let mut reader = BinaryReader::new(&bytes);
        assert!(Polygon8::read(&mut reader, &mut Vec::new()).is_err());
    }
}

//! Node bodies.
//!
//! Every node starts with a 32-byte name and a 4-byte type tag, followed by a
//! body whose layout depends on the tag. [`NodeBody`] is a closed enum with
//! one variant per known tag. Each body can be materialized
//! ([`NodeBody::read`]), skipped without allocating ([`NodeBody::skip`]), or
//! written back ([`NodeBody::write`]); all three consume the same bytes.
//!
//! Container bodies end with a child count. Children are not part of the body:
//! they follow as nested begin/end chunks.

use b3dkit_common::{BinaryReader, BinaryWriter};

use crate::geometry::{
    read_counted, read_many, skip_counted, skip_many, write_counted, write_many, Color,
    ComplexVertex, Point3, Polygon28, Polygon8, Record, SimpleVertex, Sphere, TexnumSite,
};
use crate::{Error, Result};

/// Shared read / skip / write contract of every body struct.
pub(crate) trait Body: Sized {
    fn read(reader: &mut BinaryReader<'_>, sites: &mut Vec<TexnumSite>) -> Result<Self>;

    fn skip(reader: &mut BinaryReader<'_>) -> Result<()>;

    fn write(&self, writer: &mut BinaryWriter, node_type: u32) -> Result<()>;
}

impl<T: Record + Copy + Default, const N: usize> Record for [T; N] {
    const SIZE: usize = T::SIZE * N;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let mut out = [T::default(); N];
        for slot in &mut out {
            *slot = T::read(reader)?;
        }
        Ok(out)
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        write_many(writer, self)
    }
}

/// Fixed-size bodies are plain records.
macro_rules! record_body {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Body for $ty {
                fn read(reader: &mut BinaryReader<'_>, _sites: &mut Vec<TexnumSite>) -> Result<Self> {
                    <$ty as Record>::read(reader)
                }

                fn skip(reader: &mut BinaryReader<'_>) -> Result<()> {
                    <$ty as Record>::skip(reader)
                }

                fn write(&self, writer: &mut BinaryWriter, _node_type: u32) -> Result<()> {
                    <$ty as Record>::write(self, writer)
                }
            }
        )*
    };
}

/// Type 0: eleven scalars.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FloatBlock {
    pub values: [f32; 11],
}

impl Record for FloatBlock {
    const SIZE: usize = <[f32; 11]>::SIZE;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            values: Record::read(reader)?,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        self.values.write(writer)
    }
}

/// Type 1: two names.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NamePair {
    pub first: String,
    pub second: String,
}

impl Record for NamePair {
    const SIZE: usize = String::SIZE * 2;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            first: String::read(reader)?,
            second: String::read(reader)?,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        self.first.write(writer)?;
        self.second.write(writer)
    }
}

/// Types 2, 9, 10, 11 and 22: a group with two spheres.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BoundedGroup {
    pub bound: Sphere,
    pub extra: Sphere,
    pub child_count: u32,
}

impl Record for BoundedGroup {
    const SIZE: usize = Sphere::SIZE * 2 + 4;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            bound: Sphere::read(reader)?,
            extra: Sphere::read(reader)?,
            child_count: reader.read_u32()?,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        self.bound.write(writer)?;
        self.extra.write(writer)?;
        self.child_count.write(writer)
    }
}

/// Type 3: a bounded group.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SphereGroup {
    pub bound: Sphere,
    pub child_count: u32,
}

impl Record for SphereGroup {
    const SIZE: usize = Sphere::SIZE + 4;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            bound: Sphere::read(reader)?,
            child_count: reader.read_u32()?,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        self.bound.write(writer)?;
        self.child_count.write(writer)
    }
}

/// Type 4: a group carrying two names.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DoubleNamedGroup {
    pub bound: Sphere,
    pub first: String,
    pub second: String,
    pub child_count: u32,
}

impl Record for DoubleNamedGroup {
    const SIZE: usize = Sphere::SIZE + String::SIZE * 2 + 4;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            bound: Sphere::read(reader)?,
            first: String::read(reader)?,
            second: String::read(reader)?,
            child_count: reader.read_u32()?,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        self.bound.write(writer)?;
        self.first.write(writer)?;
        self.second.write(writer)?;
        self.child_count.write(writer)
    }
}

/// Type 5: a named group.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NamedGroup {
    pub bound: Sphere,
    pub name: String,
    pub child_count: u32,
}

impl Record for NamedGroup {
    const SIZE: usize = Sphere::SIZE + String::SIZE + 4;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            bound: Sphere::read(reader)?,
            name: String::read(reader)?,
            child_count: reader.read_u32()?,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        self.bound.write(writer)?;
        self.name.write(writer)?;
        self.child_count.write(writer)
    }
}

/// Type 6: a vertex list carrying two names.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DoubleNamedVertices {
    pub bound: Sphere,
    pub first: String,
    pub second: String,
    pub vertices: Vec<SimpleVertex>,
    pub child_count: u32,
}

impl Body for DoubleNamedVertices {
    fn read(reader: &mut BinaryReader<'_>, _sites: &mut Vec<TexnumSite>) -> Result<Self> {
        Ok(Self {
            bound: Sphere::read(reader)?,
            first: String::read(reader)?,
            second: String::read(reader)?,
            vertices: read_counted(reader)?,
            child_count: reader.read_u32()?,
        })
    }

    fn skip(reader: &mut BinaryReader<'_>) -> Result<()> {
        reader.skip(Sphere::SIZE + String::SIZE * 2)?;
        skip_counted::<SimpleVertex>(reader)?;
        reader.skip(4)?;
        Ok(())
    }

    fn write(&self, writer: &mut BinaryWriter, _node_type: u32) -> Result<()> {
        self.bound.write(writer)?;
        self.first.write(writer)?;
        self.second.write(writer)?;
        write_counted(writer, &self.vertices)?;
        self.child_count.write(writer)
    }
}

/// Type 7: a named vertex list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NamedVertices {
    pub bound: Sphere,
    pub name: String,
    pub vertices: Vec<SimpleVertex>,
    pub child_count: u32,
}

impl Body for NamedVertices {
    fn read(reader: &mut BinaryReader<'_>, _sites: &mut Vec<TexnumSite>) -> Result<Self> {
        Ok(Self {
            bound: Sphere::read(reader)?,
            name: String::read(reader)?,
            vertices: read_counted(reader)?,
            child_count: reader.read_u32()?,
        })
    }

    fn skip(reader: &mut BinaryReader<'_>) -> Result<()> {
        reader.skip(Sphere::SIZE + String::SIZE)?;
        skip_counted::<SimpleVertex>(reader)?;
        reader.skip(4)?;
        Ok(())
    }

    fn write(&self, writer: &mut BinaryWriter, _node_type: u32) -> Result<()> {
        self.bound.write(writer)?;
        self.name.write(writer)?;
        write_counted(writer, &self.vertices)?;
        self.child_count.write(writer)
    }
}

fn read_polygons8(reader: &mut BinaryReader<'_>, sites: &mut Vec<TexnumSite>) -> Result<Vec<Polygon8>> {
    let count = reader.read_u32()?;
    (0..count).map(|_| Polygon8::read(reader, sites)).collect()
}

fn skip_polygons8(reader: &mut BinaryReader<'_>) -> Result<()> {
    let count = reader.read_u32()?;
    for _ in 0..count {
        Polygon8::skip(reader)?;
    }
    Ok(())
}

fn write_polygons8(writer: &mut BinaryWriter, polygons: &[Polygon8], node_type: u32) -> Result<()> {
    writer.write_u32(polygons.len() as u32)?;
    for polygon in polygons {
        polygon.write(writer, node_type)?;
    }
    Ok(())
}

/// Type 8: textured faces over the enclosing vertex list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FaceList {
    pub bound: Sphere,
    pub polygons: Vec<Polygon8>,
}

impl Body for FaceList {
    fn read(reader: &mut BinaryReader<'_>, sites: &mut Vec<TexnumSite>) -> Result<Self> {
        Ok(Self {
            bound: Sphere::read(reader)?,
            polygons: read_polygons8(reader, sites)?,
        })
    }

    fn skip(reader: &mut BinaryReader<'_>) -> Result<()> {
        Sphere::skip(reader)?;
        skip_polygons8(reader)
    }

    fn write(&self, writer: &mut BinaryWriter, node_type: u32) -> Result<()> {
        self.bound.write(writer)?;
        write_polygons8(writer, &self.polygons, node_type)
    }
}

/// Types 12 and 14: two spheres, two integers and a scalar list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DualSphereFloats {
    pub bound: Sphere,
    pub extra: Sphere,
    pub unknown: [u32; 2],
    pub floats: Vec<f32>,
}

impl Body for DualSphereFloats {
    fn read(reader: &mut BinaryReader<'_>, _sites: &mut Vec<TexnumSite>) -> Result<Self> {
        Ok(Self {
            bound: Sphere::read(reader)?,
            extra: Sphere::read(reader)?,
            unknown: Record::read(reader)?,
            floats: read_counted(reader)?,
        })
    }

    fn skip(reader: &mut BinaryReader<'_>) -> Result<()> {
        reader.skip(Sphere::SIZE * 2 + 8)?;
        skip_counted::<f32>(reader)
    }

    fn write(&self, writer: &mut BinaryWriter, _node_type: u32) -> Result<()> {
        self.bound.write(writer)?;
        self.extra.write(writer)?;
        self.unknown.write(writer)?;
        write_counted(writer, &self.floats)
    }
}

/// Types 13 and 15: a sphere, two integers and a scalar list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SphereFloats {
    pub bound: Sphere,
    pub unknown: [u32; 2],
    pub floats: Vec<f32>,
}

impl Body for SphereFloats {
    fn read(reader: &mut BinaryReader<'_>, _sites: &mut Vec<TexnumSite>) -> Result<Self> {
        Ok(Self {
            bound: Sphere::read(reader)?,
            unknown: Record::read(reader)?,
            floats: read_counted(reader)?,
        })
    }

    fn skip(reader: &mut BinaryReader<'_>) -> Result<()> {
        reader.skip(Sphere::SIZE + 8)?;
        skip_counted::<f32>(reader)
    }

    fn write(&self, writer: &mut BinaryWriter, _node_type: u32) -> Result<()> {
        self.bound.write(writer)?;
        self.unknown.write(writer)?;
        write_counted(writer, &self.floats)
    }
}

/// Types 16 and 17: a segment between two points with parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Segment {
    pub bound: Sphere,
    pub start: Point3,
    pub end: Point3,
    pub unknown_f: [f32; 2],
    pub unknown_i: [u32; 2],
    pub floats: Vec<f32>,
}

impl Body for Segment {
    fn read(reader: &mut BinaryReader<'_>, _sites: &mut Vec<TexnumSite>) -> Result<Self> {
        Ok(Self {
            bound: Sphere::read(reader)?,
            start: Point3::read(reader)?,
            end: Point3::read(reader)?,
            unknown_f: Record::read(reader)?,
            unknown_i: Record::read(reader)?,
            floats: read_counted(reader)?,
        })
    }

    fn skip(reader: &mut BinaryReader<'_>) -> Result<()> {
        reader.skip(Sphere::SIZE + Point3::SIZE * 2 + 16)?;
        skip_counted::<f32>(reader)
    }

    fn write(&self, writer: &mut BinaryWriter, _node_type: u32) -> Result<()> {
        self.bound.write(writer)?;
        self.start.write(writer)?;
        self.end.write(writer)?;
        self.unknown_f.write(writer)?;
        self.unknown_i.write(writer)?;
        write_counted(writer, &self.floats)
    }
}

/// Type 18: pulls another root (and optionally a space root) into this one.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Reference {
    pub bound: Sphere,
    pub space_name: String,
    pub add_name: String,
}

impl Record for Reference {
    const SIZE: usize = Sphere::SIZE + String::SIZE * 2;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            bound: Sphere::read(reader)?,
            space_name: String::read(reader)?,
            add_name: String::read(reader)?,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        self.bound.write(writer)?;
        self.space_name.write(writer)?;
        self.add_name.write(writer)
    }
}

/// Type 19: a bare group.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Group {
    pub child_count: u32,
}

impl Record for Group {
    const SIZE: usize = 4;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            child_count: reader.read_u32()?,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        self.child_count.write(writer)
    }
}

/// Type 20: a polyline. The coordinate count precedes the scalar list
/// but the coordinates follow it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Outline {
    pub bound: Sphere,
    pub unknown: [u32; 2],
    pub floats: Vec<f32>,
    pub coords: Vec<Point3>,
}

impl Body for Outline {
    fn read(reader: &mut BinaryReader<'_>, _sites: &mut Vec<TexnumSite>) -> Result<Self> {
        let bound = Sphere::read(reader)?;
        let coord_count = reader.read_u32()? as usize;
        let unknown = Record::read(reader)?;
        let floats = read_counted(reader)?;
        let coords = read_many(reader, coord_count)?;
        Ok(Self {
            bound,
            unknown,
            floats,
            coords,
        })
    }

    fn skip(reader: &mut BinaryReader<'_>) -> Result<()> {
        Sphere::skip(reader)?;
        let coord_count = reader.read_u32()? as usize;
        reader.skip(8)?;
        skip_counted::<f32>(reader)?;
        skip_many::<Point3>(reader, coord_count)
    }

    fn write(&self, writer: &mut BinaryWriter, _node_type: u32) -> Result<()> {
        self.bound.write(writer)?;
        writer.write_u32(self.coords.len() as u32)?;
        self.unknown.write(writer)?;
        write_counted(writer, &self.floats)?;
        write_many(writer, &self.coords)
    }
}

/// Type 21: a switch selecting between child groups.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Switch {
    pub bound: Sphere,
    pub group_count: u32,
    pub unknown: u32,
    pub child_count: u32,
}

impl Record for Switch {
    const SIZE: usize = Sphere::SIZE + 12;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            bound: Sphere::read(reader)?,
            group_count: reader.read_u32()?,
            unknown: reader.read_u32()?,
            child_count: reader.read_u32()?,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        self.bound.write(writer)?;
        self.group_count.write(writer)?;
        self.unknown.write(writer)?;
        self.child_count.write(writer)
    }
}

/// Type 23: collision faces, each a list of points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CollisionMesh {
    pub unknown: u32,
    pub surface: u32,
    pub floats: Vec<f32>,
    pub faces: Vec<Vec<Point3>>,
}

impl Body for CollisionMesh {
    fn read(reader: &mut BinaryReader<'_>, _sites: &mut Vec<TexnumSite>) -> Result<Self> {
        let unknown = reader.read_u32()?;
        let surface = reader.read_u32()?;
        let floats = read_counted(reader)?;
        let face_count = reader.read_u32()?;
        let faces = (0..face_count)
            .map(|_| read_counted(reader))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            unknown,
            surface,
            floats,
            faces,
        })
    }

    fn skip(reader: &mut BinaryReader<'_>) -> Result<()> {
        reader.skip(8)?;
        skip_counted::<f32>(reader)?;
        let face_count = reader.read_u32()?;
        for _ in 0..face_count {
            skip_counted::<Point3>(reader)?;
        }
        Ok(())
    }

    fn write(&self, writer: &mut BinaryWriter, _node_type: u32) -> Result<()> {
        self.unknown.write(writer)?;
        self.surface.write(writer)?;
        write_counted(writer, &self.floats)?;
        writer.write_u32(self.faces.len() as u32)?;
        for face in &self.faces {
            write_counted(writer, face)?;
        }
        Ok(())
    }
}

/// Type 24: a local coordinate frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Transform {
    pub axes: [Point3; 3],
    pub position: Point3,
    pub flag: u32,
    pub child_count: u32,
}

impl Record for Transform {
    const SIZE: usize = Point3::SIZE * 4 + 8;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            axes: Record::read(reader)?,
            position: Point3::read(reader)?,
            flag: reader.read_u32()?,
            child_count: reader.read_u32()?,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        self.axes.write(writer)?;
        self.position.write(writer)?;
        self.flag.write(writer)?;
        self.child_count.write(writer)
    }
}

/// Type 25: a named emitter between two points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Emitter {
    pub unknown_f: f32,
    pub unknown_i: [u32; 2],
    pub name: String,
    pub first: Point3,
    pub second: Point3,
    pub params: [f32; 5],
}

impl Record for Emitter {
    const SIZE: usize = 12 + String::SIZE + Point3::SIZE * 2 + 20;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            unknown_f: reader.read_f32()?,
            unknown_i: Record::read(reader)?,
            name: String::read(reader)?,
            first: Point3::read(reader)?,
            second: Point3::read(reader)?,
            params: Record::read(reader)?,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        self.unknown_f.write(writer)?;
        self.unknown_i.write(writer)?;
        self.name.write(writer)?;
        self.first.write(writer)?;
        self.second.write(writer)?;
        self.params.write(writer)
    }
}

/// Type 26: a bounded group with three axis points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Axes {
    pub bound: Sphere,
    pub axes: [Point3; 3],
    pub child_count: u32,
}

impl Record for Axes {
    const SIZE: usize = Sphere::SIZE + Point3::SIZE * 3 + 4;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            bound: Sphere::read(reader)?,
            axes: Record::read(reader)?,
            child_count: reader.read_u32()?,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        self.bound.write(writer)?;
        self.axes.write(writer)?;
        self.child_count.write(writer)
    }
}

/// Type 27: a point marker with a material slot.
///
/// The material field is not a texnum and is never remapped.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Marker {
    pub bound: Sphere,
    pub flag: u32,
    pub point: Point3,
    pub material: u32,
}

impl Record for Marker {
    const SIZE: usize = Sphere::SIZE + 4 + Point3::SIZE + 4;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            bound: Sphere::read(reader)?,
            flag: reader.read_u32()?,
            point: Point3::read(reader)?,
            material: reader.read_u32()?,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        self.bound.write(writer)?;
        self.flag.write(writer)?;
        self.point.write(writer)?;
        self.material.write(writer)
    }
}

/// Type 28: camera-facing sprite polygons.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Sprite {
    pub bound: Sphere,
    pub center: Point3,
    pub polygons: Vec<Polygon28>,
}

impl Body for Sprite {
    fn read(reader: &mut BinaryReader<'_>, sites: &mut Vec<TexnumSite>) -> Result<Self> {
        let bound = Sphere::read(reader)?;
        let center = Point3::read(reader)?;
        let count = reader.read_u32()?;
        let polygons = (0..count)
            .map(|_| Polygon28::read(reader, sites))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            bound,
            center,
            polygons,
        })
    }

    fn skip(reader: &mut BinaryReader<'_>) -> Result<()> {
        reader.skip(Sphere::SIZE + Point3::SIZE)?;
        let count = reader.read_u32()?;
        for _ in 0..count {
            Polygon28::skip(reader)?;
        }
        Ok(())
    }

    fn write(&self, writer: &mut BinaryWriter, _node_type: u32) -> Result<()> {
        self.bound.write(writer)?;
        self.center.write(writer)?;
        writer.write_u32(self.polygons.len() as u32)?;
        for polygon in &self.polygons {
            polygon.write(writer)?;
        }
        Ok(())
    }
}

/// Type 29: a group with a second sphere and a scalar list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SphereFloatsGroup {
    pub bound: Sphere,
    pub unknown: [u32; 2],
    pub extra: Sphere,
    pub floats: Vec<f32>,
    pub child_count: u32,
}

impl Body for SphereFloatsGroup {
    fn read(reader: &mut BinaryReader<'_>, _sites: &mut Vec<TexnumSite>) -> Result<Self> {
        Ok(Self {
            bound: Sphere::read(reader)?,
            unknown: Record::read(reader)?,
            extra: Sphere::read(reader)?,
            floats: read_counted(reader)?,
            child_count: reader.read_u32()?,
        })
    }

    fn skip(reader: &mut BinaryReader<'_>) -> Result<()> {
        reader.skip(Sphere::SIZE * 2 + 8)?;
        skip_counted::<f32>(reader)?;
        reader.skip(4)?;
        Ok(())
    }

    fn write(&self, writer: &mut BinaryWriter, _node_type: u32) -> Result<()> {
        self.bound.write(writer)?;
        self.unknown.write(writer)?;
        self.extra.write(writer)?;
        write_counted(writer, &self.floats)?;
        self.child_count.write(writer)
    }
}

/// Type 30: a portal into a named room.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Portal {
    pub bound: Sphere,
    pub room_name: String,
    pub first: Point3,
    pub second: Point3,
}

impl Record for Portal {
    const SIZE: usize = Sphere::SIZE + String::SIZE + Point3::SIZE * 2;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            bound: Sphere::read(reader)?,
            room_name: String::read(reader)?,
            first: Point3::read(reader)?,
            second: Point3::read(reader)?,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        self.bound.write(writer)?;
        self.room_name.write(writer)?;
        self.first.write(writer)?;
        self.second.write(writer)
    }
}

/// Type 31: a weighted table. The entry count precedes the second sphere.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WeightTable {
    pub bound: Sphere,
    pub extra: Sphere,
    pub unknown: u32,
    pub point: Point3,
    pub entries: Vec<(f32, u32)>,
}

impl Body for WeightTable {
    fn read(reader: &mut BinaryReader<'_>, _sites: &mut Vec<TexnumSite>) -> Result<Self> {
        let bound = Sphere::read(reader)?;
        let count = reader.read_u32()? as usize;
        let extra = Sphere::read(reader)?;
        let unknown = reader.read_u32()?;
        let point = Point3::read(reader)?;
        let entries = read_many(reader, count)?;
        Ok(Self {
            bound,
            extra,
            unknown,
            point,
            entries,
        })
    }

    fn skip(reader: &mut BinaryReader<'_>) -> Result<()> {
        Sphere::skip(reader)?;
        let count = reader.read_u32()? as usize;
        reader.skip(Sphere::SIZE + 4 + Point3::SIZE)?;
        skip_many::<(f32, u32)>(reader, count)
    }

    fn write(&self, writer: &mut BinaryWriter, _node_type: u32) -> Result<()> {
        self.bound.write(writer)?;
        writer.write_u32(self.entries.len() as u32)?;
        self.extra.write(writer)?;
        self.unknown.write(writer)?;
        self.point.write(writer)?;
        write_many(writer, &self.entries)
    }
}

/// Type 33: a light source.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Light {
    pub bound: Sphere,
    pub use_lights: u32,
    pub light_type: u32,
    pub flag: u32,
    pub first: Point3,
    pub second: Point3,
    pub unknown_a: [f32; 2],
    pub radius: f32,
    pub intensity: f32,
    pub unknown_b: [f32; 2],
    pub color: Color,
    pub child_count: u32,
}

impl Record for Light {
    const SIZE: usize = Sphere::SIZE + 12 + Point3::SIZE * 2 + 24 + Color::SIZE + 4;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            bound: Sphere::read(reader)?,
            use_lights: reader.read_u32()?,
            light_type: reader.read_u32()?,
            flag: reader.read_u32()?,
            first: Point3::read(reader)?,
            second: Point3::read(reader)?,
            unknown_a: Record::read(reader)?,
            radius: reader.read_f32()?,
            intensity: reader.read_f32()?,
            unknown_b: Record::read(reader)?,
            color: Color::read(reader)?,
            child_count: reader.read_u32()?,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        self.bound.write(writer)?;
        self.use_lights.write(writer)?;
        self.light_type.write(writer)?;
        self.flag.write(writer)?;
        self.first.write(writer)?;
        self.second.write(writer)?;
        self.unknown_a.write(writer)?;
        self.radius.write(writer)?;
        self.intensity.write(writer)?;
        self.unknown_b.write(writer)?;
        self.color.write(writer)?;
        self.child_count.write(writer)
    }
}

/// Type 34: a table of tagged points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PointTable {
    pub bound: Sphere,
    pub unknown: u32,
    pub entries: Vec<(Point3, u32)>,
}

impl Body for PointTable {
    fn read(reader: &mut BinaryReader<'_>, _sites: &mut Vec<TexnumSite>) -> Result<Self> {
        Ok(Self {
            bound: Sphere::read(reader)?,
            unknown: reader.read_u32()?,
            entries: read_counted(reader)?,
        })
    }

    fn skip(reader: &mut BinaryReader<'_>) -> Result<()> {
        reader.skip(Sphere::SIZE + 4)?;
        skip_counted::<(Point3, u32)>(reader)
    }

    fn write(&self, writer: &mut BinaryWriter, _node_type: u32) -> Result<()> {
        self.bound.write(writer)?;
        self.unknown.write(writer)?;
        write_counted(writer, &self.entries)
    }
}

/// Type 35: a textured mesh. Carries its own texnum besides the polygons' ones.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Mesh {
    pub bound: Sphere,
    pub mesh_type: u32,
    pub texnum: u32,
    pub polygons: Vec<Polygon8>,
}

impl Body for Mesh {
    fn read(reader: &mut BinaryReader<'_>, sites: &mut Vec<TexnumSite>) -> Result<Self> {
        Ok(Self {
            bound: Sphere::read(reader)?,
            mesh_type: reader.read_u32()?,
            texnum: crate::geometry::read_texnum(reader, sites)?,
            polygons: read_polygons8(reader, sites)?,
        })
    }

    fn skip(reader: &mut BinaryReader<'_>) -> Result<()> {
        reader.skip(Sphere::SIZE + 8)?;
        skip_polygons8(reader)
    }

    fn write(&self, writer: &mut BinaryWriter, node_type: u32) -> Result<()> {
        self.bound.write(writer)?;
        self.mesh_type.write(writer)?;
        self.texnum.write(writer)?;
        write_polygons8(writer, &self.polygons, node_type)
    }
}

/// Type 36: a vertex mesh carrying two names.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DoubleNamedMesh {
    pub bound: Sphere,
    pub first: String,
    pub second: String,
    pub format: u32,
    pub vertices: Vec<ComplexVertex>,
    pub child_count: u32,
}

impl Body for DoubleNamedMesh {
    fn read(reader: &mut BinaryReader<'_>, _sites: &mut Vec<TexnumSite>) -> Result<Self> {
        let bound = Sphere::read(reader)?;
        let first = String::read(reader)?;
        let second = String::read(reader)?;
        let format = reader.read_u32()?;
        let count = reader.read_u32()? as usize;
        let vertices = ComplexVertex::read_all(reader, format, count)?;
        let child_count = reader.read_u32()?;
        Ok(Self {
            bound,
            first,
            second,
            format,
            vertices,
            child_count,
        })
    }

    fn skip(reader: &mut BinaryReader<'_>) -> Result<()> {
        reader.skip(Sphere::SIZE + String::SIZE * 2)?;
        let format = reader.read_u32()?;
        let count = reader.read_u32()? as usize;
        ComplexVertex::skip_all(reader, format, count)?;
        reader.skip(4)?;
        Ok(())
    }

    fn write(&self, writer: &mut BinaryWriter, node_type: u32) -> Result<()> {
        self.bound.write(writer)?;
        self.first.write(writer)?;
        self.second.write(writer)?;
        self.format.write(writer)?;
        writer.write_u32(self.vertices.len() as u32)?;
        ComplexVertex::write_all(writer, &self.vertices, self.format, node_type)?;
        self.child_count.write(writer)
    }
}

/// Type 37: a named vertex mesh.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NamedMesh {
    pub bound: Sphere,
    pub name: String,
    pub format: u32,
    pub vertices: Vec<ComplexVertex>,
    pub child_count: u32,
}

impl Body for NamedMesh {
    fn read(reader: &mut BinaryReader<'_>, _sites: &mut Vec<TexnumSite>) -> Result<Self> {
        let bound = Sphere::read(reader)?;
        let name = String::read(reader)?;
        let format = reader.read_u32()?;
        let count = reader.read_u32()? as usize;
        let vertices = ComplexVertex::read_all(reader, format, count)?;
        let child_count = reader.read_u32()?;
        Ok(Self {
            bound,
            name,
            format,
            vertices,
            child_count,
        })
    }

    fn skip(reader: &mut BinaryReader<'_>) -> Result<()> {
        reader.skip(Sphere::SIZE + String::SIZE)?;
        let format = reader.read_u32()?;
        let count = reader.read_u32()? as usize;
        ComplexVertex::skip_all(reader, format, count)?;
        reader.skip(4)?;
        Ok(())
    }

    fn write(&self, writer: &mut BinaryWriter, node_type: u32) -> Result<()> {
        self.bound.write(writer)?;
        self.name.write(writer)?;
        self.format.write(writer)?;
        writer.write_u32(self.vertices.len() as u32)?;
        ComplexVertex::write_all(writer, &self.vertices, self.format, node_type)?;
        self.child_count.write(writer)
    }
}

/// Type 39: fog settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Fog {
    pub bound: Sphere,
    pub color: u32,
    pub unknown: [f32; 2],
    pub start: f32,
    pub end: f32,
    pub color_id: u32,
    pub child_count: u32,
}

impl Record for Fog {
    const SIZE: usize = Sphere::SIZE + 28;

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            bound: Sphere::read(reader)?,
            color: reader.read_u32()?,
            unknown: Record::read(reader)?,
            start: reader.read_f32()?,
            end: reader.read_f32()?,
            color_id: reader.read_u32()?,
            child_count: reader.read_u32()?,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        self.bound.write(writer)?;
        self.color.write(writer)?;
        self.unknown.write(writer)?;
        self.start.write(writer)?;
        self.end.write(writer)?;
        self.color_id.write(writer)?;
        self.child_count.write(writer)
    }
}

/// Type 40: a named generator with parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Generator {
    pub bound: Sphere,
    pub first: String,
    pub second: String,
    pub unknown: [u32; 2],
    pub floats: Vec<f32>,
}

impl Body for Generator {
    fn read(reader: &mut BinaryReader<'_>, _sites: &mut Vec<TexnumSite>) -> Result<Self> {
        Ok(Self {
            bound: Sphere::read(reader)?,
            first: String::read(reader)?,
            second: String::read(reader)?,
            unknown: Record::read(reader)?,
            floats: read_counted(reader)?,
        })
    }

    fn skip(reader: &mut BinaryReader<'_>) -> Result<()> {
        reader.skip(Sphere::SIZE + String::SIZE * 2 + 8)?;
        skip_counted::<f32>(reader)
    }

    fn write(&self, writer: &mut BinaryWriter, _node_type: u32) -> Result<()> {
        self.bound.write(writer)?;
        self.first.write(writer)?;
        self.second.write(writer)?;
        self.unknown.write(writer)?;
        write_counted(writer, &self.floats)
    }
}

record_body!(
    FloatBlock,
    NamePair,
    BoundedGroup,
    SphereGroup,
    DoubleNamedGroup,
    NamedGroup,
    Reference,
    Group,
    Switch,
    Transform,
    Emitter,
    Axes,
    Marker,
    Portal,
    Light,
    Fog,
);

macro_rules! node_bodies {
    ($($tag:literal => $variant:ident($body:ty)),* $(,)?) => {
        /// A node body, one variant per type tag.
        #[derive(Debug, Clone, PartialEq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
        pub enum NodeBody {
            $($variant($body),)*
        }

        impl NodeBody {
            /// Type tag of this body.
            pub fn node_type(&self) -> u32 {
                match self {
                    $(Self::$variant(_) => $tag,)*
                }
            }

            /// Whether a type tag has a known layout.
            pub fn is_known(node_type: u32) -> bool {
                matches!(node_type, $($tag)|*)
            }

            /// Materialize a body, recording every texnum field into `sites`.
            ///
            /// The reader must be positioned just past the type tag.
            pub fn read_with_sites(
                node_type: u32,
                reader: &mut BinaryReader<'_>,
                sites: &mut Vec<TexnumSite>,
            ) -> Result<Self> {
                match node_type {
                    $($tag => Ok(Self::$variant(<$body as Body>::read(reader, sites)?)),)*
                    _ => Err(unknown_type(node_type, reader)),
                }
            }

            /// Advance past a body without materializing it.
            pub fn skip(node_type: u32, reader: &mut BinaryReader<'_>) -> Result<()> {
                match node_type {
                    $($tag => <$body as Body>::skip(reader),)*
                    _ => Err(unknown_type(node_type, reader)),
                }
            }

            /// Write the body (without the name and type tag).
            pub fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
                match self {
                    $(Self::$variant(body) => <$body as Body>::write(body, writer, $tag),)*
                }
            }
        }
    };
}

fn unknown_type(node_type: u32, reader: &BinaryReader<'_>) -> Error {
    Error::UnknownNodeType {
        node_type,
        offset: reader.position().saturating_sub(4),
    }
}

node_bodies! {
    0 => Type0(FloatBlock),
    1 => Type1(NamePair),
    2 => Type2(BoundedGroup),
    3 => Type3(SphereGroup),
    4 => Type4(DoubleNamedGroup),
    5 => Type5(NamedGroup),
    6 => Type6(DoubleNamedVertices),
    7 => Type7(NamedVertices),
    8 => Type8(FaceList),
    9 => Type9(BoundedGroup),
    10 => Type10(BoundedGroup),
    11 => Type11(BoundedGroup),
    12 => Type12(DualSphereFloats),
    13 => Type13(SphereFloats),
    14 => Type14(DualSphereFloats),
    15 => Type15(SphereFloats),
    16 => Type16(Segment),
    17 => Type17(Segment),
    18 => Type18(Reference),
    19 => Type19(Group),
    20 => Type20(Outline),
    21 => Type21(Switch),
    22 => Type22(BoundedGroup),
    23 => Type23(CollisionMesh),
    24 => Type24(Transform),
    25 => Type25(Emitter),
    26 => Type26(Axes),
    27 => Type27(Marker),
    28 => Type28(Sprite),
    29 => Type29(SphereFloatsGroup),
    30 => Type30(Portal),
    31 => Type31(WeightTable),
    33 => Type33(Light),
    34 => Type34(PointTable),
    35 => Type35(Mesh),
    36 => Type36(DoubleNamedMesh),
    37 => Type37(NamedMesh),
    39 => Type39(Fog),
    40 => Type40(Generator),
}

impl NodeBody {
    /// Materialize a body.
    pub fn read(node_type: u32, reader: &mut BinaryReader<'_>) -> Result<Self> {
        Self::read_with_sites(node_type, reader, &mut Vec::new())
    }

    /// Whether a type tag declares a trailing child count.
    pub fn is_container(node_type: u32) -> bool {
        matches!(
            node_type,
            2 | 3 | 4 | 5 | 6 | 7 | 9 | 10 | 11 | 19 | 21 | 22 | 24 | 26 | 29 | 33 | 36 | 37 | 39
        )
    }

    /// Declared child count of a container body.
    pub fn child_count(&self) -> Option<u32> {
        match self {
            Self::Type2(b) | Self::Type9(b) | Self::Type10(b) | Self::Type11(b) | Self::Type22(b) => {
                Some(b.child_count)
            }
            Self::Type3(b) => Some(b.child_count),
            Self::Type4(b) => Some(b.child_count),
            Self::Type5(b) => Some(b.child_count),
            Self::Type6(b) => Some(b.child_count),
            Self::Type7(b) => Some(b.child_count),
            Self::Type19(b) => Some(b.child_count),
            Self::Type21(b) => Some(b.child_count),
            Self::Type24(b) => Some(b.child_count),
            Self::Type26(b) => Some(b.child_count),
            Self::Type29(b) => Some(b.child_count),
            Self::Type33(b) => Some(b.child_count),
            Self::Type36(b) => Some(b.child_count),
            Self::Type37(b) => Some(b.child_count),
            Self::Type39(b) => Some(b.child_count),
            _ => None,
        }
    }

    /// The reference pair of a type 18 body.
    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Self::Type18(reference) => Some(reference),
            _ => None,
        }
    }

    /// Whether bodies of this type carry texnum fields.
    pub fn has_texnums(node_type: u32) -> bool {
        matches!(node_type, 8 | 28 | 35)
    }
}

//! Binary writer with reserve-then-backpatch support.
//!
//! Container formats often store section sizes ahead of the section body.
//! [`BinaryWriter::reserve_u32`] emits a zeroed placeholder and hands back a
//! [`Placeholder`] token; once the value is known, [`BinaryWriter::patch_u32`]
//! consumes the token and overwrites the placeholder in place.

use std::io::Write;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::text;
use crate::{Error, Result};

/// A reserved 4-byte slot in a [`BinaryWriter`] buffer.
///
/// Deliberately neither `Clone` nor `Copy`: a placeholder is patched exactly once.
#[derive(Debug)]
#[must_use = "a reserved placeholder must be patched before finishing the writer"]
pub struct Placeholder {
    offset: usize,
}

impl Placeholder {
    /// Byte offset of the reserved slot.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Little-endian writer over an in-memory buffer.
///
/// # Example
///
/// ```
/// use b3dkit_common::BinaryWriter;
///
/// let mut writer = BinaryWriter::new();
/// let size = writer.reserve_u32().unwrap();
/// writer.write_bytes(b"body").unwrap();
/// let body_len = writer.position() as u32 - 4;
/// writer.patch_u32(size, body_len);
///
/// assert_eq!(writer.finish().unwrap(), b"\x04\0\0\0body");
/// ```
#[derive(Debug, Default)]
pub struct BinaryWriter {
    data: Vec<u8>,
    pending: usize,
}

impl BinaryWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty writer with a capacity hint.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            pending: 0,
        }
    }

    /// Current write position in bytes.
    #[inline]
    pub fn position(&self) -> usize {
        self.data.len()
    }

    /// Current write position measured in 4-byte words.
    #[inline]
    pub fn word_position(&self) -> u32 {
        (self.data.len() / 4) as u32
    }

    /// Bytes written so far.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Write raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.data.write_all(bytes)?;
        Ok(())
    }

    /// Write a single byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.data.write_u8(value)?;
        Ok(())
    }

    /// Write a little-endian u32.
    #[inline]
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.data.write_u32::<LittleEndian>(value)?;
        Ok(())
    }

    /// Write a little-endian i32.
    #[inline]
    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.data.write_i32::<LittleEndian>(value)?;
        Ok(())
    }

    /// Write a little-endian f32.
    #[inline]
    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.data.write_f32::<LittleEndian>(value)?;
        Ok(())
    }

    /// Write a slice of little-endian f32 values.
    pub fn write_f32_slice(&mut self, values: &[f32]) -> Result<()> {
        for &value in values {
            self.write_f32(value)?;
        }
        Ok(())
    }

    /// Write text as a cp1251 NUL-terminated string.
    pub fn write_cstring(&mut self, value: &str) -> Result<()> {
        let encoded = text::encode(value)?;
        self.write_bytes(&encoded)?;
        self.write_u8(0)
    }

    /// Write a fixed 32-byte name field.
    ///
    /// See [`text::encode_name32`] for the padding and sentinel rules.
    pub fn write_name32(&mut self, name: &str) -> Result<()> {
        let field = text::encode_name32(name)?;
        self.write_bytes(&field)
    }

    /// Emit a zeroed 4-byte placeholder to be patched later.
    pub fn reserve_u32(&mut self) -> Result<Placeholder> {
        let offset = self.data.len();
        self.write_u32(0)?;
        self.pending += 1;
        Ok(Placeholder { offset })
    }

    /// Overwrite a reserved placeholder with its final value.
    pub fn patch_u32(&mut self, placeholder: Placeholder, value: u32) {
        let offset = placeholder.offset;
        LittleEndian::write_u32(&mut self.data[offset..offset + 4], value);
        self.pending -= 1;
    }

    /// Finish writing and return the buffer.
    ///
    /// Fails if any reserved placeholder was left unpatched.
    pub fn finish(self) -> Result<Vec<u8>> {
        if self.pending != 0 {
            return Err(Error::UnpatchedPlaceholder(self.pending));
        }
        Ok(self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives_are_little_endian() {
        let mut writer = BinaryWriter::new();
        writer.write_u32(0x04030201).unwrap();
        writer.write_i32(-1).unwrap();
        writer.write_f32(1.0).unwrap();

        assert_eq!(
            writer.finish().unwrap(),
            vec![0x01, 0x02, 0x03, 0x04, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x80, 0x3F]
        );
    }

    #[test]
    fn test_reserve_then_patch() {
        let mut writer = BinaryWriter::new();
        writer.write_bytes(b"b3d\0").unwrap();
        let total = writer.reserve_u32().unwrap();
        assert_eq!(total.offset(), 4);
        writer.write_u32(7).unwrap();
        let words = writer.word_position();
        writer.patch_u32(total, words);

        let bytes = writer.finish().unwrap();
        assert_eq!(&bytes[4..8], &3u32.to_le_bytes());
    }

    #[test]
    fn test_unpatched_placeholder_is_an_error() {
        let mut writer = BinaryWriter::new();
        let _first = writer.reserve_u32().unwrap();
        let second = writer.reserve_u32().unwrap();
        writer.patch_u32(second, 1);

        assert!(matches!(writer.finish(), Err(Error::UnpatchedPlaceholder(1))));
    }

    #[test]
    fn test_write_cstring() {
        let mut writer = BinaryWriter::new();
        writer.write_cstring("MATERIALS 2").unwrap();
        assert_eq!(writer.finish().unwrap(), b"MATERIALS 2\0");
    }
}

use std::ops::Range;

use byteorder::{ByteOrder, LittleEndian};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Ascii,
    Utf16Le,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Bytes,
    Text(TextEncoding),
    /// Little-endian unsigned integer as wide as the section.
    Integer,
}

/// A named, fixed `offset..offset + len` region of a save image.
///
/// A section never owns data. The same descriptor is used to read a field
/// and to write it back, so every access to a field goes through one place
/// that knows its position and width.
///
/// Reading or writing a section that does not fit inside the buffer is a
/// programming error and panics with the section name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub name: &'static str,
    pub offset: usize,
    pub len: usize,
    pub kind: SectionKind,
}

impl Section {
    pub const fn new(name: &'static str, offset: usize, len: usize, kind: SectionKind) -> Self {
        Self {
            name,
            offset,
            len,
            kind,
        }
    }

    pub const fn bytes(name: &'static str, offset: usize, len: usize) -> Self {
        Self::new(name, offset, len, SectionKind::Bytes)
    }

    pub const fn text(
        name: &'static str,
        offset: usize,
        len: usize,
        encoding: TextEncoding,
    ) -> Self {
        Self::new(name, offset, len, SectionKind::Text(encoding))
    }

    pub const fn integer(name: &'static str, offset: usize, len: usize) -> Self {
        Self::new(name, offset, len, SectionKind::Integer)
    }

    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    pub const fn fits(&self, buffer_len: usize) -> bool {
        self.end() <= buffer_len
    }

    /// The same field moved `delta` bytes further into the buffer.
    pub const fn shifted(self, delta: usize) -> Self {
        Self {
            offset: self.offset + delta,
            ..self
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    pub fn bytes_from<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        self.check_bounds(buffer.len());
        &buffer[self.range()]
    }

    /// Decode a fixed-width text field, stopping at the first NUL unit.
    pub fn chars_from(&self, buffer: &[u8]) -> String {
        let bytes = self.bytes_from(buffer);
        match self.kind {
            SectionKind::Text(TextEncoding::Utf16Le) => decode_utf16le(bytes),
            _ => decode_narrow(bytes),
        }
    }

    pub fn cast_integer<T: SectionInteger>(&self, buffer: &[u8]) -> T {
        self.check_width(T::WIDTH);
        T::read_le(self.bytes_from(buffer))
    }

    pub fn replace(&self, buffer: &mut [u8], new_bytes: &[u8]) {
        assert_eq!(
            new_bytes.len(),
            self.len,
            "replacement for section {} must be {} bytes, got {}",
            self.name,
            self.len,
            new_bytes.len()
        );
        self.check_bounds(buffer.len());
        buffer[self.range()].copy_from_slice(new_bytes);
        debug!(
            "wrote {} bytes to section {} at {:#x}",
            self.len, self.name, self.offset
        );
    }

    /// Encode `value` with the byte order `cast_integer` reads.
    pub fn write_integer<T: SectionInteger>(&self, buffer: &mut [u8], value: T) {
        self.check_width(T::WIDTH);
        let mut encoded = [0u8; MAX_INTEGER_WIDTH];
        value.write_le(&mut encoded[..T::WIDTH]);
        self.replace(buffer, &encoded[..T::WIDTH]);
    }

    fn check_bounds(&self, buffer_len: usize) {
        assert!(
            self.fits(buffer_len),
            "section {} ({:#x}..{:#x}) is out of bounds for a {}-byte buffer",
            self.name,
            self.offset,
            self.end(),
            buffer_len
        );
    }

    fn check_width(&self, width: usize) {
        assert_eq!(
            self.len, width,
            "section {} is {} bytes wide, cannot use it as a {}-byte integer",
            self.name, self.len, width
        );
    }
}

const MAX_INTEGER_WIDTH: usize = 8;

fn decode_narrow(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(LittleEndian::read_u16)
        .take_while(|&unit| unit != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

mod sealed {
    pub trait Sealed {}
}

/// Unsigned integer widths a section can be read as or written from.
pub trait SectionInteger: Copy + sealed::Sealed {
    const WIDTH: usize;

    fn read_le(bytes: &[u8]) -> Self;
    fn write_le(self, out: &mut [u8]);
}

impl sealed::Sealed for u8 {}

impl SectionInteger for u8 {
    const WIDTH: usize = 1;

    fn read_le(bytes: &[u8]) -> Self {
        bytes[0]
    }

    fn write_le(self, out: &mut [u8]) {
        out[0] = self;
    }
}

macro_rules! section_integer {
    ($ty:ty, $read:ident, $write:ident) => {
        impl sealed::Sealed for $ty {}

        impl SectionInteger for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();

            fn read_le(bytes: &[u8]) -> Self {
                LittleEndian::$read(bytes)
            }

            fn write_le(self, out: &mut [u8]) {
                LittleEndian::$write(out, self);
            }
        }
    };
}

section_integer!(u16, read_u16, write_u16);
section_integer!(u32, read_u32, write_u32);
section_integer!(u64, read_u64, write_u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf16_text_stops_at_nul_unit() {
        let bytes = [b'T', 0, b'a', 0, b'r', 0, 0, 0, b'x', 0];
        assert_eq!(decode_utf16le(&bytes), "Tar");
    }

    #[test]
    fn narrow_text_without_terminator_uses_full_width() {
        assert_eq!(decode_narrow(b"BND4"), "BND4");
        assert_eq!(decode_narrow(b"BN\0D"), "BN");
    }
}

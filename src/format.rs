//! Icon bundle binary layout (`icons.mod`)
//!
//! All integers are little-endian. Pixel lengths are never stored; each is
//! derived from its entry's dimensions.
//!
//! # Layout
//! ```text
//! 0x00: magic u32 (0x4E4F4349, "ICON")
//! 0x04: version u16 (1)
//! 0x06: count u16
//! 0x08: entries[count], 10 bytes each:
//!       id u16, width u16, height u16, offset u32
//! 0x08 + 10 * count: pixel region (RGBA8, width × height × 4 bytes per entry,
//!       back-to-back in entry order)
//! ```
//!
//! The 32-bit offset field caps a bundle at [`MAX_BUNDLE_SIZE`] bytes.

use std::io::{self, Read, Write};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::icon::IconId;

/// Bundle magic, the ASCII bytes `ICON` read as a little-endian u32.
pub const MAGIC: u32 = 0x4E4F_4349;

/// The only defined format version.
pub const VERSION: u16 = 1;

/// Size of [`BundleHeader`] on disk.
pub const HEADER_SIZE: usize = 8;

/// Size of one [`EntryRecord`] on disk.
pub const ENTRY_RECORD_SIZE: usize = 10;

/// Bytes per RGBA8 pixel.
pub const BYTES_PER_PIXEL: u64 = 4;

/// Largest bundle addressable by 32-bit offsets.
pub const MAX_BUNDLE_SIZE: u64 = u32::MAX as u64;

/// Fixed bundle header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleHeader {
    pub magic: u32,
    pub version: u16,
    pub count: u16,
}

impl BundleHeader {
    pub const SIZE: usize = HEADER_SIZE;

    /// Header for a current-version bundle with `count` entries.
    pub fn new(count: u16) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            count,
        }
    }

    /// Offset of the first pixel byte for a bundle with this many entries.
    pub fn pixel_region_offset(&self) -> u64 {
        pixel_region_offset(self.count as usize)
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        LittleEndian::write_u32(&mut bytes[0..4], self.magic);
        LittleEndian::write_u16(&mut bytes[4..6], self.version);
        LittleEndian::write_u16(&mut bytes[6..8], self.count);
        bytes
    }

    pub fn write_to<W: Write>(&self, dest: &mut W) -> io::Result<()> {
        dest.write_u32::<LittleEndian>(self.magic)?;
        dest.write_u16::<LittleEndian>(self.version)?;
        dest.write_u16::<LittleEndian>(self.count)?;
        Ok(())
    }

    pub fn read_from<R: Read>(src: &mut R) -> io::Result<Self> {
        Ok(Self {
            magic: src.read_u32::<LittleEndian>()?,
            version: src.read_u16::<LittleEndian>()?,
            count: src.read_u16::<LittleEndian>()?,
        })
    }
}

/// One row of the entry table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryRecord {
    pub id: IconId,
    pub width: u16,
    pub height: u16,
    /// Absolute offset of the pixel data from the start of the bundle.
    pub offset: u32,
}

impl EntryRecord {
    pub const SIZE: usize = ENTRY_RECORD_SIZE;

    /// Pixel data length, `width * height * 4`.
    pub fn pixel_len(&self) -> u64 {
        pixel_len(self.width, self.height)
    }

    /// Write entry to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        LittleEndian::write_u16(&mut bytes[0..2], self.id);
        LittleEndian::write_u16(&mut bytes[2..4], self.width);
        LittleEndian::write_u16(&mut bytes[4..6], self.height);
        LittleEndian::write_u32(&mut bytes[6..10], self.offset);
        bytes
    }

    pub fn write_to<W: Write>(&self, dest: &mut W) -> io::Result<()> {
        dest.write_u16::<LittleEndian>(self.id)?;
        dest.write_u16::<LittleEndian>(self.width)?;
        dest.write_u16::<LittleEndian>(self.height)?;
        dest.write_u32::<LittleEndian>(self.offset)?;
        Ok(())
    }

    pub fn read_from<R: Read>(src: &mut R) -> io::Result<Self> {
        Ok(Self {
            id: src.read_u16::<LittleEndian>()?,
            width: src.read_u16::<LittleEndian>()?,
            height: src.read_u16::<LittleEndian>()?,
            offset: src.read_u32::<LittleEndian>()?,
        })
    }
}

/// RGBA8 byte length of a `width × height` image.
///
/// Cannot overflow: 65535 × 65535 × 4 fits comfortably in a u64.
pub fn pixel_len(width: u16, height: u16) -> u64 {
    width as u64 * height as u64 * BYTES_PER_PIXEL
}

/// Offset where the pixel region starts for `count` entries.
pub fn pixel_region_offset(count: usize) -> u64 {
    HEADER_SIZE as u64 + count as u64 * ENTRY_RECORD_SIZE as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn magic_spells_icon() {
        assert_eq!(&MAGIC.to_le_bytes(), b"ICON");
    }

    #[test]
    fn header_layout() {
        let mut bytes = Vec::new();
        BundleHeader::new(2).write_to(&mut bytes).unwrap();

        assert_eq!(bytes.len(), BundleHeader::SIZE);
        assert_eq!(&bytes[0..4], b"ICON");
        assert_eq!(&bytes[4..6], &[0x01, 0x00]); // version = 1
        assert_eq!(&bytes[6..8], &[0x02, 0x00]); // count = 2
    }

    #[test]
    fn entry_layout() {
        let entry = EntryRecord {
            id: 0x0102,
            width: 64,
            height: 32,
            offset: 0x0A0B_0C0D,
        };
        let mut bytes = Vec::new();
        entry.write_to(&mut bytes).unwrap();

        assert_eq!(
            bytes,
            [0x02, 0x01, 0x40, 0x00, 0x20, 0x00, 0x0D, 0x0C, 0x0B, 0x0A]
        );

        assert_eq!(entry.to_bytes()[..], bytes[..]);

        let parsed = EntryRecord::read_from(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn header_to_bytes_matches_stream_writer() {
        let header = BundleHeader::new(0x0304);
        let mut bytes = Vec::new();
        header.write_to(&mut bytes).unwrap();

        assert_eq!(header.to_bytes()[..], bytes[..]);
        assert_eq!(header.to_bytes(), [0x49, 0x43, 0x4F, 0x4E, 0x01, 0x00, 0x04, 0x03]);
    }

    #[test]
    fn header_read_short_buffer() {
        let data = [0x49, 0x43, 0x4F, 0x4E, 0x01];
        assert!(BundleHeader::read_from(&mut Cursor::new(&data[..])).is_err());
    }

    #[test]
    fn pixel_len_max_dimensions() {
        assert_eq!(pixel_len(65535, 1), 262_140);
        assert_eq!(pixel_len(65535, 65535), 65535 * 65535 * 4);
    }

    #[test]
    fn pixel_region_starts_after_table() {
        assert_eq!(pixel_region_offset(0), 8);
        assert_eq!(pixel_region_offset(2), 28);
        assert_eq!(BundleHeader::new(3).pixel_region_offset(), 38);
    }
}

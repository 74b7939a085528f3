//! Bundle reader.
//!
//! [`Bundle::open`] runs the full validation pass once; lookups afterwards
//! only hand out slices whose bounds were checked there.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io::Cursor;

use crate::error::{BundleError, CorruptBundle, Result};
use crate::format::{BundleHeader, EntryRecord, HEADER_SIZE, MAGIC, VERSION, pixel_region_offset};
use crate::icon::{IconId, IconImage, SizePx};

/// A validated, immutable icon bundle.
///
/// The backing buffer can be anything that derefs to bytes: a `Vec<u8>`, a
/// borrowed slice, or a memory map. The handle is `Send + Sync` whenever the
/// buffer is.
#[derive(Debug, Clone)]
pub struct Bundle<B> {
    data: B,
    entries: Vec<EntryRecord>,
    index: HashMap<IconId, usize>,
}

/// A borrowed view of one icon's pixels inside a [`Bundle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconView<'a> {
    pub id: IconId,
    pub width: u16,
    pub height: u16,
    /// RGBA8 pixels, exactly `width * height * 4` bytes.
    pub pixels: &'a [u8],
}

impl IconView<'_> {
    pub fn dimensions(&self) -> SizePx {
        SizePx::new(self.width as u32, self.height as u32)
    }

    /// Copies the pixels into an owned [`IconImage`].
    pub fn to_image(&self) -> IconImage {
        IconImage::new(self.width as u32, self.height as u32, self.pixels.to_vec())
    }

    /// Copies the pixels into an [`image::RgbaImage`].
    ///
    /// Returns `None` if the pixel length does not match the dimensions,
    /// which cannot happen for a view handed out by a [`Bundle`].
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width as u32, self.height as u32, self.pixels.to_vec())
    }
}

fn truncated(needed: u64, actual: usize) -> BundleError {
    CorruptBundle::TruncatedData { needed, actual }.into()
}

impl<B: AsRef<[u8]>> Bundle<B> {
    /// Validates `data` and builds the id index.
    ///
    /// Checks run in this order and stop at the first failure:
    ///
    /// 1. header present, magic and version recognized
    /// 2. entry table fully present
    /// 3. ids unique
    /// 4. every entry's pixel data within the buffer
    /// 5. every stored offset equal to the one derived from preceding entries
    /// 6. no bytes after the last entry's pixel data
    /// 7. no entry with a zero width or height
    ///
    /// # Example
    ///
    /// ```
    /// use icon_bundle::{Bundle, BundleError, CorruptBundle};
    ///
    /// let err = Bundle::open(b"ICON\x02\x00\x00\x00").unwrap_err();
    /// assert_eq!(err, BundleError::Corrupt(CorruptBundle::UnsupportedVersion(2)));
    /// ```
    pub fn open(data: B) -> Result<Self> {
        let bytes = data.as_ref();
        let len = bytes.len();

        if len < HEADER_SIZE {
            return Err(truncated(HEADER_SIZE as u64, len));
        }
        let mut cursor = Cursor::new(bytes);
        let header =
            BundleHeader::read_from(&mut cursor).map_err(|_| truncated(HEADER_SIZE as u64, len))?;
        if header.magic != MAGIC {
            return Err(CorruptBundle::BadMagic {
                found: header.magic,
            }
            .into());
        }
        if header.version != VERSION {
            return Err(CorruptBundle::UnsupportedVersion(header.version).into());
        }

        let count = header.count as usize;
        let pixel_start = header.pixel_region_offset();
        if (len as u64) < pixel_start {
            return Err(truncated(pixel_start, len));
        }

        let mut entries = Vec::with_capacity(count);
        let mut index = HashMap::with_capacity(count);
        for i in 0..count {
            let entry =
                EntryRecord::read_from(&mut cursor).map_err(|_| truncated(pixel_start, len))?;
            match index.entry(entry.id) {
                Entry::Occupied(_) => return Err(BundleError::DuplicateId(entry.id)),
                Entry::Vacant(slot) => {
                    slot.insert(i);
                }
            }
            entries.push(entry);
        }

        for entry in &entries {
            let end = (entry.offset as u64)
                .checked_add(entry.pixel_len())
                .ok_or_else(|| truncated(u64::MAX, len))?;
            if end > len as u64 {
                return Err(truncated(end, len));
            }
        }

        let mut expected = pixel_start;
        for (i, entry) in entries.iter().enumerate() {
            if entry.offset as u64 != expected {
                return Err(CorruptBundle::InconsistentLayout {
                    index: i,
                    id: entry.id,
                    stored: entry.offset,
                    expected,
                }
                .into());
            }
            expected += entry.pixel_len();
        }

        if expected != len as u64 {
            return Err(CorruptBundle::TrailingData {
                extra: len as u64 - expected,
            }
            .into());
        }

        if let Some(entry) = entries.iter().find(|e| e.width == 0 || e.height == 0) {
            return Err(CorruptBundle::EmptyIcon { id: entry.id }.into());
        }

        tracing::debug!(icons = count, bytes = len, "opened icon bundle");

        Ok(Self {
            data,
            entries,
            index,
        })
    }

    /// Looks up an icon by id.
    pub fn lookup(&self, id: IconId) -> Result<IconView<'_>> {
        self.get(id).ok_or(BundleError::IconNotFound(id))
    }

    /// Like [`lookup`](Self::lookup), returning `None` for a missing id.
    pub fn get(&self, id: IconId) -> Option<IconView<'_>> {
        let entry = self.entries[*self.index.get(&id)?];
        Some(self.view(entry))
    }

    pub fn contains(&self, id: IconId) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of icons in the bundle.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The parsed entry table, in bundle order.
    pub fn entries(&self) -> &[EntryRecord] {
        &self.entries
    }

    /// All icons in bundle order.
    pub fn iter(&self) -> impl Iterator<Item = IconView<'_>> + '_ {
        self.entries.iter().map(|entry| self.view(*entry))
    }

    /// The whole bundle as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_ref()
    }

    /// Gives back the backing buffer.
    pub fn into_inner(self) -> B {
        self.data
    }

    fn view(&self, entry: EntryRecord) -> IconView<'_> {
        let start = entry.offset as usize;
        let end = start + entry.pixel_len() as usize;
        IconView {
            id: entry.id,
            width: entry.width,
            height: entry.height,
            pixels: &self.data.as_ref()[start..end],
        }
    }
}

/// Opens a bundle over a borrowed buffer.
pub fn open(bytes: &[u8]) -> Result<Bundle<&[u8]>> {
    Bundle::open(bytes)
}

/// Total byte length a bundle with these entries must have.
pub fn expected_len(entries: &[EntryRecord]) -> u64 {
    entries
        .iter()
        .fold(pixel_region_offset(entries.len()), |acc, e| acc + e.pixel_len())
}

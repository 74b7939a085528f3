//! Icon types consumed by the bundle writer.
//!
//! An [`IconSet`] is the ordered list of `(IconId, IconImage)` pairs that
//! becomes one bundle. Order is preserved on disk.

use image::RgbaImage;

use crate::error::Result;
use crate::format::BYTES_PER_PIXEL;

/// Identifier an icon is looked up by. Unique within one bundle.
pub type IconId = u16;

/// A 2D size in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if width equals height.
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// RGBA8 byte length of an image this size.
    pub fn rgba8_len(&self) -> u64 {
        self.width as u64 * self.height as u64 * BYTES_PER_PIXEL
    }
}

/// A decoded icon image: dimensions plus a row-major RGBA8 pixel buffer.
///
/// Dimensions are held as `u32` so that sizes the bundle cannot store are
/// still representable; the writer rejects anything outside `1..=65535`, or a
/// buffer whose length is not `width * height * 4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconImage {
    pub width: u32,
    pub height: u32,

    /// RGBA8888 pixels, no row padding, not premultiplied.
    pub pixels: Vec<u8>,
}

impl IconImage {
    /// Creates an icon image from raw parts. No validation happens here.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Creates an image of the given size filled with one RGBA color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let pixels = rgba.iter().copied().cycle().take(count * 4).collect();
        Self::new(width, height, pixels)
    }

    /// Takes ownership of a decoded image without copying its pixels.
    pub fn from_rgba(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.into_raw())
    }

    /// Returns the pixel dimensions of the image.
    pub fn dimensions(&self) -> SizePx {
        SizePx::new(self.width, self.height)
    }

    /// Converts into an [`RgbaImage`].
    ///
    /// Returns `None` if the buffer length does not match the dimensions.
    pub fn into_rgba(self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.pixels)
    }
}

impl From<RgbaImage> for IconImage {
    fn from(image: RgbaImage) -> Self {
        Self::from_rgba(image)
    }
}

/// An ordered collection of icons destined for one bundle.
///
/// Duplicate ids are allowed here and rejected when encoding.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IconSet {
    /// The icons, in bundle order.
    pub icons: Vec<(IconId, IconImage)>,
}

impl IconSet {
    /// Creates a new empty icon set.
    pub fn new() -> Self {
        Self { icons: Vec::new() }
    }

    /// Creates an icon set from a vector of icons.
    pub fn from_icons(icons: Vec<(IconId, IconImage)>) -> Self {
        Self { icons }
    }

    /// Appends an icon.
    pub fn add_icon(&mut self, id: IconId, image: IconImage) {
        self.icons.push((id, image));
    }

    /// Builder form of [`add_icon`](Self::add_icon).
    pub fn with_icon(mut self, id: IconId, image: IconImage) -> Self {
        self.add_icon(id, image);
        self
    }

    /// Returns the number of icons in the set.
    pub fn len(&self) -> usize {
        self.icons.len()
    }

    /// Returns true if the set contains no icons.
    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    /// First icon carrying `id`, if any.
    pub fn get(&self, id: IconId) -> Option<&IconImage> {
        self.icons
            .iter()
            .find(|(icon_id, _)| *icon_id == id)
            .map(|(_, image)| image)
    }

    /// Ids in bundle order.
    pub fn ids(&self) -> impl Iterator<Item = IconId> + '_ {
        self.icons.iter().map(|(id, _)| *id)
    }

    /// Returns an iterator over the icons.
    pub fn iter(&self) -> impl Iterator<Item = &(IconId, IconImage)> {
        self.icons.iter()
    }

    /// Encodes the set into bundle bytes. See [`crate::encode`].
    pub fn encode(&self) -> Result<Vec<u8>> {
        crate::writer::encode(&self.icons)
    }
}

impl FromIterator<(IconId, IconImage)> for IconSet {
    fn from_iter<I: IntoIterator<Item = (IconId, IconImage)>>(iter: I) -> Self {
        Self::from_icons(iter.into_iter().collect())
    }
}

impl IntoIterator for IconSet {
    type Item = (IconId, IconImage);
    type IntoIter = std::vec::IntoIter<(IconId, IconImage)>;

    fn into_iter(self) -> Self::IntoIter {
        self.icons.into_iter()
    }
}

impl<'a> IntoIterator for &'a IconSet {
    type Item = &'a (IconId, IconImage);
    type IntoIter = std::slice::Iter<'a, (IconId, IconImage)>;

    fn into_iter(self) -> Self::IntoIter {
        self.icons.iter()
    }
}

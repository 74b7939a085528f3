//! Bundle writer.
//!
//! Validates every icon up front, assigns offsets by running sum, then emits
//! header, entry table and pixel region in input order.

use std::collections::HashSet;

use crate::error::{BundleError, InvalidImageReason, Result};
use crate::format::{BundleHeader, EntryRecord, MAX_BUNDLE_SIZE, pixel_region_offset};
use crate::icon::{IconId, IconImage};

/// Checks one image against the bundle constraints and returns its
/// 16-bit dimensions.
fn validate_image(id: IconId, image: &IconImage) -> Result<(u16, u16)> {
    let (width, height) = (image.width, image.height);
    let invalid = |reason| BundleError::InvalidImage { id, reason };

    if width == 0 || height == 0 {
        return Err(invalid(InvalidImageReason::ZeroDimension { width, height }));
    }
    let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
        return Err(invalid(InvalidImageReason::DimensionTooLarge {
            width,
            height,
        }));
    };

    let expected = image.dimensions().rgba8_len();
    if image.pixels.len() as u64 != expected {
        return Err(invalid(InvalidImageReason::PixelLengthMismatch {
            expected,
            actual: image.pixels.len(),
        }));
    }

    Ok((w, h))
}

/// Computes the entry table for `icons` without emitting any bytes.
///
/// Offsets start right after the entry table and grow by each preceding
/// icon's pixel length.
pub fn layout(icons: &[(IconId, IconImage)]) -> Result<Vec<EntryRecord>> {
    let count = u16::try_from(icons.len()).map_err(|_| BundleError::TooManyIcons(icons.len()))?;

    let mut seen = HashSet::with_capacity(icons.len());
    let mut entries = Vec::with_capacity(icons.len());
    let mut cursor = pixel_region_offset(count as usize);

    for (id, image) in icons {
        let (width, height) = validate_image(*id, image)?;
        if !seen.insert(*id) {
            return Err(BundleError::DuplicateId(*id));
        }

        let offset = u32::try_from(cursor).map_err(|_| BundleError::TooLarge { size: cursor })?;
        let entry = EntryRecord {
            id: *id,
            width,
            height,
            offset,
        };
        cursor += entry.pixel_len();
        entries.push(entry);
    }

    if cursor > MAX_BUNDLE_SIZE {
        return Err(BundleError::TooLarge { size: cursor });
    }

    Ok(entries)
}

/// Encodes an ordered list of icons into bundle bytes.
///
/// Fails with [`BundleError::InvalidImage`] for zero or oversized
/// dimensions or a mis-sized pixel buffer, and with
/// [`BundleError::DuplicateId`] if an id repeats. Nothing is emitted unless
/// every icon is valid.
///
/// # Example
///
/// ```
/// use icon_bundle::{Bundle, IconImage, encode};
///
/// let icons = vec![
///     (0, IconImage::filled(2, 2, [255, 0, 0, 255])),
///     (1, IconImage::filled(1, 1, [0, 0, 255, 255])),
/// ];
/// let bytes = encode(&icons).unwrap();
/// assert_eq!(bytes.len(), 48);
///
/// let bundle = Bundle::open(bytes).unwrap();
/// assert_eq!(bundle.lookup(1).unwrap().pixels, &[0, 0, 255, 255]);
/// ```
pub fn encode(icons: &[(IconId, IconImage)]) -> Result<Vec<u8>> {
    let entries = layout(icons)?;
    let total = entries
        .last()
        .map(|e| e.offset as u64 + e.pixel_len())
        .unwrap_or_else(|| pixel_region_offset(0));

    let mut out = Vec::with_capacity(total as usize);
    out.extend_from_slice(&BundleHeader::new(entries.len() as u16).to_bytes());
    for entry in &entries {
        tracing::trace!(
            id = entry.id,
            width = entry.width,
            height = entry.height,
            offset = entry.offset,
            "bundle entry"
        );
        out.extend_from_slice(&entry.to_bytes());
    }
    for (_, image) in icons {
        out.extend_from_slice(&image.pixels);
    }

    debug_assert_eq!(out.len() as u64, total);
    tracing::debug!(icons = entries.len(), bytes = out.len(), "encoded icon bundle");

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{ENTRY_RECORD_SIZE, HEADER_SIZE};

    fn read_offset(bytes: &[u8], index: usize) -> u32 {
        let at = HEADER_SIZE + index * ENTRY_RECORD_SIZE + 6;
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    fn sample_icons() -> Vec<(IconId, IconImage)> {
        vec![
            (0, IconImage::new(2, 2, (0..16).collect())),
            (1, IconImage::new(1, 1, vec![200, 201, 202, 203])),
        ]
    }

    #[test]
    fn encodes_two_icon_scenario() {
        let bytes = encode(&sample_icons()).unwrap();

        // header(8) + 2 entries(20) + 16 + 4
        assert_eq!(bytes.len(), 48);
        assert_eq!(read_offset(&bytes, 0), 28);
        assert_eq!(read_offset(&bytes, 1), 44);
        assert_eq!(&bytes[28..44], &(0..16).collect::<Vec<u8>>()[..]);
        assert_eq!(&bytes[44..48], &[200, 201, 202, 203]);
    }

    #[test]
    fn offsets_follow_preceding_sizes() {
        let icons = vec![
            (9, IconImage::filled(3, 5, [1; 4])),
            (2, IconImage::filled(7, 1, [2; 4])),
            (4, IconImage::filled(4, 4, [3; 4])),
        ];
        let entries = layout(&icons).unwrap();

        assert_eq!(entries[0].offset, 8 + 3 * 10);
        for pair in entries.windows(2) {
            let prev = pair[0];
            assert_eq!(
                pair[1].offset as u64,
                prev.offset as u64 + prev.width as u64 * prev.height as u64 * 4
            );
        }
    }

    #[test]
    fn entries_keep_input_order() {
        let icons = vec![
            (5, IconImage::filled(1, 1, [0; 4])),
            (1, IconImage::filled(1, 1, [0; 4])),
            (3, IconImage::filled(1, 1, [0; 4])),
        ];
        let ids: Vec<_> = layout(&icons).unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![5, 1, 3]);
    }

    #[test]
    fn encode_is_deterministic() {
        let icons = sample_icons();
        assert_eq!(encode(&icons).unwrap(), encode(&icons).unwrap());
    }

    #[test]
    fn empty_bundle_is_header_only() {
        let bytes = encode(&[]).unwrap();
        assert_eq!(bytes, [0x49, 0x43, 0x4F, 0x4E, 0x01, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn rejects_duplicate_id() {
        let icons = vec![
            (4, IconImage::filled(1, 1, [0; 4])),
            (4, IconImage::filled(2, 2, [0; 4])),
        ];
        assert_eq!(encode(&icons), Err(BundleError::DuplicateId(4)));
    }

    #[test]
    fn rejects_zero_dimension() {
        let icons = vec![(1, IconImage::new(0, 4, Vec::new()))];
        assert!(matches!(
            encode(&icons),
            Err(BundleError::InvalidImage {
                id: 1,
                reason: InvalidImageReason::ZeroDimension { .. }
            })
        ));
    }

    #[test]
    fn rejects_zero_height() {
        let icons = vec![(6, IconImage::new(4, 0, Vec::new()))];
        assert_eq!(
            encode(&icons),
            Err(BundleError::InvalidImage {
                id: 6,
                reason: InvalidImageReason::ZeroDimension {
                    width: 4,
                    height: 0
                }
            })
        );
    }

    #[test]
    fn height_past_u16_rejected() {
        let icons = vec![(0, IconImage::filled(1, 65536, [9; 4]))];
        assert!(matches!(
            encode(&icons),
            Err(BundleError::InvalidImage {
                reason: InvalidImageReason::DimensionTooLarge {
                    width: 1,
                    height: 65536
                },
                ..
            })
        ));
    }

    #[test]
    fn rejects_too_many_icons() {
        // Every possible id once: one more entry than the count field holds.
        let icons: Vec<_> = (0..=u16::MAX)
            .map(|id| (id, IconImage::filled(1, 1, [0; 4])))
            .collect();
        assert_eq!(icons.len(), 65536);
        assert_eq!(encode(&icons), Err(BundleError::TooManyIcons(65536)));
    }

    #[test]
    fn rejects_pixel_length_mismatch() {
        let icons = vec![(2, IconImage::new(2, 2, vec![0; 15]))];
        assert_eq!(
            encode(&icons),
            Err(BundleError::InvalidImage {
                id: 2,
                reason: InvalidImageReason::PixelLengthMismatch {
                    expected: 16,
                    actual: 15
                }
            })
        );
    }

    #[test]
    fn max_width_accepted() {
        let icons = vec![(0, IconImage::filled(65535, 1, [9; 4]))];
        let bytes = encode(&icons).unwrap();
        assert_eq!(bytes.len(), 8 + 10 + 262_140);
    }

    #[test]
    fn width_past_u16_rejected() {
        let icons = vec![(0, IconImage::filled(65536, 1, [9; 4]))];
        assert!(matches!(
            encode(&icons),
            Err(BundleError::InvalidImage {
                reason: InvalidImageReason::DimensionTooLarge {
                    width: 65536,
                    height: 1
                },
                ..
            })
        ));
    }

    #[test]
    fn invalid_image_reported_before_duplicate() {
        let icons = vec![
            (1, IconImage::filled(1, 1, [0; 4])),
            (1, IconImage::new(1, 1, vec![0; 3])),
        ];
        assert!(matches!(
            encode(&icons),
            Err(BundleError::InvalidImage { id: 1, .. })
        ));
    }
}

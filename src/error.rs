//! Error types for bundle encoding and decoding.

use thiserror::Error;

use crate::icon::IconId;

/// Why the writer rejected an [`IconImage`](crate::IconImage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidImageReason {
    /// Width or height is zero.
    #[error("image has a zero dimension ({width}x{height})")]
    ZeroDimension { width: u32, height: u32 },

    /// Width or height does not fit in the 16-bit entry fields.
    #[error("image dimensions {width}x{height} exceed 65535")]
    DimensionTooLarge { width: u32, height: u32 },

    /// The pixel buffer is not exactly `width * height * 4` bytes.
    #[error("pixel buffer is {actual} bytes, expected {expected}")]
    PixelLengthMismatch { expected: u64, actual: usize },
}

/// Structural problems found while opening a bundle.
///
/// Every variant is fatal to [`Bundle::open`](crate::Bundle::open); no
/// partially valid bundle is ever returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CorruptBundle {
    /// The first four bytes are not the bundle magic.
    #[error("bad magic 0x{found:08x}")]
    BadMagic { found: u32 },

    /// The header carries a version this reader does not know.
    #[error("unsupported bundle version {0}")]
    UnsupportedVersion(u16),

    /// The buffer ends before the header, the entry table, or an icon's
    /// pixel data.
    #[error("truncated data: need {needed} bytes, buffer has {actual}")]
    TruncatedData { needed: u64, actual: usize },

    /// A stored offset disagrees with the offset derived from the
    /// preceding entries.
    #[error("entry {index} (icon {id}) stored at offset {stored}, expected {expected}")]
    InconsistentLayout {
        index: usize,
        id: IconId,
        stored: u32,
        expected: u64,
    },

    /// Bytes remain after the last icon's pixel data.
    #[error("{extra} trailing bytes after pixel data")]
    TrailingData { extra: u64 },

    /// An entry has a zero width or height.
    #[error("icon {id} has a zero dimension")]
    EmptyIcon { id: IconId },
}

/// Errors produced by the bundle writer and reader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BundleError {
    /// An input image is malformed. Raised before any bytes are emitted.
    #[error("invalid image for icon {id}: {reason}")]
    InvalidImage {
        id: IconId,
        #[source]
        reason: InvalidImageReason,
    },

    /// Two entries share an id.
    #[error("duplicate icon id {0}")]
    DuplicateId(IconId),

    /// The entry count does not fit in the 16-bit header field.
    #[error("too many icons: {0} (at most 65535 per bundle)")]
    TooManyIcons(usize),

    /// The encoded bundle would not be addressable with 32-bit offsets.
    #[error("bundle would be {size} bytes, exceeding the 32-bit offset range")]
    TooLarge { size: u64 },

    /// The bundle bytes are structurally invalid.
    #[error("corrupt bundle: {0}")]
    Corrupt(#[from] CorruptBundle),

    /// No entry carries the requested id.
    #[error("icon {0} not found")]
    IconNotFound(IconId),
}

impl BundleError {
    /// Returns the structural problem if this is a [`BundleError::Corrupt`].
    pub fn as_corrupt(&self) -> Option<&CorruptBundle> {
        match self {
            Self::Corrupt(c) => Some(c),
            _ => None,
        }
    }
}

/// Result alias for bundle operations.
pub type Result<T, E = BundleError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_converts_into_bundle_error() {
        let err: BundleError = CorruptBundle::UnsupportedVersion(7).into();
        assert_eq!(
            err.as_corrupt(),
            Some(&CorruptBundle::UnsupportedVersion(7))
        );
        assert_eq!(err.to_string(), "corrupt bundle: unsupported bundle version 7");
    }

    #[test]
    fn invalid_image_message_names_icon() {
        let err = BundleError::InvalidImage {
            id: 3,
            reason: InvalidImageReason::ZeroDimension {
                width: 0,
                height: 16,
            },
        };
        assert!(err.to_string().contains("icon 3"));
        assert!(err.as_corrupt().is_none());
    }
}

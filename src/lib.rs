//! icon-bundle: packed RGBA icon archives indexed by integer id
//!
//! This crate writes and reads a small positional binary format that holds a
//! fixed set of raster icons. A runtime opens the bundle once, and every
//! lookup afterwards is a hash lookup plus a borrowed slice into the buffer;
//! no image decoding happens at load time.
//!
//! See [`format`] for the byte layout.
//!
//! # Example
//!
//! ```
//! use icon_bundle::{Bundle, IconImage, IconSet};
//!
//! let icons = IconSet::new()
//!     .with_icon(0, IconImage::filled(2, 2, [255, 0, 0, 255]))
//!     .with_icon(1, IconImage::filled(1, 1, [0, 0, 255, 255]));
//!
//! let bytes = icons.encode().unwrap();
//! let bundle = Bundle::open(bytes).unwrap();
//!
//! let icon = bundle.lookup(1).unwrap();
//! assert_eq!((icon.width, icon.height), (1, 1));
//! assert_eq!(icon.pixels, &[0, 0, 255, 255]);
//! ```
//!
//! # Packing From Files
//!
//! Source images are decoded with the `image` crate through an
//! [`IconManifest`]:
//!
//! ```no_run
//! use icon_bundle::{IconManifest, read_bundle};
//!
//! let manifest = IconManifest::load("assets/icons.json").unwrap();
//! let out = manifest.pack_to_file("assets").unwrap();
//!
//! let bundle = read_bundle(out).unwrap();
//! println!("{} icons", bundle.len());
//! ```

mod error;
pub mod format;
mod icon;
mod manifest;
mod reader;
mod writer;

pub use error::{BundleError, CorruptBundle, InvalidImageReason, Result};
pub use format::EntryRecord;
pub use icon::{IconId, IconImage, IconSet, SizePx};
pub use manifest::{
    DEFAULT_OUTPUT, IconManifest, ManifestEntry, PackError, read_bundle, write_bundle,
};
pub use reader::{Bundle, IconView, expected_len, open};
pub use writer::{encode, layout};

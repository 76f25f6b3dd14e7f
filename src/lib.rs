//! Extracts palettes, sounds, music, flats and pictures from Doom-engine WAD
//! archives.

pub mod blob;
mod bytes_ext;
pub mod classify;
pub mod error;
pub mod extract;
pub mod flat;
pub mod image;
pub mod pal;
pub mod picture;
pub mod sink;
pub mod wad;

pub use classify::{classify, Classifier, GameVariant, LumpKind, SectionState, SoundCatalog};
pub use error::Error;
pub use extract::{BlobSink, ExtractOptions, Extractor, ImageSink, LumpFailure, Summary};
pub use image::DecodedImage;
pub use pal::Palette;
pub use wad::{Header, LumpDescriptor, Wad};

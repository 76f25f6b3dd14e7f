use std::io::{self, Read, Seek};

use tracing::{debug, info, warn};

use crate::blob::{extract_music, extract_sound, SoundLayout};
use crate::classify::{Classifier, LumpKind, SectionState};
use crate::error::Error;
use crate::flat::decode_flat;
use crate::image::DecodedImage;
use crate::pal::{decode_palettes, Palette};
use crate::picture::decode_picture;
use crate::wad::{LumpDescriptor, Wad};

pub const DEFAULT_MAX_LUMP_SIZE: usize = 16 * 1024 * 1024;

pub trait ImageSink {
    fn write_image(&mut self, name: &str, image: &DecodedImage) -> io::Result<()>;
}

pub trait BlobSink {
    fn write_blob(&mut self, name: &str, extension: &str, data: &[u8]) -> io::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub palettes: bool,
    pub music: bool,
    pub sounds: bool,
    pub flats: bool,
    pub pictures: bool,
    /// Palettes to read from PLAYPAL; `None` reads every whole palette.
    pub palette_count: Option<usize>,
    pub sound: SoundLayout,
    pub max_lump_size: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            palettes: true,
            music: true,
            sounds: true,
            flats: true,
            pictures: true,
            palette_count: None,
            sound: SoundLayout::default(),
            max_lump_size: DEFAULT_MAX_LUMP_SIZE,
        }
    }
}

#[derive(Debug)]
pub struct LumpFailure {
    pub index: usize,
    pub name: String,
    pub kind: LumpKind,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct Summary {
    pub palettes: usize,
    pub music: usize,
    pub sounds: usize,
    pub flats: usize,
    pub pictures: usize,
    pub failures: Vec<LumpFailure>,
}

impl Summary {
    pub fn images(&self) -> usize {
        self.flats + self.pictures
    }
}

/// Walks the directory once, in order, decoding every lump the options ask
/// for. A lump that fails to decode or write is recorded in the summary and
/// the walk carries on with the next entry.
pub struct Extractor<'a> {
    classifier: &'a Classifier,
    options: &'a ExtractOptions,
    palette: Option<Palette>,
    summary: Summary,
}

impl<'a> Extractor<'a> {
    pub fn new(classifier: &'a Classifier, options: &'a ExtractOptions) -> Self {
        Self {
            classifier,
            options,
            palette: None,
            summary: Summary::default(),
        }
    }

    pub fn run<R, I, B>(mut self, wad: &mut Wad<R>, images: &mut I, blobs: &mut B) -> Summary
    where
        R: Read + Seek,
        I: ImageSink + ?Sized,
        B: BlobSink + ?Sized,
    {
        let mut state = SectionState::default();

        for index in 0..wad.lumps().len() {
            let lump = wad.lumps()[index].clone();
            let (kind, next) = self.classifier.classify(&lump.name, state);
            state = next;

            if let Err(error) = self.extract_lump(wad, &lump, kind, images, blobs) {
                warn!(lump = %lump.name, ?kind, "{}", error);
                self.summary.failures.push(LumpFailure {
                    index,
                    name: lump.name,
                    kind,
                    error,
                });
            }
        }

        if state != SectionState::default() {
            debug!(?state, "section still open at end of directory");
        }

        let summary = self.summary;
        info!("palettes extracted: {}", summary.palettes);
        info!("music files extracted: {}", summary.music);
        info!("sound files extracted: {}", summary.sounds);
        info!("images extracted: {}", summary.images());
        if !summary.failures.is_empty() {
            info!("lumps failed: {}", summary.failures.len());
        }

        summary
    }

    fn extract_lump<R, I, B>(
        &mut self,
        wad: &mut Wad<R>,
        lump: &LumpDescriptor,
        kind: LumpKind,
        images: &mut I,
        blobs: &mut B,
    ) -> Result<(), Error>
    where
        R: Read + Seek,
        I: ImageSink + ?Sized,
        B: BlobSink + ?Sized,
    {
        let limit = self.options.max_lump_size;
        let sink_failure = |source| Error::SinkWriteFailure {
            name: lump.name.clone(),
            source,
        };

        match kind {
            LumpKind::Ignore => {}
            // Palettes are always decoded since every image depends on them.
            LumpKind::Palette => {
                let data = wad.read_lump(lump, limit)?;
                let palettes = decode_palettes(&data, self.options.palette_count)?;
                if let Some(first) = palettes.first() {
                    self.palette = Some(first.clone());
                }

                // Swatch numbering continues across PLAYPAL lumps.
                if self.options.palettes {
                    for pal in &palettes {
                        let name = format!("palette{}", self.summary.palettes);
                        images
                            .write_image(&name, &pal.to_image())
                            .map_err(sink_failure)?;
                        self.summary.palettes += 1;
                    }
                }
            }
            LumpKind::Music => {
                if !self.options.music {
                    return Ok(());
                }
                let (_, size) = lump.bounds()?;
                let data = wad.read_lump(lump, limit)?;
                let music = extract_music(&data, size)?;
                blobs
                    .write_blob(&lump.name, "mus", music)
                    .map_err(sink_failure)?;
                self.summary.music += 1;
            }
            LumpKind::Sound => {
                if !self.options.sounds {
                    return Ok(());
                }
                let (_, size) = lump.bounds()?;
                let data = wad.read_lump(lump, limit)?;
                let samples = extract_sound(&data, size, &self.options.sound)?;
                blobs
                    .write_blob(&lump.name, "raw", samples)
                    .map_err(sink_failure)?;
                self.summary.sounds += 1;
            }
            LumpKind::Flat => {
                if !self.options.flats {
                    return Ok(());
                }
                let pal = self.palette.as_ref().ok_or(Error::PaletteNotLoaded)?;
                let data = wad.read_lump(lump, limit)?;
                let image = decode_flat(&data, pal)?;
                images
                    .write_image(&lump.name, &image)
                    .map_err(sink_failure)?;
                self.summary.flats += 1;
            }
            LumpKind::Unhandled | LumpKind::Sprite | LumpKind::Menu | LumpKind::Picture => {
                if !self.options.pictures {
                    return Ok(());
                }
                let pal = self.palette.as_ref().ok_or(Error::PaletteNotLoaded)?;
                let data = wad.read_lump(lump, limit)?;
                let image = decode_picture(&data, pal)?;
                images
                    .write_image(&lump.name, &image)
                    .map_err(sink_failure)?;
                self.summary.pictures += 1;
            }
        }

        Ok(())
    }
}

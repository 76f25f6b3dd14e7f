use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::extract::{BlobSink, ImageSink};
use crate::image::DecodedImage;

/// Writes images as PNG and blobs as raw files into one directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: &Path) -> io::Result<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn path_for(&self, name: &str, extension: &str) -> PathBuf {
        self.root.join(format!("{}.{}", file_stem(name), extension))
    }
}

/// Lump names may contain path separators (`VILE\` sprites); those become `^`.
pub fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' => '^',
            c => c,
        })
        .collect()
}

impl ImageSink for DirectorySink {
    fn write_image(&mut self, name: &str, image: &DecodedImage) -> io::Result<()> {
        let color = match image.channels {
            3 => png::ColorType::Rgb,
            4 => png::ColorType::Rgba,
            n => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("unsupported channel count {}", n),
                ))
            }
        };

        let file = File::create(self.path_for(name, "png"))?;
        let w = &mut BufWriter::new(file);

        let mut encoder = png::Encoder::new(w, image.width as u32, image.height as u32);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&image.data)?;

        Ok(())
    }
}

impl BlobSink for DirectorySink {
    fn write_blob(&mut self, name: &str, extension: &str, data: &[u8]) -> io::Result<()> {
        let mut f = File::create(self.path_for(name, extension))?;
        f.write_all(data)?;
        Ok(())
    }
}

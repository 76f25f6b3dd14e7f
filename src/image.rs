/// A decoded, row-major pixel buffer. Flats and palette swatches are RGB,
/// pictures are RGBA with alpha 0 wherever no post wrote a pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: Vec<u8>,
    /// Picture anchor, carried through for renderers. Zero for flats.
    pub left_offset: i16,
    pub top_offset: i16,
}

impl DecodedImage {
    pub fn new_rgba(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            channels: 4,
            data: vec![0u8; width * height * 4],
            left_offset: 0,
            top_offset: 0,
        }
    }

    pub fn from_rgb(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height * 3);
        Self {
            width,
            height,
            channels: 3,
            data,
            left_offset: 0,
            top_offset: 0,
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let i = self.channels * (y * self.width + x);
        &self.data[i..i + self.channels]
    }

    /// Writes an opaque pixel. Only meaningful for RGBA buffers.
    pub fn write_pixel(&mut self, x: usize, y: usize, rgb: (u8, u8, u8)) {
        if x < self.width && y < self.height {
            let i = 4 * (y * self.width + x);
            self.data[i] = rgb.0;
            self.data[i + 1] = rgb.1;
            self.data[i + 2] = rgb.2;
            self.data[i + 3] = 255;
        }
    }
}

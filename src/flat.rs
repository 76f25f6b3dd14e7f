use crate::error::Error;
use crate::image::DecodedImage;
use crate::pal::Palette;

pub const FLAT_WIDTH: usize = 64;
pub const FLAT_HEIGHT: usize = 64;
pub const FLAT_SIZE: usize = FLAT_WIDTH * FLAT_HEIGHT;

/// Decodes a 64x64 floor/ceiling texture. Bytes past the first 4096 are
/// ignored.
pub fn decode_flat(data: &[u8], pal: &Palette) -> Result<DecodedImage, Error> {
    if data.len() < FLAT_SIZE {
        return Err(Error::TruncatedFlat(data.len()));
    }

    let mut rgb = Vec::with_capacity(FLAT_SIZE * 3);
    for &index in &data[..FLAT_SIZE] {
        let (r, g, b) = pal.get(index as usize)?;
        rgb.extend([r, g, b]);
    }

    Ok(DecodedImage::from_rgb(FLAT_WIDTH, FLAT_HEIGHT, rgb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pal::{decode_palettes, PALETTE_SIZE};

    fn test_palette() -> Palette {
        let data: Vec<u8> = (0..PALETTE_SIZE).map(|i| (255 - i % 256) as u8).collect();
        decode_palettes(&data, Some(1)).unwrap().remove(0)
    }

    #[test]
    fn pixels_come_from_palette() {
        let pal = test_palette();
        let data: Vec<u8> = (0..FLAT_SIZE).map(|i| (i * 31 % 256) as u8).collect();
        let img = decode_flat(&data, &pal).unwrap();

        assert_eq!((img.width, img.height, img.channels), (64, 64, 3));
        for (x, y) in [(0, 0), (63, 0), (5, 17), (63, 63)] {
            let (r, g, b) = pal.get(data[y * 64 + x] as usize).unwrap();
            assert_eq!(img.pixel(x, y), [r, g, b]);
        }
    }

    #[test]
    fn oversized_lump_uses_first_4096_bytes() {
        let mut data = vec![3u8; FLAT_SIZE];
        data.extend([9u8; 64]);
        let img = decode_flat(&data, &test_palette()).unwrap();
        assert_eq!(img.data.len(), FLAT_SIZE * 3);
    }

    #[test]
    fn short_lump_is_truncated() {
        assert!(matches!(
            decode_flat(&[0; 4000], &test_palette()),
            Err(Error::TruncatedFlat(4000))
        ));
    }
}

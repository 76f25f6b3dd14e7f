use tracing::warn;

use crate::error::Error;
use crate::image::DecodedImage;

pub const PALETTE_SIZE: usize = 768;
pub const PALETTE_COLORS: usize = 256;

/// Number of palettes in PLAYPAL for Doom, Heretic, Hexen and Strife.
pub const DEFAULT_PALETTE_COUNT: usize = 14;

/// 256 packed RGB triples.
#[derive(Clone, PartialEq, Eq)]
pub struct Palette([u8; PALETTE_SIZE]);

impl Palette {
    pub fn new() -> Self {
        Palette([0u8; PALETTE_SIZE])
    }

    pub fn get(&self, i: usize) -> Result<(u8, u8, u8), Error> {
        if i >= PALETTE_COLORS {
            return Err(Error::PaletteIndexOutOfRange(i));
        }

        let r = self.0[3 * i];
        let g = self.0[3 * i + 1];
        let b = self.0[3 * i + 2];

        Ok((r, g, b))
    }

    pub fn as_slice(&self) -> &[u8; PALETTE_SIZE] {
        &self.0
    }

    /// A 16x16 swatch, one pixel per color.
    pub fn to_image(&self) -> DecodedImage {
        DecodedImage::from_rgb(16, 16, self.0.to_vec())
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Palette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Palette").field(&&self.0[..6]).finish()
    }
}

/// Decodes the back-to-back palettes of a PLAYPAL lump.
///
/// With `count` unset, every whole palette in `data` is decoded. With a
/// fixed count, `data` must hold at least that many.
pub fn decode_palettes(data: &[u8], count: Option<usize>) -> Result<Vec<Palette>, Error> {
    let count = match count {
        Some(n) => n,
        None => {
            if data.len() % PALETTE_SIZE != 0 {
                warn!(
                    trailing = data.len() % PALETTE_SIZE,
                    "palette lump has trailing bytes"
                );
            }
            (data.len() / PALETTE_SIZE).max(1)
        }
    };

    let required = count
        .checked_mul(PALETTE_SIZE)
        .ok_or(Error::TruncatedPalette {
            required: usize::MAX,
            available: data.len(),
        })?;
    if data.len() < required {
        return Err(Error::TruncatedPalette {
            required,
            available: data.len(),
        });
    }

    Ok(data[..required]
        .chunks_exact(PALETTE_SIZE)
        .map(|chunk| {
            let mut pal = [0u8; PALETTE_SIZE];
            pal.copy_from_slice(chunk);
            Palette(pal)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 % 256) as u8).collect()
    }

    #[test]
    fn colors_are_input_bytes_as_triples() {
        let data = ramp(PALETTE_SIZE);
        let pals = decode_palettes(&data, Some(1)).unwrap();
        assert_eq!(pals.len(), 1);
        for i in 0..PALETTE_COLORS {
            assert_eq!(
                pals[0].get(i).unwrap(),
                (data[3 * i], data[3 * i + 1], data[3 * i + 2])
            );
        }
    }

    #[test]
    fn count_is_inferred_from_lump_size() {
        let data = ramp(PALETTE_SIZE * DEFAULT_PALETTE_COUNT);
        let pals = decode_palettes(&data, None).unwrap();
        assert_eq!(pals.len(), DEFAULT_PALETTE_COUNT);
        assert_eq!(pals[13].as_slice()[..], data[13 * PALETTE_SIZE..]);
    }

    #[test]
    fn fixed_count_needs_enough_bytes() {
        let data = ramp(PALETTE_SIZE * 2);
        assert!(matches!(
            decode_palettes(&data, Some(DEFAULT_PALETTE_COUNT)),
            Err(Error::TruncatedPalette {
                required: 10752,
                available: 1536
            })
        ));
    }

    #[test]
    fn short_lump_is_truncated() {
        assert!(matches!(
            decode_palettes(&[0; 100], None),
            Err(Error::TruncatedPalette { required: 768, .. })
        ));
    }

    #[test]
    fn index_past_table_is_rejected() {
        assert!(matches!(
            Palette::new().get(256),
            Err(Error::PaletteIndexOutOfRange(256))
        ));
    }

    #[test]
    fn swatch_is_16_by_16_rgb() {
        let data = ramp(PALETTE_SIZE);
        let img = decode_palettes(&data, None).unwrap()[0].to_image();
        assert_eq!((img.width, img.height, img.channels), (16, 16, 3));
        assert_eq!(img.data, data);
    }
}

use std::io::{self, Cursor};

use crate::bytes_ext::ReadBytesExt;
use crate::error::Error;
use crate::image::DecodedImage;
use crate::pal::Palette;

/// Largest width or height accepted from a picture header.
pub const MAX_PICTURE_DIMENSION: usize = 4096;

const END_OF_COLUMN: u8 = 0xff;

fn truncated(_: io::Error) -> Error {
    Error::TruncatedPicture
}

/// Decodes a column-major picture (sprites, patches, menu and status bar
/// graphics) into RGBA. Pixels not covered by any post stay fully
/// transparent.
pub fn decode_picture(data: &[u8], pal: &Palette) -> Result<DecodedImage, Error> {
    let mut r = Cursor::new(data);

    let width = r.read_le_i16().map_err(truncated)?;
    let height = r.read_le_i16().map_err(truncated)?;
    let left_offset = r.read_le_i16().map_err(truncated)?;
    let top_offset = r.read_le_i16().map_err(truncated)?;

    let (w, h) = match (usize::try_from(width), usize::try_from(height)) {
        (Ok(w), Ok(h)) if w <= MAX_PICTURE_DIMENSION && h <= MAX_PICTURE_DIMENSION => (w, h),
        _ => return Err(Error::InvalidPictureHeader { width, height }),
    };

    // Offsets are relative to the start of the lump.
    let column_offsets = (0..w)
        .map(|_| r.read_le_u32())
        .collect::<io::Result<Vec<_>>>()
        .map_err(truncated)?;

    let mut image = DecodedImage::new_rgba(w, h);
    image.left_offset = left_offset;
    image.top_offset = top_offset;

    for (x, &offset) in column_offsets.iter().enumerate() {
        r.set_position(offset as u64);
        draw_column(&mut image, &mut r, x, pal)?;
    }

    Ok(image)
}

fn draw_column(
    dst: &mut DecodedImage,
    src: &mut Cursor<&[u8]>,
    x: usize,
    pal: &Palette,
) -> Result<(), Error> {
    loop {
        let row_start = src.read_u8().map_err(truncated)?;
        if row_start == END_OF_COLUMN {
            return Ok(());
        }

        let count = src.read_u8().map_err(truncated)?;
        _ = src.read_u8().map_err(truncated)?;

        if row_start as usize + count as usize > dst.height {
            return Err(Error::PictureRowOverflow {
                column: x,
                row_start,
                count,
                height: dst.height,
            });
        }

        for i in 0..count as usize {
            let c = src.read_u8().map_err(truncated)?;
            dst.write_pixel(x, row_start as usize + i, pal.get(c as usize)?);
        }

        _ = src.read_u8().map_err(truncated)?;
    }
}

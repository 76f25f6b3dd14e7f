use crate::error::Error;

/// Where the PCM samples sit inside a digital sound lump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundLayout {
    /// Format and sample rate fields, passed through opaquely.
    pub header_size: usize,
    /// Padding before the samples. DMX pads some sounds with 16 bytes on
    /// each side.
    pub leading_padding: usize,
    pub trailing_padding: usize,
}

impl Default for SoundLayout {
    fn default() -> Self {
        Self {
            header_size: 8,
            leading_padding: 0,
            trailing_padding: 0,
        }
    }
}

fn check_complete(data: &[u8], declared: usize) -> Result<(), Error> {
    if data.len() != declared {
        return Err(Error::TruncatedLump {
            declared,
            available: data.len(),
        });
    }
    Ok(())
}

/// MUS data is handed on verbatim.
pub fn extract_music(data: &[u8], declared: usize) -> Result<&[u8], Error> {
    check_complete(data, declared)?;
    Ok(data)
}

/// Strips the sound sub-header and padding, leaving raw 8-bit samples.
pub fn extract_sound<'a>(
    data: &'a [u8],
    declared: usize,
    layout: &SoundLayout,
) -> Result<&'a [u8], Error> {
    check_complete(data, declared)?;

    let required = layout
        .header_size
        .checked_add(layout.leading_padding)
        .and_then(|start| Some((start, start.checked_add(layout.trailing_padding)?)));
    let truncated = Error::TruncatedLump {
        declared: required.map_or(usize::MAX, |(_, min_len)| min_len),
        available: data.len(),
    };

    match required {
        Some((start, min_len)) if min_len <= data.len() => {
            Ok(&data[start..data.len() - layout.trailing_padding])
        }
        _ => Err(truncated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn music_is_copied_whole() {
        let data = b"MUS\x1a rest of score";
        assert_eq!(extract_music(data, data.len()).unwrap(), data);
    }

    #[test]
    fn sound_header_is_skipped() {
        let data: Vec<u8> = (0..100).collect();
        let samples = extract_sound(&data, 100, &SoundLayout::default()).unwrap();
        assert_eq!(samples.len(), 92);
        assert_eq!(samples[0], 8);
    }

    #[test]
    fn sound_padding_is_configurable() {
        let data: Vec<u8> = (0..64).collect();
        let layout = SoundLayout {
            header_size: 8,
            leading_padding: 16,
            trailing_padding: 16,
        };
        let samples = extract_sound(&data, 64, &layout).unwrap();
        assert_eq!(samples, &data[24..48]);
    }

    #[test]
    fn lump_shorter_than_header_is_truncated() {
        assert!(matches!(
            extract_sound(&[0; 4], 4, &SoundLayout::default()),
            Err(Error::TruncatedLump {
                declared: 8,
                available: 4
            })
        ));
    }

    #[test]
    fn huge_layout_is_truncated_not_overflowed() {
        let layout = SoundLayout {
            header_size: usize::MAX,
            leading_padding: 2,
            trailing_padding: 2,
        };
        assert!(matches!(
            extract_sound(&[0; 20], 20, &layout),
            Err(Error::TruncatedLump {
                declared: usize::MAX,
                available: 20
            })
        ));

        let layout = SoundLayout {
            header_size: 8,
            leading_padding: 0,
            trailing_padding: usize::MAX - 4,
        };
        assert!(matches!(
            extract_sound(&[0; 20], 20, &layout),
            Err(Error::TruncatedLump {
                declared: usize::MAX,
                available: 20
            })
        ));
    }

    #[test]
    fn short_read_is_truncated() {
        assert!(matches!(
            extract_music(&[0; 10], 20),
            Err(Error::TruncatedLump {
                declared: 20,
                available: 10
            })
        ));
    }
}

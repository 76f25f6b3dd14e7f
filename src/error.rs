#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    IOError(#[from] std::io::Error),

    #[error("entry `{0}` not found")]
    EntryNotFound(String),

    #[error("header is truncated ({0} of 12 bytes)")]
    TruncatedHeader(usize),

    #[error("corrupt header: {0}")]
    CorruptHeader(&'static str),

    #[error("directory is truncated ({read} of {expected} entries)")]
    TruncatedDirectory { expected: usize, read: usize },

    #[error("lump has negative bounds (offset {offset}, size {size})")]
    InvalidLumpBounds { offset: i32, size: i32 },

    #[error("lump size {size} exceeds limit of {limit} bytes")]
    LumpTooLarge { size: usize, limit: usize },

    #[error("lump is truncated ({available} of {declared} bytes)")]
    TruncatedLump { declared: usize, available: usize },

    #[error("palette data is truncated ({available} of {required} bytes)")]
    TruncatedPalette { required: usize, available: usize },

    #[error("flat is truncated ({0} of 4096 bytes)")]
    TruncatedFlat(usize),

    #[error("picture data is truncated")]
    TruncatedPicture,

    #[error("invalid picture header ({width}x{height})")]
    InvalidPictureHeader { width: i16, height: i16 },

    #[error("post in column {column} overflows picture ({row_start} + {count} > {height})")]
    PictureRowOverflow {
        column: usize,
        row_start: u8,
        count: u8,
        height: usize,
    },

    #[error("palette index {0} out of range")]
    PaletteIndexOutOfRange(usize),

    #[error("no palette loaded")]
    PaletteNotLoaded,

    #[error("failed to write `{name}`: {source}")]
    SinkWriteFailure {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Header and directory failures leave nothing downstream that can be
    /// trusted; everything else is scoped to a single lump.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(
            self,
            Error::TruncatedHeader(_) | Error::CorruptHeader(_) | Error::TruncatedDirectory { .. }
        )
    }
}

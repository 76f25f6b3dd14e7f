use std::{
    fs::File,
    io::{BufReader, Cursor, ErrorKind, Read, Seek, SeekFrom},
    path::Path,
};

use tracing::{info, warn};

use crate::bytes_ext::ReadBytesExt;
use crate::error::Error;

pub const HEADER_SIZE: usize = 12;
pub const DIRECTORY_ENTRY_SIZE: usize = 16;
pub const LUMP_NAME_SIZE: usize = 8;

/// Directory pre-allocation never trusts the header beyond this many entries.
const MAX_DIRECTORY_PREALLOC: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// `IWAD` or `PWAD` in well-formed archives, but any four bytes are accepted.
    pub tag: [u8; 4],
    pub entry_count: usize,
    pub directory_offset: u64,
}

impl Header {
    pub fn read<R: Read>(reader: &mut R) -> Result<Header, Error> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        reader.take(HEADER_SIZE as u64).read_to_end(&mut bytes)?;
        if bytes.len() != HEADER_SIZE {
            return Err(Error::TruncatedHeader(bytes.len()));
        }

        let mut r = Cursor::new(bytes.as_slice());
        let tag = r.read_tag()?;
        let entry_count = r.read_le_i32()?;
        let directory_offset = r.read_le_i32()?;

        let entry_count =
            usize::try_from(entry_count).map_err(|_| Error::CorruptHeader("negative entry count"))?;
        let directory_offset = u64::try_from(directory_offset)
            .map_err(|_| Error::CorruptHeader("negative directory offset"))?;

        Ok(Header {
            tag,
            entry_count,
            directory_offset,
        })
    }

    pub fn tag_str(&self) -> String {
        self.tag.iter().map(|&c| c as char).collect()
    }

    pub fn is_known_tag(&self) -> bool {
        &self.tag == b"IWAD" || &self.tag == b"PWAD"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumpDescriptor {
    pub name: String,
    pub offset: i32,
    pub size: i32,
}

impl LumpDescriptor {
    /// Offset and length as unsigned quantities; negative fields make the
    /// lump unreadable but leave the rest of the directory usable.
    pub fn bounds(&self) -> Result<(u64, usize), Error> {
        match (u64::try_from(self.offset), usize::try_from(self.size)) {
            (Ok(offset), Ok(size)) => Ok((offset, size)),
            _ => Err(Error::InvalidLumpBounds {
                offset: self.offset,
                size: self.size,
            }),
        }
    }
}

pub fn read_directory<R: Read + Seek>(
    reader: &mut R,
    header: &Header,
) -> Result<Vec<LumpDescriptor>, Error> {
    reader.seek(SeekFrom::Start(header.directory_offset))?;

    let truncated = |read| Error::TruncatedDirectory {
        expected: header.entry_count,
        read,
    };

    let mut lumps = Vec::with_capacity(header.entry_count.min(MAX_DIRECTORY_PREALLOC));
    let mut entry = [0u8; DIRECTORY_ENTRY_SIZE];
    for i in 0..header.entry_count {
        match reader.read_exact(&mut entry) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Err(truncated(i)),
            Err(e) => return Err(e.into()),
        }

        let mut r = Cursor::new(entry.as_slice());
        let offset = r.read_le_i32()?;
        let size = r.read_le_i32()?;
        let name = r.read_fixed_str::<LUMP_NAME_SIZE>()?;

        lumps.push(LumpDescriptor { name, offset, size });
    }

    Ok(lumps)
}

pub struct Wad<R> {
    reader: R,
    header: Header,
    lumps: Vec<LumpDescriptor>,
}

impl Wad<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let file = File::open(path)?;
        Wad::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> Wad<R> {
    pub fn new(mut reader: R) -> Result<Self, Error> {
        reader.seek(SeekFrom::Start(0))?;
        let header = Header::read(&mut reader)?;

        if !header.is_known_tag() {
            warn!(tag = %header.tag_str(), "unrecognised WAD tag");
        }
        info!(
            tag = %header.tag_str(),
            entries = header.entry_count,
            directory = header.directory_offset,
            "read WAD header"
        );

        let lumps = read_directory(&mut reader, &header)?;

        Ok(Wad {
            reader,
            header,
            lumps,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn lumps(&self) -> &[LumpDescriptor] {
        &self.lumps
    }

    pub fn find(&self, name: &str) -> Option<&LumpDescriptor> {
        self.lumps.iter().find(|&l| l.name == name)
    }

    /// Reads up to the lump's declared size. The result is shorter than the
    /// declared size when the archive ends early; callers decide whether
    /// that is fatal for the format they decode.
    pub fn read_lump(&mut self, lump: &LumpDescriptor, limit: usize) -> Result<Vec<u8>, Error> {
        let (offset, size) = lump.bounds()?;
        if size > limit {
            return Err(Error::LumpTooLarge { size, limit });
        }

        self.reader.seek(SeekFrom::Start(offset))?;

        let mut data = Vec::with_capacity(size);
        (&mut self.reader).take(size as u64).read_to_end(&mut data)?;

        Ok(data)
    }

    /// Reads the first lump called `name`, requiring all declared bytes.
    pub fn read_raw(&mut self, name: &str, limit: usize) -> Result<Vec<u8>, Error> {
        let lump = self
            .find(name)
            .cloned()
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;

        let (_, size) = lump.bounds()?;
        let data = self.read_lump(&lump, limit)?;
        if data.len() != size {
            return Err(Error::TruncatedLump {
                declared: size,
                available: data.len(),
            });
        }

        Ok(data)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Cursor;

    use super::*;

    /// Builds an archive with the lumps laid out after the header and the
    /// directory at the end.
    pub(crate) fn build_wad(lumps: &[(&str, &[u8])]) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_SIZE];
        let mut entries = Vec::new();

        for &(name, bytes) in lumps {
            entries.push((data.len() as i32, bytes.len() as i32, name));
            data.extend_from_slice(bytes);
        }

        let directory_offset = data.len() as i32;
        for (offset, size, name) in entries {
            data.extend(offset.to_le_bytes());
            data.extend(size.to_le_bytes());
            let mut field = [0u8; LUMP_NAME_SIZE];
            field[..name.len()].copy_from_slice(name.as_bytes());
            data.extend(field);
        }

        data[0..4].copy_from_slice(b"IWAD");
        data[4..8].copy_from_slice(&(lumps.len() as i32).to_le_bytes());
        data[8..12].copy_from_slice(&directory_offset.to_le_bytes());

        data
    }

    #[test]
    fn reads_header_and_directory_in_order() {
        let data = build_wad(&[("PLAYPAL", &[1, 2, 3]), ("E1M1", &[]), ("THINGS", &[9; 10])]);
        let wad = Wad::new(Cursor::new(data)).unwrap();

        assert_eq!(&wad.header().tag, b"IWAD");
        assert_eq!(wad.header().entry_count, 3);

        let names: Vec<_> = wad.lumps().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["PLAYPAL", "E1M1", "THINGS"]);
        assert_eq!(wad.lumps()[0].offset, 12);
        assert_eq!(wad.lumps()[0].size, 3);
        assert_eq!(wad.lumps()[2].offset, 15);
    }

    #[test]
    fn accepts_unknown_tag() {
        let mut data = build_wad(&[("A", &[0])]);
        data[0..4].copy_from_slice(b"JUNK");
        let wad = Wad::new(Cursor::new(data)).unwrap();
        assert!(!wad.header().is_known_tag());
        assert_eq!(wad.lumps().len(), 1);
    }

    #[test]
    fn short_header_is_truncated() {
        let result = Header::read(&mut Cursor::new(b"IWAD\x01\x00".as_slice()));
        assert!(matches!(result, Err(Error::TruncatedHeader(6))));
    }

    #[test]
    fn negative_entry_count_is_corrupt() {
        let mut data = b"PWAD".to_vec();
        data.extend((-1i32).to_le_bytes());
        data.extend(12i32.to_le_bytes());
        let result = Wad::new(Cursor::new(data));
        assert!(matches!(result, Err(Error::CorruptHeader(_))));
    }

    #[test]
    fn short_directory_is_truncated() {
        let mut data = build_wad(&[("A", &[]), ("B", &[])]);
        data.truncate(data.len() - 4);
        let err = Wad::new(Cursor::new(data)).err().unwrap();
        assert!(matches!(
            err,
            Error::TruncatedDirectory {
                expected: 2,
                read: 1
            }
        ));
        assert!(err.is_unrecoverable());
    }

    #[test]
    fn huge_entry_count_does_not_preallocate() {
        let mut data = b"IWAD".to_vec();
        data.extend(i32::MAX.to_le_bytes());
        data.extend(12i32.to_le_bytes());
        let result = Wad::new(Cursor::new(data));
        assert!(matches!(result, Err(Error::TruncatedDirectory { read: 0, .. })));
    }

    #[test]
    fn read_lump_respects_limit_and_bounds() {
        let data = build_wad(&[("BIG", &[7; 32])]);
        let mut wad = Wad::new(Cursor::new(data)).unwrap();
        let lump = wad.lumps()[0].clone();

        assert_eq!(wad.read_lump(&lump, 32).unwrap(), vec![7; 32]);
        assert!(matches!(
            wad.read_lump(&lump, 16),
            Err(Error::LumpTooLarge { size: 32, limit: 16 })
        ));

        let negative = LumpDescriptor {
            name: "NEG".into(),
            offset: -4,
            size: 4,
        };
        assert!(matches!(
            wad.read_lump(&negative, 32),
            Err(Error::InvalidLumpBounds { .. })
        ));
    }

    #[test]
    fn read_lump_past_end_is_short() {
        let data = build_wad(&[("A", &[1, 2])]);
        let len = data.len() as i32;
        let mut wad = Wad::new(Cursor::new(data)).unwrap();
        let lump = LumpDescriptor {
            name: "TAIL".into(),
            offset: len - 2,
            size: 10,
        };
        assert_eq!(wad.read_lump(&lump, 64).unwrap().len(), 2);
    }

    #[test]
    fn read_raw_finds_first_match() {
        let data = build_wad(&[("DUP", &[1]), ("DUP", &[2])]);
        let mut wad = Wad::new(Cursor::new(data)).unwrap();
        assert_eq!(wad.read_raw("DUP", 64).unwrap(), vec![1]);
        assert!(matches!(
            wad.read_raw("NOPE", 64),
            Err(Error::EntryNotFound(_))
        ));
    }
}

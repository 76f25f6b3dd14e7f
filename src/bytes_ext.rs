pub trait ReadBytesExt: std::io::Read {
    #[inline]
    fn read_u8(&mut self) -> std::io::Result<u8> {
        let mut buf = [0; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    #[inline]
    fn read_le_i16(&mut self) -> std::io::Result<i16> {
        let mut buf = [0; 2];
        self.read_exact(&mut buf)?;
        Ok(i16::from_le_bytes(buf))
    }

    #[inline]
    fn read_le_u32(&mut self) -> std::io::Result<u32> {
        let mut buf = [0; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    #[inline]
    fn read_le_i32(&mut self) -> std::io::Result<i32> {
        let mut buf = [0; 4];
        self.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    fn read_tag(&mut self) -> std::io::Result<[u8; 4]> {
        let mut buf = [0; 4];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Reads a fixed-width, NUL-padded name. The whole field is consumed even
    /// when the name ends early.
    fn read_fixed_str<const N: usize>(&mut self) -> std::io::Result<String> {
        let mut buf = [0; N];
        self.read_exact(&mut buf)?;

        Ok(buf
            .iter()
            .take_while(|&&c| c != 0)
            .map(|&c| c as char)
            .collect())
    }
}

impl<R: std::io::Read> ReadBytesExt for R {}

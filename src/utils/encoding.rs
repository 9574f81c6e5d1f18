//! Little-endian, varint and delta codecs shared by the on-disk index formats.

use anyhow::{bail, ensure, Result};

/// Encode a u32 as a variable-length integer
pub fn encode_varint(mut value: u32, buf: &mut Vec<u8>) {
    loop {
        if value < 0x80 {
            buf.push(value as u8);
            break;
        }
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
}

/// Decode a variable-length integer from a slice
/// Returns (value, bytes_consumed)
pub fn decode_varint(buf: &[u8]) -> Option<(u32, usize)> {
    let mut result: u32 = 0;
    let mut shift = 0;

    for (i, &byte) in buf.iter().enumerate() {
        if shift >= 32 {
            return None; // Overflow
        }

        result |= ((byte & 0x7F) as u32) << shift;

        if byte & 0x80 == 0 {
            return Some((result, i + 1));
        }

        shift += 7;
    }

    None // Incomplete
}

/// Delta-encode a strictly ascending list of doc ids
pub fn delta_encode(values: &[u32], buf: &mut Vec<u8>) {
    let mut prev = 0u32;
    for &value in values {
        encode_varint(value - prev, buf);
        prev = value;
    }
}

/// Delta-decode a postings list, rejecting anything that is not strictly ascending
pub fn delta_decode(buf: &[u8]) -> Result<Vec<u32>> {
    let mut result = Vec::new();
    let mut prev = 0u32;
    let mut pos = 0;

    while pos < buf.len() {
        let Some((delta, consumed)) = decode_varint(&buf[pos..]) else {
            bail!("truncated varint in postings at byte {}", pos);
        };
        if !result.is_empty() && delta == 0 {
            bail!("postings are not strictly ascending");
        }
        prev = match prev.checked_add(delta) {
            Some(value) => value,
            None => bail!("postings delta overflows u32"),
        };
        result.push(prev);
        pos += consumed;
    }

    Ok(result)
}

/// Write a 4-byte magic followed by a little-endian format version
pub fn write_header(buf: &mut Vec<u8>, magic: &[u8; 4], version: u32) {
    buf.extend_from_slice(magic);
    buf.extend_from_slice(&version.to_le_bytes());
}

/// Write a u16-length-prefixed UTF-8 string
pub fn write_str(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    let len = u16::try_from(s.len())
        .map_err(|_| anyhow::anyhow!("string of {} bytes is too long to encode", s.len()))?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

/// Cursor over an in-memory (usually memory-mapped) index file
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.buf.len());
        let Some(end) = end else {
            bail!(
                "unexpected end of data: wanted {} bytes at offset {}, have {}",
                len,
                self.pos,
                self.buf.len() - self.pos
            );
        };
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_varint(&mut self) -> Result<u32> {
        match decode_varint(&self.buf[self.pos..]) {
            Some((value, consumed)) => {
                self.pos += consumed;
                Ok(value)
            }
            None => bail!("malformed varint at offset {}", self.pos),
        }
    }

    pub fn read_str(&mut self) -> Result<&'a str> {
        let len = self.read_u16_le()? as usize;
        let bytes = self.read_bytes(len)?;
        Ok(std::str::from_utf8(bytes)?)
    }

    /// Check magic and version; returns the version found
    pub fn expect_header(&mut self, magic: &[u8; 4], max_version: u32) -> Result<u32> {
        let found = self.read_bytes(4)?;
        ensure!(
            found == magic,
            "bad magic {:?}, expected {:?}",
            String::from_utf8_lossy(found),
            String::from_utf8_lossy(magic)
        );
        let version = self.read_u32_le()?;
        ensure!(
            (1..=max_version).contains(&version),
            "unsupported format version {}",
            version
        );
        Ok(version)
    }

    /// Fail if anything is left after the last record
    pub fn finish(&self) -> Result<()> {
        ensure!(
            self.is_empty(),
            "{} trailing bytes after last record",
            self.buf.len() - self.pos
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_roundtrip() {
        let values = [0, 1, 127, 128, 16383, 16384, u32::MAX];
        for value in values {
            let mut buf = Vec::new();
            encode_varint(value, &mut buf);
            let (decoded, _) = decode_varint(&buf).unwrap();
            assert_eq!(value, decoded);
        }
    }

    #[test]
    fn test_delta_encoding_starts_at_zero() {
        let values = vec![0, 1, 5, 10, 1000];
        let mut buf = Vec::new();
        delta_encode(&values, &mut buf);
        assert_eq!(delta_decode(&buf).unwrap(), values);
    }

    #[test]
    fn test_delta_decode_rejects_repeats() {
        let mut buf = Vec::new();
        encode_varint(3, &mut buf);
        encode_varint(0, &mut buf);
        assert!(delta_decode(&buf).is_err());
    }

    #[test]
    fn test_reader_truncation() {
        let mut reader = ByteReader::new(&[1, 2]);
        assert!(reader.read_u32_le().is_err());
    }

    #[test]
    fn test_header_and_strings() {
        let mut buf = Vec::new();
        write_header(&mut buf, b"TEST", 1);
        write_str(&mut buf, "macbeth").unwrap();

        let mut reader = ByteReader::new(&buf);
        assert_eq!(reader.expect_header(b"TEST", 1).unwrap(), 1);
        assert_eq!(reader.read_str().unwrap(), "macbeth");
        assert!(reader.finish().is_ok());

        let mut reader = ByteReader::new(&buf);
        assert!(reader.expect_header(b"NOPE", 1).is_err());
    }
}

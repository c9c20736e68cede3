// LZHS, the boot image compression: LZSS tokens, packed with fixed Huffman
// codebooks, over a Thumb branch filtered binary.

pub mod error;
pub mod huffman;
mod huffman_tables;
pub mod lzss;
mod match_tree;
pub mod thumb;

use std::io::Cursor;
use binrw::{BinRead, BinReaderExt, BinWrite};

pub use error::LzhsError;
use thumb::Direction;

pub const HEADER_SIZE: usize = 16;
/// Largest size either header field may claim.
const MAX_SIZE: u32 = 0x100_0000;

#[derive(BinRead, BinWrite, Debug, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct LzhsHeader {
    pub uncompressed_size: u32,
    pub compressed_size: u32,
    pub checksum: u8,
    pub spare: [u8; 7],
}

impl LzhsHeader {
    pub fn parse(data: &[u8]) -> Result<Self, LzhsError> {
        if data.len() < HEADER_SIZE {
            return Err(LzhsError::InvalidHeader(format!("{} bytes is too short for a header", data.len())));
        }
        Ok(Cursor::new(&data[..HEADER_SIZE]).read_le()?)
    }

    /// Whether this header plausibly starts a boot image of `file_len` bytes.
    pub fn is_plausible(&self, file_len: u64) -> bool {
        (1..=MAX_SIZE).contains(&self.uncompressed_size)
            && (1..=MAX_SIZE).contains(&self.compressed_size)
            && self.spare == [0u8; 7]
            && HEADER_SIZE as u64 + self.compressed_size as u64 <= file_len
    }
}

/// Sum of all bytes, mod 256.
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Builds a complete boot image (header plus payload) from a raw binary.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, LzhsError> {
    if data.len() as u64 > MAX_SIZE as u64 {
        return Err(LzhsError::InvalidHeader(format!("{} bytes exceeds the boot image limit", data.len())));
    }
    let mut filtered = data.to_vec();
    thumb::convert(&mut filtered, 0, Direction::ToAbsolute);
    let tokens = lzss::encode(&filtered);
    let payload = huffman::encode(&tokens)?;

    let header = LzhsHeader {
        uncompressed_size: data.len() as u32,
        compressed_size: payload.len() as u32,
        checksum: checksum(data),
        spare: [0u8; 7],
    };
    let mut out = Cursor::new(Vec::with_capacity(HEADER_SIZE + payload.len()));
    header.write_le(&mut out)?;
    let mut out = out.into_inner();
    out.extend_from_slice(&payload);

    log::debug!("LZHS: {} -> {} bytes ({} token bytes)", data.len(), out.len(), tokens.len());
    Ok(out)
}

/// Decodes a boot image and verifies it against its header.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, LzhsError> {
    let header = LzhsHeader::parse(data)?;
    let end = HEADER_SIZE + header.compressed_size as usize;
    if end > data.len() {
        return Err(LzhsError::TruncatedStream { offset: data.len() });
    }
    let payload = &data[HEADER_SIZE..end];

    let tokens = huffman::decode(payload)?;
    let mut out = lzss::decode(&tokens, header.uncompressed_size as usize)?;
    if out.len() != header.uncompressed_size as usize {
        return Err(LzhsError::SizeMismatch {
            expected: header.uncompressed_size as usize,
            actual: out.len(),
        });
    }
    thumb::convert(&mut out, 0, Direction::ToRelative);

    let actual = checksum(&out);
    if actual != header.checksum {
        return Err(LzhsError::ChecksumMismatch { expected: header.checksum, actual });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        let mut data = Vec::new();
        for i in 0..600u32 {
            data.extend_from_slice(b"u-boot ");
            data.extend_from_slice(&i.to_le_bytes());
            // a BL every so often
            data.extend_from_slice(&[0x12, 0xF0, 0x34, 0xF8]);
        }
        data
    }

    #[test]
    fn boot_image_round_trip() {
        let data = sample();
        let image = compress(&data).unwrap();
        let header = LzhsHeader::parse(&image).unwrap();
        assert_eq!(header.uncompressed_size as usize, data.len());
        assert_eq!(header.compressed_size as usize, image.len() - HEADER_SIZE);
        assert_eq!(header.checksum, checksum(&data));
        assert!(header.is_plausible(image.len() as u64));
        assert_eq!(decompress(&image).unwrap(), data);
    }

    #[test]
    fn header_layout_is_little_endian() {
        let image = compress(b"abc").unwrap();
        assert_eq!(&image[0..4], &3u32.to_le_bytes());
        assert_eq!(image[8], b'a'.wrapping_add(b'b').wrapping_add(b'c'));
        assert_eq!(&image[9..16], &[0u8; 7]);
    }

    #[test]
    fn short_payload_is_size_mismatch() {
        let data: Vec<u8> = (0..99u8).collect();
        let mut image = compress(&data).unwrap();
        image[0..4].copy_from_slice(&100u32.to_le_bytes());
        match decompress(&image) {
            Err(LzhsError::SizeMismatch { expected, actual }) => {
                assert_eq!(expected, 100);
                assert_eq!(actual, 99);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn wrong_checksum_is_reported() {
        let mut image = compress(&sample()).unwrap();
        image[8] = image[8].wrapping_add(1);
        assert!(matches!(decompress(&image), Err(LzhsError::ChecksumMismatch { .. })));
    }

    #[test]
    fn header_beyond_file_is_truncated() {
        let mut image = compress(&sample()).unwrap();
        image.truncate(image.len() - 1);
        assert!(matches!(decompress(&image), Err(LzhsError::TruncatedStream { .. })));
    }

    #[test]
    fn implausible_headers() {
        let header = LzhsHeader { uncompressed_size: 0, compressed_size: 10, checksum: 0, spare: [0; 7] };
        assert!(!header.is_plausible(100));
        let header = LzhsHeader { uncompressed_size: 10, compressed_size: 10, checksum: 0, spare: [1, 0, 0, 0, 0, 0, 0] };
        assert!(!header.is_plausible(100));
        let header = LzhsHeader { uncompressed_size: 10, compressed_size: 90, checksum: 0, spare: [0; 7] };
        assert!(!header.is_plausible(100));
    }
}

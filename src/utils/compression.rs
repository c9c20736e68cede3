use std::io::{self, Read};

use flate2::read::GzDecoder;
use lz4::block::decompress;

/// Inflates a gzip member. Also returns the original file name stored in the
/// header, when there is one.
pub fn decompress_gzip(compressed_data: &[u8]) -> Result<(Vec<u8>, Option<String>), Box<dyn std::error::Error>> {
    let mut decoder = GzDecoder::new(compressed_data);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    let name = decoder
        .header()
        .and_then(|h| h.filename())
        .map(|n| String::from_utf8_lossy(n).into_owned());
    Ok((decompressed, name))
}

pub fn decompress_lz4(compressed_data: &[u8], max_size: i32) -> Result<Vec<u8>, std::io::Error> {
    match decompress(compressed_data, Some(max_size)) {
        Ok(decompressed) => Ok(decompressed),
        Err(e) => Err(io::Error::new(io::ErrorKind::InvalidData, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression, GzBuilder};
    use std::io::Write;

    #[test]
    fn gzip_with_and_without_name() {
        let mut enc = GzBuilder::new().filename("rootfs.img").write(Vec::new(), Compression::default());
        enc.write_all(b"payload").unwrap();
        let (data, name) = decompress_gzip(&enc.finish().unwrap()).unwrap();
        assert_eq!(data, b"payload");
        assert_eq!(name.as_deref(), Some("rootfs.img"));

        let mut enc = GzEncoder::new(Vec::new(), Compression::fast());
        enc.write_all(b"payload").unwrap();
        let (_, name) = decompress_gzip(&enc.finish().unwrap()).unwrap();
        assert_eq!(name, None);
    }

    #[test]
    fn lz4_block() {
        let data: Vec<u8> = b"lz4 block ".iter().cycle().take(10_000).copied().collect();
        let block = lz4::block::compress(&data, None, false).unwrap();
        assert_eq!(decompress_lz4(&block, 8 << 20).unwrap(), data);
    }
}

use binrw::{BinRead, BinReaderExt};
use std::io::Cursor;

use simd_adler32::adler32;
use crate::utils::common;

pub const LZOP_MAGIC: &[u8; 9] = b"\x89LZO\x00\x0D\x0A\x1A\x0A";

const F_ADLER32_D: u32 = 0x0000_0001;
const F_ADLER32_C: u32 = 0x0000_0002;
const F_CRC32_D: u32 = 0x0000_0100;
const F_CRC32_C: u32 = 0x0000_0200;
const F_H_FILTER: u32 = 0x0000_0800;

#[derive(BinRead)]
#[br(big)]
pub struct LzopHeader {
    pub magic_bytes: [u8; 9],
    pub version: u16,
    _lib_version: u16,
    #[br(if(version >= 0x0940))]
    _version_needed_to_extract: Option<u16>,
    pub method: u8,
    #[br(if(version >= 0x0940))]
    _level: Option<u8>,
    pub flags: u32,
    #[br(if(flags & F_H_FILTER != 0))]
    _filter: Option<u32>,
    _mode: u32,
    _mtime_low: u32,
    #[br(if(version >= 0x0940))]
    _mtime_high: Option<u32>,
    name_len: u8,
    #[br(count = name_len)]
    name_bytes: Vec<u8>,
    _header_checksum: u32,
}
impl LzopHeader {
    pub fn name(&self) -> String {
        common::string_from_bytes(&self.name_bytes)
    }
}

/// Decompresses every block of an lzop file, checking the Adler-32 sums it
/// carries. CRC-32 sums are skipped.
pub fn decompress_lzop(data: &[u8]) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut data_reader = Cursor::new(data);
    let header: LzopHeader = data_reader.read_be()?;
    if &header.magic_bytes != LZOP_MAGIC {
        return Err("Invalid magic!".into());
    }
    if ![1, 2, 3].contains(&header.method) {
        return Err(format!("Unsupported compression method {}!", header.method).into());
    }
    log::debug!("lzop: version {:#06x}, method {}, name {:?}", header.version, header.method, header.name());

    let data_sum = header.flags & (F_ADLER32_D | F_CRC32_D) != 0;
    let compressed_sum = header.flags & (F_ADLER32_C | F_CRC32_C) != 0;

    let lzo = minilzo_rs::LZO::init()?;
    let mut decompressed_output = Vec::new();
    loop {
        let uncompressed_size: u32 = data_reader.read_be()?;
        if uncompressed_size == 0 {
            break;
        }
        let compressed_size: u32 = data_reader.read_be()?;
        let d_sum: Option<u32> = if data_sum { Some(data_reader.read_be()?) } else { None };
        let c_sum: Option<u32> = if compressed_sum && compressed_size < uncompressed_size {
            Some(data_reader.read_be()?)
        } else {
            None
        };
        if compressed_size > uncompressed_size {
            return Err(format!("Block claims {} compressed bytes for {} bytes of data!", compressed_size, uncompressed_size).into());
        }

        let stored_data = common::read_exact(&mut data_reader, compressed_size as usize)?;
        if let Some(sum) = c_sum {
            if header.flags & F_ADLER32_C != 0 && adler32(&stored_data.as_slice()) != sum {
                return Err("Invalid compressed block checksum! Data corrupted?".into());
            }
        }

        //if uncomp size = comp size, this block is stored
        let out_data = if uncompressed_size == compressed_size {
            stored_data
        } else {
            lzo.decompress(&stored_data, uncompressed_size as usize)?
        };

        if let Some(sum) = d_sum {
            if header.flags & F_ADLER32_D != 0 && adler32(&out_data.as_slice()) != sum {
                return Err("Invalid block checksum! Data corrupted?".into());
            }
        }

        decompressed_output.extend_from_slice(&out_data);
    }

    Ok(decompressed_output)
}

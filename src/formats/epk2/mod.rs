mod include;
use std::any::Any;
use crate::{AppContext, InputTarget, formats::{Format, Stage, DetectResult, ExtractResult}};
pub fn format() -> Format {
    Format { name: "EPK2", detect_func: is_epk2_file, run_func: extract_epk2 }
}

use std::io::{Cursor, Seek, SeekFrom};
use binrw::BinReaderExt;

use crate::keys::AesKey;
use crate::utils::aes::decrypt_aes_ecb;
use crate::utils::common;
use crate::formats::epk::{epk_version, find_key, EpkVersion};
use include::*;

pub fn is_epk2_file(_app_ctx: &AppContext, target: &InputTarget) -> DetectResult {
    let header = common::read_file(target.file(), SIGNATURE_SIZE as u64, 4)?;
    if header == b"epak" || epk_version(target)? == Some(EpkVersion::Epk2) {
        Ok(Some(Box::new(())))
    } else {
        Ok(None)
    }
}

/// Where a pak (or the pak after it) starts, counting every segment
/// signature stored before it.
fn pak_position(offset: u64, signature_count: u64) -> Result<u64, Box<dyn std::error::Error>> {
    SIGNATURE_SIZE
        .checked_mul(signature_count)
        .and_then(|signatures| signatures.checked_add(offset))
        .ok_or_else(|| format!("Pak offset {:#x} is out of range!", offset).into())
}

fn decrypt_pak_header(key: &AesKey, encrypted_header: &[u8]) -> Result<PakHeader, Box<dyn std::error::Error>> {
    let mut pak_header_reader = Cursor::new(decrypt_aes_ecb(&key.key, encrypted_header)?);
    Ok(pak_header_reader.read_le()?)
}

pub fn extract_epk2(app_ctx: &AppContext, target: &InputTarget, _ctx: Box<dyn Any>) -> ExtractResult {
    let mut file = target.file();
    file.seek(SeekFrom::Start(0))?;

    let _header_signature = common::read_exact(&mut file, SIGNATURE_SIZE as usize)?;
    let stored_header = common::read_exact(&mut file, MAX_HEADER_SIZE)?;
    let header;

    let mut matching_key: Option<&AesKey> = None;

    //check if header is encrypted
    if &stored_header[0..4] == b"epak" {
        println!("Header is not encrypted.");
        header = stored_header;
    } else {
        println!("Header is encrypted...");
        //find the key, knowing that the header should start with "epak"
        let key = find_key(&app_ctx.keys, &stored_header, b"epak")?.ok_or("No valid key found!")?;
        println!("Found valid key: {}", key.name);
        header = decrypt_aes_ecb(&key.key, &stored_header)?;
        matching_key = Some(key);
    }
    //parse header
    let mut hdr_reader = Cursor::new(header);
    let hdr: Header = hdr_reader.read_le()?;

    println!("\nEPK info -\nData size: {}\nPak count: {}\nOTA ID: {}\nVersion: {:02x?}.{:02x?}.{:02x?}.{:02x?}\n",
            hdr.file_size, hdr.pak_count, hdr.ota_id(), hdr.version[3], hdr.version[2], hdr.version[1], hdr.version[0]);

    let mut paks: Vec<Pak> = Vec::new();
    //parse paks in header
    for i in 0..hdr.pak_count {
        let pak: PakEntry = hdr_reader.read_le()?;
        //here the accounted for signature is the one at the beginning of the EPK file
        let offset = pak_position(pak.offset as u64, 1)?;
        println!("Pak {} - {}, offset: {}, size: {}, segment size: {}", i + 1, pak.name(), offset, pak.size, pak.segment_size);
        paks.push(Pak { offset, name: pak.name() });
    }

    let output_dir = common::derived_dir(app_ctx, target, "_epk2")?;
    let mut signature_count = 0;
    //extract paks
    for (pak_n, pak) in paks.iter().enumerate() {
        let actual_offset = pak_position(pak.offset, signature_count)?;
        file.seek(SeekFrom::Start(actual_offset))?;

        let _segment_signature = common::read_exact(&mut file, SIGNATURE_SIZE as usize)?;
        signature_count += 1;
        let encrypted_header = common::read_exact(&mut file, PAK_HEADER_SIZE)?;

        //the file's header was not encrypted so we dont have the key yet
        let key = match matching_key {
            Some(key) => key,
            None => {
                //the pak header should start with the pak's name
                let key = find_key(&app_ctx.keys, &encrypted_header, pak.name.as_bytes())?.ok_or("No valid key found!")?;
                println!("Found valid key: {}", key.name);
                matching_key = Some(key);
                key
            }
        };

        let mut pak_header = decrypt_pak_header(key, &encrypted_header)?;
        println!("\n({}/{}) - {}, Size: {}, Segment count: {}, Platform: {}",
                pak_n + 1, paks.len(), pak.name, pak_header.image_size, pak_header.segment_count, pak_header.platform_id());

        let output_path = output_dir.join(format!("{}.bin", common::safe_name(&pak.name)?));
        let image_size = pak_header.image_size as usize;
        let mut written = 0usize;

        for i in 0..pak_header.segment_count {
            // for first segment we already read the header so skip doing that for it
            if i > 0 {
                let _segment_signature = common::read_exact(&mut file, SIGNATURE_SIZE as usize)?;
                signature_count += 1;
                let encrypted_header = common::read_exact(&mut file, PAK_HEADER_SIZE)?;
                pak_header = decrypt_pak_header(key, &encrypted_header)?;
            }

            if i != pak_header.segment_index {
                return Err(format!("Unexpected segment index in pak header!, expected: {}, got: {}", i, pak_header.segment_index).into());
            }

            // the last segment of a pak may be shorter than the nominal segment size
            let actual_segment_size = if i + 1 == pak_header.segment_count && pak_n + 1 < paks.len() {
                let next_pak_offset = pak_position(paks[pak_n + 1].offset, signature_count)?;
                let current_pos = file.stream_position()?;
                next_pak_offset.saturating_sub(current_pos).min(pak_header.segment_size as u64)
            } else {
                pak_header.segment_size as u64
            };

            println!("- Segment {}/{} - Size: {}", i + 1, pak_header.segment_count, actual_segment_size);

            let segment_data = common::read_exact(&mut file, actual_segment_size as usize)?;
            let out_data = decrypt_aes_ecb(&key.key, &segment_data)?;
            // drop block padding past the image size
            let keep = out_data.len().min(image_size.saturating_sub(written));

            if i == 0 {
                common::write_file(&output_path, &out_data[..keep])?;
            } else {
                common::append_file(&output_path, &out_data[..keep])?;
            }
            written += keep;
        }
        println!("-- Saved to {}", output_path.display());
    }

    Ok(Stage::Terminal)
}

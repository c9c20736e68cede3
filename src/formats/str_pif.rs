use std::any::Any;
use crate::{AppContext, InputTarget, formats::{Format, Stage, DetectResult, ExtractResult}};
pub fn str_format() -> Format {
    Format { name: "STR stream", detect_func: is_str_file, run_func: extract_str }
}
pub fn pif_format() -> Format {
    Format { name: "PIF", detect_func: is_pif_file, run_func: extract_pif }
}

use std::fs;
use std::path::{Path, PathBuf};
use crate::utils::aes::decrypt_aes_ecb;
use crate::utils::common;

/// Four byte timestamp prefix plus a 188 byte TS packet.
const STR_PACKET_SIZE: usize = 192;
const TS_PACKET_SIZE: usize = 188;
const TS_SYNC: u8 = 0x47;

pub fn is_str_file(_app_ctx: &AppContext, target: &InputTarget) -> DetectResult {
    let header = common::read_file(target.file(), 0, 2 * STR_PACKET_SIZE + 5)?;
    let synced = [4, 4 + STR_PACKET_SIZE, 4 + 2 * STR_PACKET_SIZE]
        .iter()
        .all(|&i| header.get(i) == Some(&TS_SYNC));
    if synced {
        Ok(Some(Box::new(())))
    } else {
        Ok(None)
    }
}

pub fn is_pif_file(_app_ctx: &AppContext, target: &InputTarget) -> DetectResult {
    if target.file_name().ends_with("PIF") {
        Ok(Some(Box::new(())))
    } else {
        Ok(None)
    }
}

fn load_tv_key(app_ctx: &AppContext) -> Option<Vec<u8>> {
    let path = app_ctx.config_dir.join("TVKEY");
    match fs::read(&path) {
        Ok(key) if key.len() >= 16 => Some(key[..16].to_vec()),
        Ok(key) => {
            log::warn!("{} holds {} bytes, expected a 16 byte key", path.display(), key.len());
            None
        }
        Err(_) => None,
    }
}

/// Decrypts the payload of a scrambled TS packet in place and clears its
/// scrambling bits. Only whole blocks are encrypted.
fn descramble_packet(key: &[u8], packet: &mut [u8]) -> Result<bool, Box<dyn std::error::Error>> {
    if packet[3] & 0xC0 == 0 {
        return Ok(false);
    }
    let mut payload_start = 4;
    if packet[3] & 0x20 != 0 {
        //adaptation field
        payload_start += 1 + packet[4] as usize;
    }
    if payload_start < TS_PACKET_SIZE {
        let blocks_len = (TS_PACKET_SIZE - payload_start) / 16 * 16;
        let payload = &mut packet[payload_start..payload_start + blocks_len];
        let plain = decrypt_aes_ecb(key, payload)?;
        payload.copy_from_slice(&plain);
    }
    packet[3] &= 0x3F;
    Ok(true)
}

fn convert_str(app_ctx: &AppContext, str_path: &Path, output_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(str_path)?;
    let key = load_tv_key(app_ctx);
    if key.is_some() {
        println!("Using TVKEY from {}", app_ctx.config_dir.display());
    }

    let mut out_data = Vec::with_capacity(data.len() / STR_PACKET_SIZE * TS_PACKET_SIZE);
    let mut descrambled = 0;
    for (i, packet) in data.chunks_exact(STR_PACKET_SIZE).enumerate() {
        let mut ts_packet = packet[4..].to_vec();
        if ts_packet[0] != TS_SYNC {
            log::warn!("Packet {} lost sync, skipping", i);
            continue;
        }
        if let Some(key) = &key {
            if descramble_packet(key, &mut ts_packet)? {
                descrambled += 1;
            }
        }
        out_data.extend_from_slice(&ts_packet);
    }
    println!("- {} packets, {} descrambled", out_data.len() / TS_PACKET_SIZE, descrambled);

    common::write_file(output_path, &out_data)?;
    Ok(())
}

pub fn extract_str(app_ctx: &AppContext, target: &InputTarget, _ctx: Box<dyn Any>) -> ExtractResult {
    let output_path = common::derived_path(app_ctx, target, ".ts");
    convert_str(app_ctx, &target.path, &output_path)?;
    Ok(Stage::Terminal)
}

/// The recording next to a PIF: same name with `STR` in place of `PIF`.
fn sibling_str(pif_path: &Path) -> Option<PathBuf> {
    let name = pif_path.file_name()?.to_str()?;
    let stem = name.strip_suffix("PIF")?;
    Some(pif_path.with_file_name(format!("{}STR", stem)))
}

pub fn extract_pif(app_ctx: &AppContext, target: &InputTarget, _ctx: Box<dyn Any>) -> ExtractResult {
    let str_path = sibling_str(&target.path).ok_or("Cannot derive the STR name")?;
    if !str_path.is_file() {
        return Err(format!("{} not found!", str_path.display()).into());
    }
    println!("Recording: {}", str_path.display());

    let output_path = common::derived_path(app_ctx, target, ".ts");
    convert_str(app_ctx, &str_path, &output_path)?;
    Ok(Stage::Terminal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::aes::encrypt_aes_ecb;

    fn ts_packet(fill: u8, scrambled: bool) -> Vec<u8> {
        let mut p = vec![TS_SYNC, 0x01, 0x00, 0x10];
        if scrambled {
            p[3] |= 0x80;
        }
        p.resize(TS_PACKET_SIZE, fill);
        p
    }

    fn str_stream(packets: &[Vec<u8>]) -> Vec<u8> {
        let mut data = Vec::new();
        for (i, p) in packets.iter().enumerate() {
            data.extend_from_slice(&(i as u32).to_be_bytes());
            data.extend_from_slice(p);
        }
        data
    }

    #[test]
    fn strips_prefixes() {
        let dir = common::scratch_dir("str");
        let app_ctx = AppContext::new(&dir, &dir);
        let packets: Vec<Vec<u8>> = (0..4).map(|i| ts_packet(i, false)).collect();
        let target = common::scratch_target(&dir, "REC001.STR", &str_stream(&packets));

        let ctx = is_str_file(&app_ctx, &target).unwrap().unwrap();
        assert_eq!(extract_str(&app_ctx, &target, ctx).unwrap(), Stage::Terminal);
        assert_eq!(std::fs::read(dir.join("REC001.STR.ts")).unwrap(), packets.concat());
    }

    #[test]
    fn descrambles_with_tv_key() {
        let dir = common::scratch_dir("str-key");
        let app_ctx = AppContext::new(&dir, &dir);
        let key = [0x3Cu8; 16];
        std::fs::write(dir.join("TVKEY"), key).unwrap();

        let plain = ts_packet(0x99, false);
        let mut scrambled = ts_packet(0x99, true);
        // 184 payload bytes: 11 whole blocks, 8 clear bytes
        let enc = encrypt_aes_ecb(&key, &scrambled[4..180]);
        scrambled[4..180].copy_from_slice(&enc);
        let target = common::scratch_target(&dir, "REC.STR", &str_stream(&[plain.clone(), scrambled, plain.clone()]));

        extract_str(&app_ctx, &target, Box::new(())).unwrap();
        let out = std::fs::read(dir.join("REC.STR.ts")).unwrap();
        assert_eq!(out, [plain.clone(), plain.clone(), plain].concat());
    }

    #[test]
    fn pif_converts_sibling() {
        let dir = common::scratch_dir("pif");
        let app_ctx = AppContext::new(&dir, &dir);
        let packets: Vec<Vec<u8>> = (0..3).map(|i| ts_packet(i, false)).collect();
        std::fs::write(dir.join("REC002.STR"), str_stream(&packets)).unwrap();
        let target = common::scratch_target(&dir, "REC002.PIF", b"<pif/>");

        let ctx = is_pif_file(&app_ctx, &target).unwrap().unwrap();
        assert_eq!(extract_pif(&app_ctx, &target, ctx).unwrap(), Stage::Terminal);
        assert_eq!(std::fs::read(dir.join("REC002.PIF.ts")).unwrap(), packets.concat());
    }

    #[test]
    fn pif_without_recording() {
        let dir = common::scratch_dir("pif-missing");
        let app_ctx = AppContext::new(&dir, &dir);
        let target = common::scratch_target(&dir, "LONE.PIF", b"");
        assert!(extract_pif(&app_ctx, &target, Box::new(())).is_err());

        let other = common::scratch_target(&dir, "notes.pif", b"");
        assert!(is_pif_file(&app_ctx, &other).unwrap().is_none());
    }
}

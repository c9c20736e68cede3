mod include;
use std::any::Any;
use crate::{AppContext, InputTarget, formats::{Format, Stage, DetectResult, ExtractResult}};
pub fn format() -> Format {
    Format { name: "EPK3", detect_func: is_epk3_file, run_func: extract_epk3 }
}

use std::io::{Cursor, Seek, SeekFrom};
use binrw::BinReaderExt;

use crate::utils::aes::decrypt_aes_ecb;
use crate::utils::common;
use crate::formats::epk::{epk_version, find_key, EpkVersion};
use include::*;

pub fn is_epk3_file(_app_ctx: &AppContext, target: &InputTarget) -> DetectResult {
    if epk_version(target)? == Some(EpkVersion::Epk3) {
        Ok(Some(Box::new(())))
    } else {
        Ok(None)
    }
}

pub fn extract_epk3(app_ctx: &AppContext, target: &InputTarget, _ctx: Box<dyn Any>) -> ExtractResult {
    let mut file = target.file();
    file.seek(SeekFrom::Start(0))?;
    let stored_header = common::read_exact(&mut file, HEADER_AREA_SIZE)?;

    println!("Finding key...");
    // the header should start with "EPK3", after either signature size
    let mut found = None;
    for epk3_type in [Epk3Type::Old, Epk3Type::New] {
        let encrypted = &stored_header[epk3_type.signature_size()..];
        if let Some(key) = find_key(&app_ctx.keys, encrypted, b"EPK3")? {
            found = Some((epk3_type, key, decrypt_aes_ecb(&key.key, encrypted)?));
            break;
        }
    }
    let (epk3_type, key, header) = found.ok_or("No valid key found!")?;
    println!("Found valid key: {}", key.name);

    //parse header
    let mut hdr_reader = Cursor::new(header);
    let hdr: Header = hdr_reader.read_le()?;

    println!("\nEPK info -\nEPK3 type: {:?}\nOTA ID: {}\nVersion: {:02x?}.{:02x?}.{:02x?}.{:02x?}\nPackage Info size: {}",
            epk3_type, hdr.ota_id(), hdr.version[3], hdr.version[2], hdr.version[1], hdr.version[0], hdr.package_info_size);

    if epk3_type == Epk3Type::New {
        let ex_hdr: HeaderNewEx = hdr_reader.read_le()?;
        println!("Encrypt type: {}\nUpdate type: {}\nUpdate platform version: {:.6}\nCompatible minimum version: {:.6}\nNeed to check compatible version: {}",
                ex_hdr.encrypt_type(), ex_hdr.update_type(), ex_hdr.update_platform_version, ex_hdr.compatible_minimum_version, ex_hdr.need_to_check_compatible_version);
    }

    let signature_size = epk3_type.signature_size();
    let prefix_size = epk3_type.segment_prefix_size();

    let _platform_versions = common::read_exact(&mut file, 36)?;
    let _pkg_info_signature = common::read_exact(&mut file, signature_size)?;

    //PKG INFO
    let pkg_info_encrypted = common::read_exact(&mut file, hdr.package_info_size as usize)?;
    let pkg_info = decrypt_aes_ecb(&key.key, &pkg_info_encrypted)?;

    let mut pkg_info_reader = Cursor::new(pkg_info);
    let pkg_info_hdr: PkgInfoHeader = pkg_info_reader.read_le()?;
    println!("Package info list size: {}\nPackage info count: {}",
            pkg_info_hdr.package_info_list_size, pkg_info_hdr.package_info_count);

    if epk3_type == Epk3Type::New {
        let _unknown = common::read_exact(&mut pkg_info_reader, 4)?;
    }

    let output_dir = common::derived_dir(app_ctx, target, "_epk3")?;
    let remaining = |reader: &Cursor<Vec<u8>>| reader.get_ref().len().saturating_sub(reader.position() as usize);

    let mut pak_i = 1;
    // the list may be followed by block padding
    while remaining(&pkg_info_reader) >= PKG_INFO_ENTRY_SIZE {
        let mut entry: PkgInfoEntry = pkg_info_reader.read_le()?;
        println!("\n({}) - {}, Size: {}, Segments: {}",
                pak_i, entry.package_name(), entry.package_size, entry.segment_count);

        let output_path = output_dir.join(format!("{}.bin", common::safe_name(&entry.package_name())?));
        for i in 0..entry.segment_count {
            if i > 0 {
                entry = pkg_info_reader.read_le()?;
            }
            println!("- Segment {}/{}, Size: {}", entry.segment_index + 1, entry.segment_count, entry.segment_size);

            let _segment_signature = common::read_exact(&mut file, signature_size)?;
            let encrypted_data = common::read_exact(&mut file, entry.segment_size as usize + prefix_size)?;
            let out_data = decrypt_aes_ecb(&key.key, &encrypted_data)?;

            if i == 0 {
                common::write_file(&output_path, &out_data[prefix_size..])?;
            } else {
                common::append_file(&output_path, &out_data[prefix_size..])?;
            }
        }
        println!("-- Saved to {}", output_path.display());
        pak_i += 1;
    }

    Ok(Stage::Terminal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::epk::tests::{padded, test_key};
    use crate::utils::aes::encrypt_aes_ecb;

    fn pkg_entry(name: &str, package_size: u32, index: u32, count: u32, segment_size: u32) -> Vec<u8> {
        let mut e = Vec::new();
        e.extend_from_slice(&[0u8; 8]);
        e.extend_from_slice(&padded(name, 128));
        e.extend_from_slice(&[0u8; 96 + 32 + 32]);
        e.extend_from_slice(&package_size.to_le_bytes());
        e.extend_from_slice(&0u32.to_le_bytes());
        e.extend_from_slice(&1u32.to_le_bytes());
        e.extend_from_slice(&index.to_le_bytes());
        e.extend_from_slice(&count.to_le_bytes());
        e.extend_from_slice(&segment_size.to_le_bytes());
        e.extend_from_slice(&0u32.to_le_bytes());
        assert_eq!(e.len(), PKG_INFO_ENTRY_SIZE);
        e
    }

    /// Packages are split into segments of `segment_size` bytes, a multiple of 16.
    fn epk3(key: &[u8], epk3_type: Epk3Type, packages: &[(&str, &[u8])], segment_size: usize) -> Vec<u8> {
        let sig = epk3_type.signature_size();
        let prefix = epk3_type.segment_prefix_size();

        let mut pkg_info = Vec::new();
        let mut segments = Vec::new();
        for &(name, payload) in packages {
            let chunks: Vec<&[u8]> = payload.chunks(segment_size).collect();
            for (i, chunk) in chunks.iter().enumerate() {
                pkg_info.extend_from_slice(&pkg_entry(name, payload.len() as u32, i as u32, chunks.len() as u32, chunk.len() as u32));
                let mut plain = vec![0xCCu8; prefix];
                plain.extend_from_slice(chunk);
                segments.push(plain);
            }
        }
        let mut list = Vec::new();
        list.extend_from_slice(&(pkg_info.len() as u32).to_le_bytes());
        list.extend_from_slice(&(packages.len() as u32).to_le_bytes());
        if epk3_type == Epk3Type::New {
            list.extend_from_slice(&[0u8; 4]);
        }
        list.extend_from_slice(&pkg_info);
        list.resize((list.len() + 15) / 16 * 16, 0);

        let mut header = b"EPK3".to_vec();
        header.extend_from_slice(&[0x00, 0x00, 0x01, 0x03]);
        header.extend_from_slice(&padded("HE_DTV_W17H_AFADATAA", 32));
        header.extend_from_slice(&(list.len() as u32).to_le_bytes());
        header.extend_from_slice(&0u32.to_le_bytes());
        if epk3_type == Epk3Type::New {
            header.extend_from_slice(b"PAKI");
            header.extend_from_slice(&padded("AES", 6));
            header.extend_from_slice(&padded("FULL", 6));
            header.extend_from_slice(&3.5f32.to_le_bytes());
            header.extend_from_slice(&3.0f32.to_le_bytes());
            header.extend_from_slice(&1i32.to_le_bytes());
        }
        header.resize(HEADER_AREA_SIZE - sig, 0);

        let mut file = vec![0x11u8; sig];
        file.extend_from_slice(&encrypt_aes_ecb(key, &header));
        let mut versions = vec![0u8; 36];
        versions[4..9].copy_from_slice(b"4.1.0");
        versions[20..25].copy_from_slice(b"4.0.0");
        file.extend_from_slice(&versions);
        file.extend_from_slice(&vec![0x22u8; sig]);
        file.extend_from_slice(&encrypt_aes_ecb(key, &list));
        for segment in segments {
            file.extend_from_slice(&vec![0x33u8; sig]);
            file.extend_from_slice(&encrypt_aes_ecb(key, &segment));
        }
        file
    }

    #[test]
    fn old_layout() {
        let dir = common::scratch_dir("epk3-old");
        let mut app_ctx = AppContext::new(&dir, &dir);
        let key = test_key();
        app_ctx.keys = vec![key.clone()];

        let rootfs: Vec<u8> = (0..64u8).collect();
        let data = epk3(&key.key, Epk3Type::Old, &[("rootfs", &rootfs[..]), ("tzfw", &[7u8; 16][..])], 32);
        let target = common::scratch_target(&dir, "fw.epk", &data);

        let ctx = is_epk3_file(&app_ctx, &target).unwrap().unwrap();
        assert_eq!(extract_epk3(&app_ctx, &target, ctx).unwrap(), Stage::Terminal);
        assert_eq!(std::fs::read(dir.join("fw.epk_epk3/rootfs.bin")).unwrap(), rootfs);
        assert_eq!(std::fs::read(dir.join("fw.epk_epk3/tzfw.bin")).unwrap(), vec![7u8; 16]);
    }

    #[test]
    fn new_layout_strips_segment_prefix() {
        let dir = common::scratch_dir("epk3-new");
        let mut app_ctx = AppContext::new(&dir, &dir);
        let key = test_key();
        app_ctx.keys = vec![key.clone()];

        let data = epk3(&key.key, Epk3Type::New, &[("lgapp", &[0x42u8; 44][..])], 44);
        let target = common::scratch_target(&dir, "fw.epk", &data);

        assert!(is_epk3_file(&app_ctx, &target).unwrap().is_some());
        extract_epk3(&app_ctx, &target, Box::new(())).unwrap();
        assert_eq!(std::fs::read(dir.join("fw.epk_epk3/lgapp.bin")).unwrap(), vec![0x42u8; 44]);
    }

    #[test]
    fn package_name_cannot_leave_output_dir() {
        let dir = common::scratch_dir("epk3-traversal");
        let mut app_ctx = AppContext::new(&dir, &dir);
        let key = test_key();
        app_ctx.keys = vec![key.clone()];

        let data = epk3(&key.key, Epk3Type::Old, &[("../../evil", &[0x66u8; 16][..])], 16);
        let target = common::scratch_target(&dir, "fw.epk", &data);

        let err = extract_epk3(&app_ctx, &target, Box::new(())).unwrap_err();
        assert!(err.to_string().contains("../../evil"));
        assert!(!dir.join("fw.epk_epk3/../../evil.bin").exists());
        assert_eq!(std::fs::read_dir(dir.join("fw.epk_epk3")).unwrap().count(), 0);
    }

    #[test]
    fn epk2_versions_are_not_epk3() {
        let dir = common::scratch_dir("epk3-detect");
        let app_ctx = AppContext::new(&dir, &dir);
        let mut data = vec![0u8; 1712 + 36];
        data[1712 + 4..1712 + 18].copy_from_slice(b"0004.0012.0034");
        data[1712 + 20..1712 + 29].copy_from_slice(b"05.00.123");
        let target = common::scratch_target(&dir, "fw.epk", &data);
        assert!(is_epk3_file(&app_ctx, &target).unwrap().is_none());
    }
}

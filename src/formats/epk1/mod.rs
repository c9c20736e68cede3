mod include;
use std::any::Any;
use crate::{AppContext, InputTarget, formats::{Format, Stage, DetectResult, ExtractResult}};
pub fn format() -> Format {
    Format { name: "EPK1", detect_func: is_epk1_file, run_func: extract_epk1 }
}

use std::io::{Seek, SeekFrom};
use binrw::BinReaderExt;

use crate::utils::common;
use include::*;

pub fn is_epk1_file(_app_ctx: &AppContext, target: &InputTarget) -> DetectResult {
    let epk2_magic = common::read_file(target.file(), 12, 4)?;
    let epak_magic = common::read_file(target.file(), 0, 4)?;
    if epak_magic == b"epak" && epk2_magic != b"EPK2" {
        Ok(Some(Box::new(())))
    } else {
        Ok(None)
    }
}

fn read_pak_table(target: &InputTarget, epk1_type: Epk1Type, header: &CommonHeader) -> Result<Vec<Pak>, Box<dyn std::error::Error>> {
    let mut file = target.file();
    let max_pak_count = match epk1_type {
        Epk1Type::BigEndian => BE_MAX_PAKS,
        Epk1Type::LittleEndian => {
            //offset of first entry doubles as the header size, some variants fit 32 entries
            let header_size_bytes = common::read_file(file, 12, 4)?;
            let header_size = u32::from_le_bytes(header_size_bytes.as_slice().try_into()?);
            let count = header_size.saturating_sub(LE_HEADER_EXTRA) / 8;
            if count == 0 || count >= 128 {
                return Err(format!("Unreasonable calculated pak count {}!", count).into());
            }
            count
        }
    };

    file.seek(SeekFrom::Start(12))?;
    let mut paks = Vec::new();
    for _i in 0..max_pak_count {
        let pak: Pak = match epk1_type {
            Epk1Type::BigEndian => file.read_be()?,
            Epk1Type::LittleEndian => file.read_le()?,
        };
        if pak.offset == 0 && pak.size == 0 {
            continue;
        }
        paks.push(pak);
    }
    if header.pak_count as usize != paks.len() {
        return Err(format!("Paks count in header({}) does not match the amount of non empty pak entries({})!", header.pak_count, paks.len()).into());
    }
    Ok(paks)
}

pub fn extract_epk1(app_ctx: &AppContext, target: &InputTarget, _ctx: Box<dyn Any>) -> ExtractResult {
    let mut file = target.file();

    //the pak count reads huge in the wrong byte order
    let init_pak_count_bytes = common::read_file(file, 8, 4)?;
    let init_pak_count = u32::from_le_bytes(init_pak_count_bytes.as_slice().try_into()?);
    let epk1_type = if init_pak_count > 256 {
        println!("Big endian EPK1 detected.");
        Epk1Type::BigEndian
    } else if init_pak_count < 33 {
        println!("Little endian EPK1 detected.");
        Epk1Type::LittleEndian
    } else {
        return Err("Unknown EPK1 variant!".into());
    };

    file.seek(SeekFrom::Start(0))?;
    let header: CommonHeader = match epk1_type {
        Epk1Type::BigEndian => file.read_be()?,
        Epk1Type::LittleEndian => file.read_le()?,
    };
    let paks = read_pak_table(target, epk1_type, &header)?;

    let version = common::read_exact(&mut file, 4)?;
    match epk1_type {
        Epk1Type::BigEndian => {
            println!("EPK info -\nData size: {}\nPak count: {}\nVersion: {:02x?}.{:02x?}.{:02x?}",
                    header.file_size, header.pak_count, version[1], version[2], version[3]);
        }
        Epk1Type::LittleEndian => {
            let ota_id_bytes = common::read_exact(&mut file, 32)?;
            println!("EPK info -\nData size: {}\nPak count: {}\nOTA ID: {}\nVersion: {:02x?}.{:02x?}.{:02x?}",
                    header.file_size, header.pak_count, common::string_from_bytes(&ota_id_bytes), version[2], version[1], version[0]);
        }
    }

    let output_dir = common::derived_dir(app_ctx, target, "_epk1")?;
    for (i, pak) in paks.iter().enumerate() {
        file.seek(SeekFrom::Start(pak.offset as u64))?;
        let pak_header: PakHeader = match epk1_type {
            Epk1Type::BigEndian => file.read_be()?,
            Epk1Type::LittleEndian => file.read_le()?,
        };

        println!("\n({}/{}) - {}, Offset: {}, Size: {}, Platform: {}",
                i + 1, paks.len(), pak_header.pak_name(), pak.offset, pak_header.image_size, pak_header.platform_id());

        let data = common::read_exact(&mut file, pak_header.image_size as usize)?;
        let output_path = output_dir.join(common::safe_name(&pak_header.pak_name())? + ".bin");
        common::write_file(&output_path, &data)?;

        println!("- Saved file!");
    }

    Ok(Stage::Terminal)
}

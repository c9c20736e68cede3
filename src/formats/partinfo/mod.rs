mod include;
use std::any::Any;
use crate::{AppContext, InputTarget, formats::{Format, Stage, DetectResult, ExtractResult}};
pub fn format() -> Format {
    Format { name: "partition table", detect_func: is_partinfo_file, run_func: extract_partinfo }
}

use std::fmt::Write as _;
use std::io::{Seek, SeekFrom};
use std::path::Path;
use binrw::BinReaderExt;

use crate::utils::common;
use include::*;

pub fn is_partinfo_file(_app_ctx: &AppContext, target: &InputTarget) -> DetectResult {
    let mut file = target.file();
    if target.len() < 16 {
        return Ok(None);
    }
    file.seek(SeekFrom::Start(0))?;
    let header: PartmapHeader = file.read_le()?;
    if header.is_sane() {
        Ok(Some(Box::new(())))
    } else {
        Ok(None)
    }
}

pub fn extract_partinfo(app_ctx: &AppContext, target: &InputTarget, _ctx: Box<dyn Any>) -> ExtractResult {
    let mut file = target.file();
    file.seek(SeekFrom::Start(0))?;
    let header: PartmapHeader = file.read_le()?;

    let mut devices = Vec::new();
    for _i in 0..MAX_DEVICES {
        let device: DeviceInfo = file.read_le()?;
        devices.push(device);
    }
    let mut partitions = Vec::new();
    for _i in 0..header.npartition {
        let partition: PartitionInfo = file.read_le()?;
        partitions.push(partition);
    }

    let mut text = String::new();
    writeln!(text, "magic: {:08x}", header.magic)?;
    writeln!(text, "cur epk ver: {}", version_string(header.cur_epk_ver))?;
    writeln!(text, "old epk ver: {}", version_string(header.old_epk_ver))?;
    writeln!(text, "\nDevices:")?;
    for (i, device) in devices.iter().take(header.nmap as usize).enumerate() {
        writeln!(text, "[{}] {:<16} size={:#x} phys={:#x} virt={:#x} cached={} bw={} used={}",
                i, device.name(), device.size, device.phys, device.virt, device.cached, device.bandwidth, device.used)?;
    }
    writeln!(text, "\nPartitions:")?;
    for (i, part) in partitions.iter().enumerate() {
        writeln!(text, "[{:2}] {:<16} offset={:#010x} size={:#010x} file={:<24} filesize={} sw_ver={} used={} valid={} flags={:#x}",
                i, part.name(), part.offset, part.size, part.filename(), part.filesize,
                version_string(part.sw_ver), part.used, part.valid, part.mask_flags)?;
    }

    let stem = Path::new(&target.file_name())
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| target.file_name());
    let output_path = app_ctx.output_dir.join(format!("{}.txt", stem));
    common::write_file(&output_path, text.as_bytes())?;
    println!("- {} partitions dumped to {}", partitions.len(), output_path.display());

    Ok(Stage::Terminal)
}

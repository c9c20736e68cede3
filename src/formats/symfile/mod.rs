mod include;
use std::any::Any;
use crate::{AppContext, InputTarget, formats::{Format, Stage, DetectResult, ExtractResult}};
pub fn format() -> Format {
    Format { name: "symbol file", detect_func: is_symfile, run_func: extract_symfile }
}

use std::fmt::Write as _;
use std::io::Cursor;
use binrw::BinReaderExt;

use crate::utils::common;
use include::*;

const SYM_HEADER_SIZE: usize = 20;
const SYM_ENTRY_SIZE: usize = 12;

pub fn is_symfile(_app_ctx: &AppContext, target: &InputTarget) -> DetectResult {
    let magic = common::read_file(target.file(), 0, 4)?;
    if magic == SYMFILE_MAGIC.to_le_bytes() {
        Ok(Some(Box::new(())))
    } else {
        Ok(None)
    }
}

/// Quotes a symbol name as an IDC string literal body.
fn idc_escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Writes the symbols as an IDC script naming each address.
fn to_idc(entries: &[(u32, u32, String)]) -> Result<String, std::fmt::Error> {
    let mut idc = String::new();
    writeln!(idc, "#include <idc.idc>\n")?;
    writeln!(idc, "static main() {{")?;
    for (addr, end, name) in entries {
        writeln!(idc, "\tMakeName(0x{:08X}, \"{}\");", addr, idc_escape(name))?;
        if end > addr {
            writeln!(idc, "\tMakeFunction(0x{:08X}, 0x{:08X});", addr, end)?;
        }
    }
    writeln!(idc, "}}")?;
    Ok(idc)
}

pub fn extract_symfile(app_ctx: &AppContext, target: &InputTarget, _ctx: Box<dyn Any>) -> ExtractResult {
    let data = common::read_all(target.file())?;
    let mut reader = Cursor::new(&data[..]);
    let header: SymHeader = reader.read_le()?;
    println!("Symbols: {}\nData size: {}", header.n_symbols, header.size);

    let names_start = SYM_HEADER_SIZE
        + header.n_symbols as usize * SYM_ENTRY_SIZE
        + header.tail_size as usize;
    if names_start > data.len() {
        return Err(format!("Symbol table needs {} bytes, file has {}!", names_start, data.len()).into());
    }
    let names = &data[names_start..];

    let mut entries = Vec::with_capacity(header.n_symbols as usize);
    for i in 0..header.n_symbols {
        let entry: SymEntry = reader.read_le()?;
        let name = names
            .get(entry.name_offset as usize..)
            .map(common::string_from_bytes)
            .ok_or_else(|| format!("Symbol {} name offset {:#x} is out of range!", i, entry.name_offset))?;
        entries.push((entry.addr, entry.end, name));
    }

    let output_path = common::derived_path(app_ctx, target, ".idc");
    common::write_file(&output_path, to_idc(&entries)?.as_bytes())?;
    println!("- Wrote {}", output_path.display());

    Ok(Stage::Terminal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symfile(symbols: &[(u32, u32, &str)]) -> Vec<u8> {
        let mut names = Vec::new();
        let mut entries = Vec::new();
        for &(addr, end, name) in symbols {
            entries.extend_from_slice(&addr.to_le_bytes());
            entries.extend_from_slice(&end.to_le_bytes());
            entries.extend_from_slice(&(names.len() as u32).to_le_bytes());
            names.extend_from_slice(name.as_bytes());
            names.push(0);
        }
        let tail = [0u8; 8];
        let mut data = Vec::new();
        data.extend_from_slice(&SYMFILE_MAGIC.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&((entries.len() + tail.len() + names.len()) as u32).to_le_bytes());
        data.extend_from_slice(&(symbols.len() as u32).to_le_bytes());
        data.extend_from_slice(&(tail.len() as u32).to_le_bytes());
        data.extend_from_slice(&entries);
        data.extend_from_slice(&tail);
        data.extend_from_slice(&names);
        data
    }

    #[test]
    fn converts_to_idc() {
        let dir = common::scratch_dir("symfile");
        let app_ctx = AppContext::new(&dir, &dir);
        let data = symfile(&[(0x8000, 0x8040, "main"), (0x8040, 0x8040, "data_start")]);
        let target = common::scratch_target(&dir, "RELEASE.sym", &data);

        let ctx = is_symfile(&app_ctx, &target).unwrap().unwrap();
        assert_eq!(extract_symfile(&app_ctx, &target, ctx).unwrap(), Stage::Terminal);

        let idc = std::fs::read_to_string(dir.join("RELEASE.sym.idc")).unwrap();
        assert!(idc.starts_with("#include <idc.idc>"));
        assert!(idc.contains("MakeName(0x00008000, \"main\");"));
        assert!(idc.contains("MakeFunction(0x00008000, 0x00008040);"));
        assert!(idc.contains("MakeName(0x00008040, \"data_start\");"));
        assert!(!idc.contains("MakeFunction(0x00008040"));
    }

    #[test]
    fn quotes_and_backslashes_are_escaped() {
        assert_eq!(idc_escape(r#"operator"\x"#), r#"operator\"\\x"#);

        let dir = common::scratch_dir("symfile-escape");
        let app_ctx = AppContext::new(&dir, &dir);
        let target = common::scratch_target(&dir, "esc.sym", &symfile(&[(0x10, 0x10, r#"say"hi"\"#)]));
        extract_symfile(&app_ctx, &target, Box::new(())).unwrap();

        let idc = std::fs::read_to_string(dir.join("esc.sym.idc")).unwrap();
        assert!(idc.contains(r#"MakeName(0x00000010, "say\"hi\"\\");"#));
    }

    #[test]
    fn bad_name_offset() {
        let dir = common::scratch_dir("symfile-bad");
        let app_ctx = AppContext::new(&dir, &dir);
        let mut data = symfile(&[(0x8000, 0x8004, "f")]);
        data[28..32].copy_from_slice(&0x1000u32.to_le_bytes());
        let target = common::scratch_target(&dir, "bad.sym", &data);
        assert!(extract_symfile(&app_ctx, &target, Box::new(())).is_err());
    }
}

use std::fs;
use std::path::Path;

/// One AES key from the key file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AesKey {
    pub name: String,
    pub key: Vec<u8>,
}

/// Parses key file text: one hex key per line, optionally followed by a
/// name. Blank lines and `#` comments are skipped, as are malformed keys.
pub fn parse_keys(text: &str) -> Vec<AesKey> {
    let mut keys = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(2, char::is_whitespace);
        let key_hex = parts.next().unwrap_or("");
        let name = parts.next().map(str::trim).filter(|n| !n.is_empty());

        match hex::decode(key_hex) {
            Ok(key) if matches!(key.len(), 16 | 24 | 32) => keys.push(AesKey {
                name: name.map(str::to_string).unwrap_or_else(|| key_hex.to_string()),
                key,
            }),
            Ok(key) => log::warn!("Key file line {}: {} byte key is not an AES key", line_no + 1, key.len()),
            Err(e) => log::warn!("Key file line {}: {}", line_no + 1, e),
        }
    }
    keys
}

/// Loads the key file. A missing file just means no keys.
pub fn load_keys(path: &Path) -> Vec<AesKey> {
    match fs::read_to_string(path) {
        Ok(text) => {
            let keys = parse_keys(&text);
            log::debug!("Loaded {} keys from {}", keys.len(), path.display());
            keys
        }
        Err(e) => {
            log::debug!("No keys loaded from {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_comments() {
        let text = "\
# LG keys
000102030405060708090a0b0c0d0e0f  mtk5369
00112233445566778899AABBCCDDEEFF00112233445566778899aabbccddeeff # no name

not-hex
0011 short
";
        let keys = parse_keys(text);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].name, "mtk5369");
        assert_eq!(keys[0].key[15], 0x0f);
        assert_eq!(keys[1].key.len(), 32);
        assert!(keys[1].name.starts_with("00112233"));
    }

    #[test]
    fn missing_file_has_no_keys() {
        assert!(load_keys(Path::new("/nonexistent/AES.key")).is_empty());
    }
}

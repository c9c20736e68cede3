// Helpers shared by the EPK2 and EPK3 containers: version string probes and
// AES key search.

use crate::keys::AesKey;
use crate::utils::aes::decrypt_aes_ecb;
use crate::utils::common;
use crate::InputTarget;

/// Platform version strings sit right after the signature and the largest
/// header, whether or not the header is encrypted.
pub const VERSIONS_OFFSET: u64 = 1712;
const VERSIONS_SIZE: usize = 36;

const EPK2_PATTERN: &str = "____XXXX.XXXX.XXXX__XX.XX.XXX_______";
const EPK3_PATTERN: &str = "____X.X.X___________X.X.X___________";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpkVersion {
    Epk2,
    Epk3,
}

/// `_` is a NUL, `X` a digit, anything else must match literally.
fn match_with_pattern(data: &[u8], pattern: &str) -> bool {
    if data.len() < pattern.len() {
        return false;
    }
    data.iter().zip(pattern.bytes()).all(|(&b, p)| match p {
        b'_' => b == 0x00,
        b'X' => b.is_ascii_digit(),
        _ => b == p,
    })
}

pub fn check_epk_version(versions: &[u8]) -> Option<EpkVersion> {
    if match_with_pattern(versions, EPK2_PATTERN) {
        Some(EpkVersion::Epk2)
    } else if match_with_pattern(versions, EPK3_PATTERN) {
        Some(EpkVersion::Epk3)
    } else {
        None
    }
}

pub fn epk_version(target: &InputTarget) -> Result<Option<EpkVersion>, Box<dyn std::error::Error>> {
    let versions = common::read_file(target.file(), VERSIONS_OFFSET, VERSIONS_SIZE)?;
    Ok(check_epk_version(&versions))
}

/// First key that decrypts `data` to something starting with `expected_magic`.
pub fn find_key<'a>(keys: &'a [AesKey], data: &[u8], expected_magic: &[u8]) -> Result<Option<&'a AesKey>, Box<dyn std::error::Error>> {
    // the magic always fits in the first block or two
    let probe_len = (expected_magic.len() + 15) / 16 * 16;
    let probe = &data[..probe_len.min(data.len())];
    for key in keys {
        let decrypted = decrypt_aes_ecb(&key.key, probe)?;
        if decrypted.starts_with(expected_magic) {
            log::debug!("Key {} matches {:?}", key.name, String::from_utf8_lossy(expected_magic));
            return Ok(Some(key));
        }
    }
    Ok(None)
}

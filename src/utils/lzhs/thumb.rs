// ARM Thumb `BL` relocation, the branch filter applied to boot images.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Displacement becomes an absolute half-word target (before compression).
    ToAbsolute,
    /// Absolute target goes back to a PC-relative displacement (after decompression).
    ToRelative,
}

/// Rewrites every `BL` pair in `data` in place. `now_pos` is the address of
/// `data[0]`.
///
/// A pair is a little-endian half-word with top bits `11110` followed by one
/// with top bits `11111`; together they carry a 22-bit half-word displacement.
pub fn convert(data: &mut [u8], now_pos: u32, direction: Direction) {
    let size = data.len();
    let mut i = 0usize;
    while i + 4 <= size {
        if (data[i + 1] & 0xF8) == 0xF0 && (data[i + 3] & 0xF8) == 0xF8 {
            let src = (((data[i + 1] as u32 & 0x7) << 19)
                | ((data[i] as u32) << 11)
                | ((data[i + 3] as u32 & 0x7) << 8)
                | (data[i + 2] as u32))
                << 1;
            let pc = now_pos.wrapping_add(i as u32).wrapping_add(4);
            let dest = match direction {
                Direction::ToAbsolute => pc.wrapping_add(src),
                Direction::ToRelative => src.wrapping_sub(pc),
            } >> 1;

            data[i + 1] = 0xF0 | ((dest >> 19) & 0x7) as u8;
            data[i] = (dest >> 11) as u8;
            data[i + 3] = 0xF8 | ((dest >> 8) & 0x7) as u8;
            data[i + 2] = dest as u8;
            i += 2;
        }
        i += 2;
    }
}

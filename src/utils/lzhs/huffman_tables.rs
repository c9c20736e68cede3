// Fixed LZHS codebooks. Entries are `(code, bit length)` pairs, codes sent MSB first.

/// Literal bytes `0..=255` followed by the 32 match length buckets.
pub const CHARLEN: [(u32, u32); 288] = [
    (0x0002, 5), (0x0003, 5), (0x000A, 6), (0x0028, 7),
    (0x0029, 7), (0x002A, 7), (0x002B, 7), (0x002C, 7),
    (0x002D, 7), (0x002E, 7), (0x002F, 7), (0x008A, 8),
    (0x008B, 8), (0x008C, 8), (0x008D, 8), (0x008E, 8),
    (0x0030, 7), (0x008F, 8), (0x0090, 8), (0x0180, 9),
    (0x0091, 8), (0x0181, 9), (0x0182, 9), (0x0183, 9),
    (0x0031, 7), (0x0092, 8), (0x0093, 8), (0x0094, 8),
    (0x000B, 6), (0x0184, 9), (0x0185, 9), (0x0186, 9),
    (0x000C, 6), (0x0032, 7), (0x0033, 7), (0x0095, 8),
    (0x0096, 8), (0x0097, 8), (0x0187, 9), (0x0188, 9),
    (0x0034, 7), (0x0098, 8), (0x0099, 8), (0x0189, 9),
    (0x009A, 8), (0x009B, 8), (0x018A, 9), (0x018B, 9),
    (0x0035, 7), (0x009C, 8), (0x009D, 8), (0x018C, 9),
    (0x018D, 9), (0x018E, 9), (0x018F, 9), (0x0190, 9),
    (0x009E, 8), (0x0191, 9), (0x0192, 9), (0x0193, 9),
    (0x0194, 9), (0x0195, 9), (0x0196, 9), (0x0197, 9),
    (0x0036, 7), (0x009F, 8), (0x0037, 7), (0x0038, 7),
    (0x0198, 9), (0x0199, 9), (0x00A0, 8), (0x019A, 9),
    (0x0039, 7), (0x003A, 7), (0x003B, 7), (0x00A1, 8),
    (0x00A2, 8), (0x00A3, 8), (0x019B, 9), (0x019C, 9),
    (0x019D, 9), (0x019E, 9), (0x019F, 9), (0x01A0, 9),
    (0x01A1, 9), (0x03B0, 10), (0x03B1, 10), (0x03B2, 10),
    (0x01A2, 9), (0x01A3, 9), (0x01A4, 9), (0x03B3, 10),
    (0x01A5, 9), (0x03B4, 10), (0x03B5, 10), (0x03B6, 10),
    (0x003C, 7), (0x00A4, 8), (0x00A5, 8), (0x00A6, 8),
    (0x00A7, 8), (0x00A8, 8), (0x01A6, 9), (0x03B7, 10),
    (0x000D, 6), (0x00A9, 8), (0x01A7, 9), (0x01A8, 9),
    (0x01A9, 9), (0x01AA, 9), (0x01AB, 9), (0x01AC, 9),
    (0x003D, 7), (0x01AD, 9), (0x00AA, 8), (0x01AE, 9),
    (0x01AF, 9), (0x01B0, 9), (0x03B8, 10), (0x03B9, 10),
    (0x003E, 7), (0x01B1, 9), (0x01B2, 9), (0x01B3, 9),
    (0x03BA, 10), (0x03BB, 10), (0x03BC, 10), (0x03BD, 10),
    (0x003F, 7), (0x00AB, 8), (0x01B4, 9), (0x01B5, 9),
    (0x01B6, 9), (0x03BE, 10), (0x03BF, 10), (0x03C0, 10),
    (0x00AC, 8), (0x00AD, 8), (0x01B7, 9), (0x01B8, 9),
    (0x01B9, 9), (0x03C1, 10), (0x03C2, 10), (0x03C3, 10),
    (0x00AE, 8), (0x00AF, 8), (0x00B0, 8), (0x03C4, 10),
    (0x03C5, 10), (0x03C6, 10), (0x03C7, 10), (0x03C8, 10),
    (0x0040, 7), (0x00B1, 8), (0x01BA, 9), (0x01BB, 9),
    (0x03C9, 10), (0x03CA, 10), (0x03CB, 10), (0x03CC, 10),
    (0x00B2, 8), (0x00B3, 8), (0x03CD, 10), (0x03CE, 10),
    (0x03CF, 10), (0x03D0, 10), (0x03D1, 10), (0x07DE, 11),
    (0x00B4, 8), (0x01BC, 9), (0x01BD, 9), (0x01BE, 9),
    (0x03D2, 10), (0x03D3, 10), (0x07DF, 11), (0x07E0, 11),
    (0x00B5, 8), (0x03D4, 10), (0x03D5, 10), (0x07E1, 11),
    (0x03D6, 10), (0x00B6, 8), (0x03D7, 10), (0x07E2, 11),
    (0x03D8, 10), (0x07E3, 11), (0x07E4, 11), (0x07E5, 11),
    (0x03D9, 10), (0x00B7, 8), (0x07E6, 11), (0x07E7, 11),
    (0x00B8, 8), (0x01BF, 9), (0x03DA, 10), (0x03DB, 10),
    (0x03DC, 10), (0x07E8, 11), (0x07E9, 11), (0x07EA, 11),
    (0x01C0, 9), (0x01C1, 9), (0x03DD, 10), (0x07EB, 11),
    (0x03DE, 10), (0x07EC, 11), (0x07ED, 11), (0x07EE, 11),
    (0x000E, 6), (0x000F, 6), (0x01C2, 9), (0x01C3, 9),
    (0x03DF, 10), (0x01C4, 9), (0x07EF, 11), (0x07F0, 11),
    (0x01C5, 9), (0x01C6, 9), (0x03E0, 10), (0x03E1, 10),
    (0x01C7, 9), (0x03E2, 10), (0x07F1, 11), (0x07F2, 11),
    (0x0010, 6), (0x01C8, 9), (0x01C9, 9), (0x03E3, 10),
    (0x03E4, 10), (0x01CA, 9), (0x01CB, 9), (0x0041, 7),
    (0x01CC, 9), (0x01CD, 9), (0x01CE, 9), (0x03E5, 10),
    (0x03E6, 10), (0x03E7, 10), (0x03E8, 10), (0x03E9, 10),
    (0x0042, 7), (0x00B9, 8), (0x07F3, 11), (0x07F4, 11),
    (0x03EA, 10), (0x07F5, 11), (0x01CF, 9), (0x01D0, 9),
    (0x00BA, 8), (0x01D1, 9), (0x01D2, 9), (0x01D3, 9),
    (0x01D4, 9), (0x01D5, 9), (0x00BB, 8), (0x0043, 7),
    (0x0000, 4), (0x0004, 5), (0x0011, 6), (0x0012, 6),
    (0x0013, 6), (0x0044, 7), (0x00BC, 8), (0x00BD, 8),
    (0x00BE, 8), (0x01D6, 9), (0x01D7, 9), (0x03EB, 10),
    (0x03EC, 10), (0x03ED, 10), (0x03EE, 10), (0x07F6, 11),
    (0x07F7, 11), (0x07F8, 11), (0x07F9, 11), (0x07FA, 11),
    (0x07FB, 11), (0x0FF8, 12), (0x0FF9, 12), (0x0FFA, 12),
    (0x0FFB, 12), (0x1FFC, 13), (0x0FFC, 12), (0x1FFD, 13),
    (0x0FFD, 12), (0x1FFE, 13), (0x1FFF, 13), (0x00BF, 8),
];

/// Match offset buckets, indexed by `offset >> 7`.
pub const POS: [(u32, u32); 32] = [
    (0x0000, 2), (0x0002, 3), (0x0006, 4), (0x000E, 5),
    (0x000F, 5), (0x0010, 5), (0x0011, 5), (0x0012, 5),
    (0x0013, 5), (0x0014, 5), (0x002A, 6), (0x002B, 6),
    (0x002C, 6), (0x002D, 6), (0x002E, 6), (0x002F, 6),
    (0x0030, 6), (0x0031, 6), (0x0032, 6), (0x0033, 6),
    (0x0034, 6), (0x0035, 6), (0x0036, 6), (0x0037, 6),
    (0x0038, 6), (0x0039, 6), (0x003A, 6), (0x003B, 6),
    (0x003C, 6), (0x003D, 6), (0x003E, 6), (0x003F, 6),
];

// Static Huffman layer over the LZSS token stream.
//
// Literals and match lengths share the `CHARLEN` codebook (symbols 0..=255
// are bytes, 256..=287 length codes). A match is followed by the `POS` code
// for `offset >> 7` and the low seven offset bits sent raw.

use super::error::LzhsError;
use super::huffman_tables::{CHARLEN, POS};
use super::lzss::{FlagGroup, Token, TokenReader, MIN_MATCH};

/// Packs variable-length codes MSB first.
pub struct BitWriter {
    acc: u32,
    nbits: u32,
    out: Vec<u8>,
}

impl BitWriter {
    pub fn new() -> Self {
        BitWriter { acc: 0, nbits: 0, out: Vec::new() }
    }

    /// Appends the low `len` bits of `code`.
    pub fn emit(&mut self, code: u32, len: u32) {
        debug_assert!(len <= 24);
        self.acc = (self.acc << len) | (code & ((1 << len) - 1));
        self.nbits += len;
        while self.nbits >= 8 {
            self.nbits -= 8;
            self.out.push((self.acc >> self.nbits) as u8);
        }
        self.acc &= (1 << self.nbits) - 1;
    }

    /// Left-justifies any partial byte and returns the packed bytes.
    pub fn finish(mut self) -> Vec<u8> {
        if self.nbits > 0 {
            self.out.push((self.acc << (8 - self.nbits)) as u8);
        }
        self.out
    }
}

/// Reads a byte slice one bit at a time, MSB first.
struct BitReader<'a> {
    data: &'a [u8],
    bit: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        BitReader { data, bit: 0 }
    }

    fn position(&self) -> usize {
        self.bit
    }

    fn total(&self) -> usize {
        self.data.len() * 8
    }

    fn read_bit(&mut self) -> Option<u32> {
        let byte = *self.data.get(self.bit >> 3)?;
        let b = (byte >> (7 - (self.bit & 7))) & 1;
        self.bit += 1;
        Some(b as u32)
    }

    fn read_bits(&mut self, n: u32) -> Option<u32> {
        let mut v = 0;
        for _ in 0..n {
            v = (v << 1) | self.read_bit()?;
        }
        Some(v)
    }
}

/// Direct lookup from `(bit length, code)` to symbol.
struct CodeTable {
    max_len: u32,
    symbols: Vec<u16>,
}

impl CodeTable {
    const NONE: u16 = u16::MAX;

    fn new(codebook: &[(u32, u32)]) -> Self {
        let max_len = codebook.iter().map(|&(_, len)| len).max().unwrap_or(0);
        let mut symbols = vec![Self::NONE; ((max_len + 1) as usize) << max_len];
        for (sym, &(code, len)) in codebook.iter().enumerate() {
            symbols[((len as usize) << max_len) | code as usize] = sym as u16;
        }
        CodeTable { max_len, symbols }
    }

    fn get(&self, code: u32, len: u32) -> Option<usize> {
        match self.symbols[((len as usize) << self.max_len) | code as usize] {
            Self::NONE => None,
            sym => Some(sym as usize),
        }
    }
}

enum Read<T> {
    Value(T),
    /// Input ran out; carries the bit position where the symbol started.
    Eof(usize),
}

fn read_symbol(reader: &mut BitReader, table: &CodeTable) -> Result<Read<usize>, LzhsError> {
    let start = reader.position();
    let mut code = 0;
    let mut len = 0;
    loop {
        let Some(bit) = reader.read_bit() else { return Ok(Read::Eof(start)) };
        code = (code << 1) | bit;
        len += 1;
        if let Some(sym) = table.get(code, len) {
            return Ok(Read::Value(sym));
        }
        if len >= table.max_len {
            return Err(LzhsError::InvalidCode { offset: start / 8 });
        }
    }
}

fn padding_or_truncated(start: usize, total: usize) -> Result<(), LzhsError> {
    if total - start < 8 {
        Ok(())
    } else {
        Err(LzhsError::TruncatedStream { offset: start / 8 })
    }
}

/// Re-encodes an LZSS token stream with the fixed codebooks.
pub fn encode(lzss: &[u8]) -> Result<Vec<u8>, LzhsError> {
    let mut writer = BitWriter::new();
    let mut reader = TokenReader::new(lzss);
    loop {
        let offset = reader.position();
        let Some(token) = reader.next() else { break };
        match token? {
            Token::Literal(c) => {
                let (code, len) = CHARLEN[c as usize];
                writer.emit(code, len);
            }
            Token::Match { length, offset: distance } => {
                let symbol = 256 + length - MIN_MATCH;
                if symbol >= CHARLEN.len() {
                    return Err(LzhsError::InvalidToken { offset, reason: "match too long" });
                }
                let (code, len) = CHARLEN[symbol];
                writer.emit(code, len);
                let (code, len) = POS[(distance >> 7) as usize];
                writer.emit(code, len);
                writer.emit((distance & 0x7F) as u32, 7);
            }
        }
    }
    Ok(writer.finish())
}

/// Recovers the LZSS token stream from a Huffman coded payload.
///
/// The last byte is zero padded; a symbol cut short within the final eight
/// bits is that padding. Anything cut short earlier is a truncated stream.
pub fn decode(payload: &[u8]) -> Result<Vec<u8>, LzhsError> {
    let charlen = CodeTable::new(&CHARLEN);
    let pos = CodeTable::new(&POS);

    let mut reader = BitReader::new(payload);
    let mut group = FlagGroup::new();
    let mut out = Vec::with_capacity(payload.len() * 2);

    loop {
        let token_start = reader.position();
        let sym = match read_symbol(&mut reader, &charlen)? {
            Read::Value(sym) => sym,
            Read::Eof(start) => {
                padding_or_truncated(start, reader.total())?;
                break;
            }
        };
        if sym < 256 {
            group.push(Token::Literal(sym as u8), &mut out);
            continue;
        }

        let bucket = match read_symbol(&mut reader, &pos)? {
            Read::Value(b) => b as u16,
            Read::Eof(_) => {
                padding_or_truncated(token_start, reader.total())?;
                break;
            }
        };
        let Some(low) = reader.read_bits(7) else {
            padding_or_truncated(token_start, reader.total())?;
            break;
        };
        let length = sym - 256 + MIN_MATCH;
        group.push(Token::Match { length, offset: (bucket << 7) | low as u16 }, &mut out);
    }
    group.flush(&mut out);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::lzhs::lzss;

    fn prefix_free(book: &[(u32, u32)]) -> bool {
        for (i, &(ca, la)) in book.iter().enumerate() {
            for (j, &(cb, lb)) in book.iter().enumerate() {
                if i != j && la <= lb && (cb >> (lb - la)) == ca {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn codebooks_are_complete_and_prefix_free() {
        assert_eq!(CHARLEN.len(), 288);
        assert_eq!(POS.len(), 32);
        for &(code, len) in CHARLEN.iter().chain(POS.iter()) {
            assert!((1..=13).contains(&len));
            assert!(code < (1 << len));
        }
        assert!(prefix_free(&CHARLEN));
        assert!(prefix_free(&POS));
    }

    #[test]
    fn every_symbol_decodes_back() {
        let charlen = CodeTable::new(&CHARLEN);
        for (sym, &(code, len)) in CHARLEN.iter().enumerate() {
            assert_eq!(charlen.get(code, len), Some(sym));
        }
        let pos = CodeTable::new(&POS);
        for (sym, &(code, len)) in POS.iter().enumerate() {
            assert_eq!(pos.get(code, len), Some(sym));
        }
    }

    #[test]
    fn bit_writer_packs_msb_first() {
        let mut w = BitWriter::new();
        w.emit(0b101, 3);
        w.emit(0b1, 1);
        w.emit(0b0000_1111, 8);
        assert_eq!(w.finish(), vec![0b1011_0000, 0b1111_0000]);
    }

    #[test]
    fn literal_uses_its_code() {
        // byte 0 is 00010, padded with zeros
        let mut group = FlagGroup::new();
        let mut stream = Vec::new();
        group.push(Token::Literal(0), &mut stream);
        group.flush(&mut stream);
        assert_eq!(encode(&stream).unwrap(), vec![0b0001_0000]);
    }

    #[test]
    fn token_stream_survives_the_huffman_layer() {
        let input: Vec<u8> = b"abracadabra, abracadabra! "
            .iter()
            .cycle()
            .take(5000)
            .copied()
            .collect();
        let tokens = lzss::encode(&input);
        let packed = encode(&tokens).unwrap();
        assert!(packed.len() < tokens.len());
        let unpacked = decode(&packed).unwrap();
        assert_eq!(lzss::decode(&unpacked, input.len()).unwrap(), input);
    }

    #[test]
    fn match_with_every_offset_bucket() {
        let mut group = FlagGroup::new();
        let mut stream = Vec::new();
        for bucket in 0..32u16 {
            group.push(Token::Match { length: 3 + bucket as usize, offset: (bucket << 7) | 0x55 }, &mut stream);
        }
        group.flush(&mut stream);
        assert_eq!(decode(&encode(&stream).unwrap()).unwrap(), stream);
    }

    #[test]
    fn cut_match_is_truncated() {
        let mut group = FlagGroup::new();
        let mut stream = Vec::new();
        group.push(Token::Match { length: 3, offset: 0xFFF }, &mut stream);
        group.flush(&mut stream);
        let packed = encode(&stream).unwrap();
        // 4 bit length code, 6 bit offset bucket, 7 raw bits
        assert_eq!(packed.len(), 3);
        assert!(matches!(
            decode(&packed[..1]),
            Err(LzhsError::TruncatedStream { offset: 0 })
        ));
    }
}

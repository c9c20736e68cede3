// LZSS token stream: a flag byte (bit set = literal, read LSB first)
// followed by up to eight tokens. A literal is one byte, a match is
// `[length - 3][offset >> 8][offset & 0xFF]`.

use super::error::LzhsError;
use super::match_tree::MatchFinder;

pub const WINDOW_SIZE: usize = 0x1000;
/// Longest match, and the number of bytes compared per tree node.
pub const LOOKAHEAD: usize = 33;
/// Matches this short are cheaper as literals.
const THRESHOLD: usize = 2;
pub const MIN_MATCH: usize = THRESHOLD + 1;
/// Longest match a decoder has to accept (length code 31).
pub const MAX_MATCH_CODE: u8 = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Literal(u8),
    /// `offset` is the 12-bit distance field; the source byte is
    /// `offset` positions back in the ring buffer, 0 meaning a full window.
    Match { length: usize, offset: u16 },
}

/// Collects up to eight tokens behind their flag byte.
pub struct FlagGroup {
    buf: [u8; 1 + 8 * 3],
    len: usize,
    mask: u8,
}

impl FlagGroup {
    pub fn new() -> Self {
        FlagGroup { buf: [0u8; 25], len: 1, mask: 1 }
    }

    pub fn push(&mut self, token: Token, out: &mut Vec<u8>) {
        match token {
            Token::Literal(c) => {
                self.buf[0] |= self.mask;
                self.buf[self.len] = c;
                self.len += 1;
            }
            Token::Match { length, offset } => {
                self.buf[self.len] = (length - MIN_MATCH) as u8;
                self.buf[self.len + 1] = (offset >> 8) as u8;
                self.buf[self.len + 2] = (offset & 0xFF) as u8;
                self.len += 3;
            }
        }
        self.mask = self.mask.wrapping_shl(1);
        if self.mask == 0 {
            self.flush(out);
        }
    }

    pub fn flush(&mut self, out: &mut Vec<u8>) {
        if self.len > 1 {
            out.extend_from_slice(&self.buf[..self.len]);
        }
        self.buf[0] = 0;
        self.len = 1;
        self.mask = 1;
    }
}

/// Walks a flag-grouped stream token by token.
///
/// The stream may end after any complete token; unused flag bits of the last
/// group are zero, so running out of input where a match would start is the
/// normal end. Running out anywhere else is a truncation.
pub struct TokenReader<'a> {
    data: &'a [u8],
    pos: usize,
    flags: u32,
}

impl<'a> TokenReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        TokenReader { data, pos: 0, flags: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for TokenReader<'a> {
    type Item = Result<Token, LzhsError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.flags >>= 1;
        if (self.flags & 0x100) == 0 {
            let flag = *self.data.get(self.pos)?;
            self.pos += 1;
            self.flags = flag as u32 | 0xFF00;
        }

        let start = self.pos;
        if (self.flags & 1) != 0 {
            match self.data.get(start) {
                Some(&c) => {
                    self.pos += 1;
                    Some(Ok(Token::Literal(c)))
                }
                None => Some(Err(LzhsError::TruncatedStream { offset: start })),
            }
        } else {
            let remaining = self.data.len() - start;
            if remaining == 0 {
                return None;
            }
            if remaining < 3 {
                self.pos = self.data.len();
                return Some(Err(LzhsError::TruncatedStream { offset: start }));
            }
            let code = self.data[start];
            let offset = ((self.data[start + 1] as u16) << 8) | self.data[start + 2] as u16;
            self.pos += 3;
            if code > MAX_MATCH_CODE || offset as usize >= WINDOW_SIZE {
                return Some(Err(LzhsError::InvalidToken {
                    offset: start,
                    reason: "match field out of range",
                }));
            }
            Some(Ok(Token::Match { length: code as usize + MIN_MATCH, offset }))
        }
    }
}

/// Compresses `input` into a flag-grouped token stream.
pub fn encode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() / 2 + 16);
    let mut finder = MatchFinder::new();
    let mut group = FlagGroup::new();
    let mut src = input.iter().copied();

    let mut s = 0usize;
    let mut r = WINDOW_SIZE - LOOKAHEAD;
    let mut len = 0usize;
    while len < LOOKAHEAD {
        match src.next() {
            Some(c) => finder.put(r + len, c),
            None => break,
        }
        len += 1;
    }
    if len == 0 {
        return out;
    }

    let mut literals = 0usize;
    let mut matches = 0usize;
    let mut best = finder.insert(r);
    loop {
        best.length = best.length.min(len);
        let advance = if best.length <= THRESHOLD {
            group.push(Token::Literal(finder.byte(r)), &mut out);
            literals += 1;
            1
        } else {
            group.push(Token::Match { length: best.length, offset: best.distance as u16 }, &mut out);
            matches += 1;
            best.length
        };

        let mut i = 0;
        while i < advance {
            let Some(c) = src.next() else { break };
            finder.delete(s);
            finder.put(s, c);
            s = (s + 1) & (WINDOW_SIZE - 1);
            r = (r + 1) & (WINDOW_SIZE - 1);
            best = finder.insert(r);
            i += 1;
        }
        // input exhausted, drain the lookahead
        while i < advance {
            finder.delete(s);
            s = (s + 1) & (WINDOW_SIZE - 1);
            r = (r + 1) & (WINDOW_SIZE - 1);
            len -= 1;
            if len > 0 {
                best = finder.insert(r);
            }
            i += 1;
        }
        if len == 0 {
            break;
        }
    }
    group.flush(&mut out);

    log::debug!(
        "LZSS: {} literals, {} matches, {} -> {} bytes",
        literals, matches, input.len(), out.len()
    );
    out
}

/// Expands a token stream, stopping after `expected_size` bytes or at the end
/// of input, whichever comes first. Matches are copied one byte at a time so a
/// source range overlapping the destination repeats the pattern.
pub fn decode(data: &[u8], expected_size: usize) -> Result<Vec<u8>, LzhsError> {
    let mut window = [0u8; WINDOW_SIZE];
    let mut win_pos = 0usize;
    let mut dst = Vec::with_capacity(expected_size.min(data.len() * 11));

    for token in TokenReader::new(data) {
        if dst.len() >= expected_size {
            break;
        }
        match token? {
            Token::Literal(c) => {
                dst.push(c);
                window[win_pos] = c;
                win_pos = (win_pos + 1) & (WINDOW_SIZE - 1);
            }
            Token::Match { length, offset } => {
                for _ in 0..length {
                    if dst.len() >= expected_size {
                        break;
                    }
                    let c = window[win_pos.wrapping_sub(offset as usize) & (WINDOW_SIZE - 1)];
                    dst.push(c);
                    window[win_pos] = c;
                    win_pos = (win_pos + 1) & (WINDOW_SIZE - 1);
                }
            }
        }
    }
    Ok(dst)
}

// Binary search tree match finder over the LZSS ring buffer.
//
// Every window position currently in the dictionary is a node in exactly one
// of 256 trees, picked by the byte at that position. Nodes are ordered by the
// `LOOKAHEAD` bytes that follow. All links are indices into one arena so the
// walks are plain loops.

use super::lzss::{LOOKAHEAD, WINDOW_SIZE};

/// Empty link.
const NIL: usize = WINDOW_SIZE;
/// First tree root; the root for byte `c` is `ROOT + c`.
const ROOT: usize = WINDOW_SIZE + 1;
const ARENA_SIZE: usize = WINDOW_SIZE + 1 + 256;

/// Best back-reference found for a position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Candidate {
    pub length: usize,
    /// Backward distance from the inserted position, `1..WINDOW_SIZE`.
    pub distance: usize,
}

pub struct MatchFinder {
    /// Ring buffer plus a mirror of its first `LOOKAHEAD` bytes, so a
    /// comparison never has to wrap.
    window: Vec<u8>,
    left: Vec<usize>,
    right: Vec<usize>,
    parent: Vec<usize>,
}

impl MatchFinder {
    pub fn new() -> Self {
        MatchFinder {
            window: vec![0u8; WINDOW_SIZE + LOOKAHEAD],
            left: vec![NIL; ARENA_SIZE],
            right: vec![NIL; ARENA_SIZE],
            parent: vec![NIL; ARENA_SIZE],
        }
    }

    pub fn byte(&self, pos: usize) -> u8 {
        self.window[pos]
    }

    pub fn put(&mut self, pos: usize, value: u8) {
        self.window[pos] = value;
        if pos < LOOKAHEAD {
            self.window[pos + WINDOW_SIZE] = value;
        }
    }

    /// Number of leading bytes shared by `key` and `node` (the first byte is
    /// implied by the tree), and the sign of the first difference.
    fn compare(&self, key: usize, node: usize) -> (usize, i32) {
        let mut i = 1;
        let mut cmp = 0;
        while i < LOOKAHEAD {
            cmp = self.window[key + i] as i32 - self.window[node + i] as i32;
            if cmp != 0 {
                break;
            }
            i += 1;
        }
        (i, cmp)
    }

    /// Adds position `r` to its tree and returns the longest match against
    /// the positions already there. Among equally long matches the nearest
    /// one wins. A full-length match replaces the older node outright.
    pub fn insert(&mut self, r: usize) -> Candidate {
        let mut best = Candidate::default();
        let mut cmp = 1;
        let mut p = ROOT + self.window[r] as usize;
        self.left[r] = NIL;
        self.right[r] = NIL;

        loop {
            let next = if cmp < 0 { self.left[p] } else { self.right[p] };
            if next == NIL {
                if cmp < 0 {
                    self.left[p] = r;
                } else {
                    self.right[p] = r;
                }
                self.parent[r] = p;
                self.defer_if_better(r, &mut best);
                return best;
            }
            p = next;

            let (length, c) = self.compare(r, p);
            cmp = c;
            if length >= best.length {
                let distance = if r < p { r + WINDOW_SIZE - p } else { r - p };
                if length > best.length || distance < best.distance {
                    best.distance = distance;
                }
                best.length = length;
                if length >= LOOKAHEAD {
                    break;
                }
            }
        }

        self.replace(p, r);
        best
    }

    /// One step of lazy evaluation: if the next position has a strictly
    /// longer match, drop this one so the caller emits a literal instead.
    fn defer_if_better(&self, r: usize, best: &mut Candidate) {
        if best.length >= LOOKAHEAD - 1 {
            return;
        }
        let key = r + 1;
        let mut p = ROOT + self.window[key] as usize;
        let mut cmp = 1;
        let mut longest = 0;
        loop {
            let next = if cmp < 0 { self.left[p] } else { self.right[p] };
            if next == NIL {
                break;
            }
            p = next;
            let (length, c) = self.compare(key, p);
            cmp = c;
            if length > longest {
                longest = length;
                if length >= LOOKAHEAD {
                    break;
                }
            }
        }
        if longest > best.length {
            best.length = 0;
        }
    }

    /// Puts `r` in the place of `p`, which leaves the dictionary.
    fn replace(&mut self, p: usize, r: usize) {
        let (l, rt, d) = (self.left[p], self.right[p], self.parent[p]);
        self.parent[r] = d;
        self.left[r] = l;
        self.right[r] = rt;
        self.parent[l] = r;
        self.parent[rt] = r;
        if self.right[d] == p {
            self.right[d] = r;
        } else {
            self.left[d] = r;
        }
        self.parent[p] = NIL;
    }

    /// Removes position `p` from its tree. Positions that were never inserted
    /// (or already replaced) are ignored.
    pub fn delete(&mut self, p: usize) {
        if self.parent[p] == NIL {
            return;
        }
        let q = if self.right[p] == NIL {
            self.left[p]
        } else if self.left[p] == NIL {
            self.right[p]
        } else {
            // in-order predecessor takes p's place
            let mut q = self.left[p];
            if self.right[q] != NIL {
                while self.right[q] != NIL {
                    q = self.right[q];
                }
                let (qd, ql) = (self.parent[q], self.left[q]);
                self.right[qd] = ql;
                self.parent[ql] = qd;
                self.left[q] = self.left[p];
                self.parent[self.left[p]] = q;
            }
            self.right[q] = self.right[p];
            self.parent[self.right[p]] = q;
            q
        };
        let d = self.parent[p];
        self.parent[q] = d;
        if self.right[d] == p {
            self.right[d] = q;
        } else {
            self.left[d] = q;
        }
        self.parent[p] = NIL;
    }

    #[cfg(test)]
    fn contains(&self, p: usize) -> bool {
        self.parent[p] != NIL
    }

    /// In-order walk of the tree for byte `c`.
    #[cfg(test)]
    fn in_order(&self, c: u8) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        let mut node = self.right[ROOT + c as usize];
        while node != NIL || !stack.is_empty() {
            while node != NIL {
                stack.push(node);
                node = self.left[node];
            }
            if let Some(n) = stack.pop() {
                out.push(n);
                node = self.right[n];
            }
        }
        out
    }
}

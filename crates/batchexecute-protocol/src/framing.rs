//! Length-marked chunk scanning for the compressed (`rt=c`) response format.
//!
//! A compressed response is a sequence of blocks:
//!
//! ```text
//! )]}'                      <- optional prefix, ignored
//!
//! 57                        <- length marker (digits + newline)
//! ["wrb.fr","Abc","[1]",null,null,null,"generic"]
//! 25
//! ["di",42]
//! ```
//!
//! A length marker is a maximal run of ASCII digits followed by a newline.
//! A body runs from the end of its marker to the start of the next marker
//! or the end of input. The declared length is only a boundary hint and is
//! never used to cut the body.

use tracing::trace;

/// One block extracted from a compressed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Length announced by the marker line, if it fits in a `usize`.
    pub declared_len: Option<usize>,
    /// Body text, trimmed of surrounding whitespace.
    pub body: &'a str,
}

/// Position of a length marker within the raw text.
#[derive(Debug, Clone, Copy)]
struct Marker {
    digits_start: usize,
    digits_end: usize,
    body_start: usize,
}

/// Iterates over the chunks of a compressed response.
#[derive(Debug, Clone)]
pub struct CompressedChunks<'a> {
    raw: &'a str,
    pos: usize,
}

impl<'a> CompressedChunks<'a> {
    /// Creates a scanner over the raw response text.
    pub fn new(raw: &'a str) -> Self {
        Self { raw, pos: 0 }
    }

    /// Returns true if the raw text contains at least one length marker.
    pub fn has_marker(&self) -> bool {
        find_marker(self.raw.as_bytes(), 0).is_some()
    }

    /// Returns the text not yet consumed by the scanner.
    pub fn remaining(&self) -> &'a str {
        &self.raw[self.pos..]
    }
}

impl<'a> Iterator for CompressedChunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.raw.as_bytes();
        loop {
            let marker = find_marker(bytes, self.pos)?;
            let body_end = find_marker(bytes, marker.body_start)
                .map(|next| next.digits_start)
                .unwrap_or(bytes.len());
            self.pos = body_end;

            let declared_len = self.raw[marker.digits_start..marker.digits_end]
                .parse::<usize>()
                .ok();
            let body = self.raw[marker.body_start..body_end].trim();
            if body.is_empty() {
                trace!(offset = marker.digits_start, "skipping empty chunk");
                continue;
            }

            if let Some(len) = declared_len {
                if len != body.len() {
                    trace!(declared = len, actual = body.len(), "chunk length hint differs");
                }
            }

            return Some(Chunk { declared_len, body });
        }
    }
}

/// Finds the first length marker starting at or after `from`.
fn find_marker(bytes: &[u8], from: usize) -> Option<Marker> {
    let mut p = from;
    while p < bytes.len() {
        let starts_run = bytes[p].is_ascii_digit() && (p == 0 || !bytes[p - 1].is_ascii_digit());
        if !starts_run {
            p += 1;
            continue;
        }

        let mut q = p;
        while q < bytes.len() && bytes[q].is_ascii_digit() {
            q += 1;
        }

        let body_start = match bytes.get(q..) {
            Some([b'\n', ..]) => Some(q + 1),
            Some([b'\r', b'\n', ..]) => Some(q + 2),
            _ => None,
        };
        if let Some(body_start) = body_start {
            return Some(Marker {
                digits_start: p,
                digits_end: q,
                body_start,
            });
        }
        p = q;
    }
    None
}

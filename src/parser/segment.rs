//! Statement segmentation
//!
//! Splits normalized text into units the statement parser can handle one at a
//! time. A unit is either a single `;`-terminated instruction or, when a `{`
//! appears before the first top-level `;`, a whole brace-matched block. Chained
//! `}elseif(...){...}`, `}else{...}` and `}catch{...}` continuations belong to
//! the same unit as the block they follow. Bare `;` are skipped.
//!
//! All scanning is quote aware, so braces and semicolons inside string
//! literals never split anything.

/// What a segment looks like
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Instruction,
    Block,
}

/// One unit of normalized text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    /// Byte offset of `text` in the full normalized script
    pub offset: usize,
    pub kind: SegmentKind,
}

/// Iterator over the segments of a statement list
pub struct Segmenter<'a> {
    text: &'a str,
    base: usize,
    position: usize,
}

impl<'a> Segmenter<'a> {
    /// Segment `text`, which starts at byte `base` of the normalized script.
    pub fn new(text: &'a str, base: usize) -> Self {
        Segmenter {
            text,
            base,
            position: 0,
        }
    }

    /// Closing brace of a continuation (`elseif`, `else`, `catch`) starting at `from`.
    fn continuation(&self, from: usize) -> Option<usize> {
        let bytes = self.text.as_bytes();
        let mut start = from;
        while start < bytes.len() && bytes[start] == b';' {
            start += 1;
        }
        let rest = &self.text[start..];
        let open = if rest.starts_with("elseif(") {
            find_unquoted(self.text, start, b'{')?
        } else if rest.starts_with("else{") {
            start + "else".len()
        } else if rest.starts_with("catch{") {
            start + "catch".len()
        } else {
            return None;
        };
        matching_close(self.text, open)
    }
}

impl<'a> Iterator for Segmenter<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Segment<'a>> {
        let bytes = self.text.as_bytes();
        while self.position < bytes.len() && bytes[self.position] == b';' {
            self.position += 1;
        }
        if self.position >= bytes.len() {
            return None;
        }

        let start = self.position;
        let segment = match find_boundary(self.text, start) {
            Some((open, b'{')) => {
                let mut end = matching_close(self.text, open).unwrap_or(bytes.len() - 1);
                while let Some(next_end) = self.continuation(end + 1) {
                    end = next_end;
                }
                self.position = end + 1;
                Segment {
                    text: &self.text[start..=end],
                    offset: self.base + start,
                    kind: SegmentKind::Block,
                }
            }
            Some((semicolon, _)) => {
                self.position = semicolon + 1;
                Segment {
                    text: &self.text[start..semicolon],
                    offset: self.base + start,
                    kind: SegmentKind::Instruction,
                }
            }
            None => {
                self.position = bytes.len();
                Segment {
                    text: &self.text[start..],
                    offset: self.base + start,
                    kind: SegmentKind::Instruction,
                }
            }
        };
        Some(segment)
    }
}

/// First `{` or top-level `;` at or after `from`, outside quotes.
fn find_boundary(text: &str, from: usize) -> Option<(usize, u8)> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut escaped = false;
    for (i, &b) in text.as_bytes().iter().enumerate().skip(from) {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'\'' | b'"' => quote = Some(b),
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b'{' => return Some((i, b)),
            b';' if depth == 0 => return Some((i, b)),
            _ => {}
        }
    }
    None
}

/// Index of the first `target` byte at or after `from`, outside quotes.
pub fn find_unquoted(text: &str, from: usize, target: u8) -> Option<usize> {
    let mut quote: Option<u8> = None;
    let mut escaped = false;
    for (i, &b) in text.as_bytes().iter().enumerate().skip(from) {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                quote = None;
            }
            continue;
        }
        if b == target {
            return Some(i);
        }
        if b == b'\'' || b == b'"' {
            quote = Some(b);
        }
    }
    None
}

/// Index of the delimiter closing the `(`, `[` or `{` at `open`.
pub fn matching_close(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let opener = *bytes.get(open)?;
    let closer = match opener {
        b'(' => b')',
        b'[' => b']',
        b'{' => b'}',
        _ => return None,
    };
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                quote = None;
            }
            continue;
        }
        if b == b'\'' || b == b'"' {
            quote = Some(b);
        } else if b == opener {
            depth += 1;
        } else if b == closer {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

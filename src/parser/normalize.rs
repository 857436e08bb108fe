//! Lexical normalization
//!
//! Turns raw script text into a flat, `;`-terminated statement stream:
//!
//! - newlines become `;`, except inside parentheses and brackets
//! - tabs and spaces are dropped, except for a single space separating two
//!   word characters (`return x`, `del x`, `make x`, `def f`, `new C`)
//! - `# ...` comments are removed up to (not including) their terminating `;`
//!   or newline
//! - text between matching `'` or `"` quotes is copied verbatim, backslash
//!   escapes included
//!
//! Quotes, braces, brackets and parentheses must balance; anything else is a
//! [`ErrorKind::Syntax`](crate::interpreter::errors::ErrorKind::Syntax) failure
//! reported at the line of the offending character.
//!
//! The output keeps a byte-offset → source-line table so that statements
//! segmented out of the normalized text can still report where they came from.

use crate::interpreter::errors::ScriptError;

/// Normalized script text plus its line table
#[derive(Debug, Clone)]
pub struct Normalized {
    text: String,
    /// Source line (1-based) of every byte in `text`
    lines: Vec<usize>,
}

impl Normalized {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Source line of the byte at `offset`.
    pub fn line_at(&self, offset: usize) -> usize {
        self.lines
            .get(offset)
            .or_else(|| self.lines.last())
            .copied()
            .unwrap_or(1)
    }

    fn push(&mut self, ch: char, line: usize) {
        self.text.push(ch);
        for _ in 0..ch.len_utf8() {
            self.lines.push(line);
        }
    }

    fn last_char(&self) -> Option<char> {
        self.text.chars().next_back()
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn closer_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// Normalize `source` into a statement stream.
pub fn normalize(source: &str) -> Result<Normalized, ScriptError> {
    let mut out = Normalized {
        text: String::with_capacity(source.len()),
        lines: Vec::with_capacity(source.len()),
    };
    // Open delimiters with the line they were opened on
    let mut open: Vec<(char, usize)> = Vec::new();
    let mut line = 1;
    let mut pending_space = false;
    let mut chars = source.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\n' => {
                // Inside parentheses or brackets a line break is just whitespace
                if matches!(open.last(), Some(('(', _)) | Some(('[', _))) {
                    pending_space = true;
                } else {
                    out.push(';', line);
                    pending_space = false;
                }
                line += 1;
            }
            '\r' => {}
            ' ' | '\t' => pending_space = true,
            '#' => {
                while let Some(&next) = chars.peek() {
                    if next == ';' || next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '\'' | '"' => {
                let quote_line = line;
                out.push(ch, line);
                let mut escaped = false;
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == '\n' {
                        break;
                    }
                    out.push(inner, line);
                    if escaped {
                        escaped = false;
                    } else if inner == '\\' {
                        escaped = true;
                    } else if inner == ch {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(ScriptError::syntax(
                        format!("unterminated {} quote", ch),
                        quote_line,
                    ));
                }
                pending_space = false;
            }
            _ => {
                match ch {
                    '(' | '[' | '{' => open.push((ch, line)),
                    ')' | ']' | '}' => match open.pop() {
                        Some((opener, _)) if closer_for(opener) == ch => {}
                        Some((opener, opened_at)) => {
                            return Err(ScriptError::syntax(
                                format!(
                                    "'{}' closes '{}' opened at line {}",
                                    ch, opener, opened_at
                                ),
                                line,
                            ));
                        }
                        None => {
                            return Err(ScriptError::syntax(
                                format!("unmatched '{}'", ch),
                                line,
                            ));
                        }
                    },
                    _ => {}
                }
                if pending_space
                    && is_word_char(ch)
                    && out.last_char().is_some_and(is_word_char)
                {
                    out.push(' ', line);
                }
                pending_space = false;
                out.push(ch, line);
            }
        }
    }

    if let Some((opener, opened_at)) = open.pop() {
        return Err(ScriptError::syntax(
            format!("unclosed '{}'", opener),
            opened_at,
        ));
    }

    Ok(out)
}

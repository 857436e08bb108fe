//! Tokenizer for a single statement, header or expression
//!
//! Works on normalized text, so the only whitespace left is the single space
//! separating two words. Block keywords (`if`, `while`, `def`, ...) come out as
//! plain identifiers; only the words that change how an instruction or value
//! is read get their own tokens.

use std::fmt;

/// All token variants produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(f64),
    Str(String),

    Ident(String),

    // Keywords
    True,
    False,
    Null,
    New,
    Return,
    Del,
    Make,

    // Arithmetic
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %

    // Comparison
    EqEq,  // ==
    NotEq, // !=
    Lt,    // <
    Le,    // <=
    Gt,    // >
    Ge,    // >=

    // Logical
    AndAnd, // &&
    OrOr,   // ||
    Bang,   // !

    // Assignment
    Eq,        // =
    PlusEq,    // +=
    MinusEq,   // -=
    StarEq,    // *=
    SlashEq,   // /=
    PercentEq, // %=

    PlusPlus,   // ++
    MinusMinus, // --

    // Punctuation
    Dot,       // .
    Comma,     // ,
    LParen,    // (
    RParen,    // )
    LBracket,  // [
    RBracket,  // ]
    LBrace,    // {
    RBrace,    // }
    Semicolon, // ;
}

impl Token {
    /// `=` and the compound assignment operators
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            Token::Eq
                | Token::PlusEq
                | Token::MinusEq
                | Token::StarEq
                | Token::SlashEq
                | Token::PercentEq
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Str(s) => write!(f, "\"{}\"", s),
            Token::Ident(s) => f.write_str(s),
            Token::True => f.write_str("true"),
            Token::False => f.write_str("false"),
            Token::Null => f.write_str("null"),
            Token::New => f.write_str("new "),
            Token::Return => f.write_str("return "),
            Token::Del => f.write_str("del "),
            Token::Make => f.write_str("make "),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::Percent => f.write_str("%"),
            Token::EqEq => f.write_str("=="),
            Token::NotEq => f.write_str("!="),
            Token::Lt => f.write_str("<"),
            Token::Le => f.write_str("<="),
            Token::Gt => f.write_str(">"),
            Token::Ge => f.write_str(">="),
            Token::AndAnd => f.write_str("&&"),
            Token::OrOr => f.write_str("||"),
            Token::Bang => f.write_str("!"),
            Token::Eq => f.write_str("="),
            Token::PlusEq => f.write_str("+="),
            Token::MinusEq => f.write_str("-="),
            Token::StarEq => f.write_str("*="),
            Token::SlashEq => f.write_str("/="),
            Token::PercentEq => f.write_str("%="),
            Token::PlusPlus => f.write_str("++"),
            Token::MinusMinus => f.write_str("--"),
            Token::Dot => f.write_str("."),
            Token::Comma => f.write_str(","),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::LBracket => f.write_str("["),
            Token::RBracket => f.write_str("]"),
            Token::LBrace => f.write_str("{"),
            Token::RBrace => f.write_str("}"),
            Token::Semicolon => f.write_str(";"),
        }
    }
}

/// Render tokens back into (approximately) the text they came from.
pub fn render(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.to_string()).collect::<String>().trim_end().to_string()
}

/// Lexer error
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub message: String,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for LexError {}

/// Tokenizer over one piece of normalized text
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while let Some(ch) = self.advance() {
            if ch.is_whitespace() {
                continue;
            }
            tokens.push(self.next_token(ch)?);
        }
        Ok(tokens)
    }

    fn next_token(&mut self, ch: char) -> Result<Token, LexError> {
        let token = match ch {
            '"' | '\'' => self.string_literal(ch)?,
            '0'..='9' => self.number_literal(ch)?,
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.number_literal(ch)?,
            c if c.is_alphabetic() || c == '_' => self.identifier_or_keyword(c),

            '+' => self.with_follow(&[('+', Token::PlusPlus), ('=', Token::PlusEq)], Token::Plus),
            '-' => self.with_follow(
                &[('-', Token::MinusMinus), ('=', Token::MinusEq)],
                Token::Minus,
            ),
            '*' => self.with_follow(&[('=', Token::StarEq)], Token::Star),
            '/' => self.with_follow(&[('=', Token::SlashEq)], Token::Slash),
            '%' => self.with_follow(&[('=', Token::PercentEq)], Token::Percent),
            '=' => self.with_follow(&[('=', Token::EqEq)], Token::Eq),
            '!' => self.with_follow(&[('=', Token::NotEq)], Token::Bang),
            '<' => self.with_follow(&[('=', Token::Le)], Token::Lt),
            '>' => self.with_follow(&[('=', Token::Ge)], Token::Gt),
            '&' if self.peek() == Some('&') => {
                self.advance();
                Token::AndAnd
            }
            '|' if self.peek() == Some('|') => {
                self.advance();
                Token::OrOr
            }

            '.' => Token::Dot,
            ',' => Token::Comma,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            ';' => Token::Semicolon,

            _ => {
                return Err(LexError {
                    message: format!("unexpected character '{}'", ch),
                })
            }
        };
        Ok(token)
    }

    /// Pick a two-character token when the next char matches, else `single`.
    fn with_follow(&mut self, follows: &[(char, Token)], single: Token) -> Token {
        for (next, token) in follows {
            if self.peek() == Some(*next) {
                self.advance();
                return token.clone();
            }
        }
        single
    }

    fn string_literal(&mut self, quote: char) -> Result<Token, LexError> {
        let mut string = String::new();
        while let Some(ch) = self.advance() {
            if ch == quote {
                return Ok(Token::Str(string));
            }
            if ch == '\\' {
                let escaped = self.advance().ok_or_else(|| LexError {
                    message: "unterminated escape in string literal".to_string(),
                })?;
                string.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    other => other,
                });
            } else {
                string.push(ch);
            }
        }
        Err(LexError {
            message: "unterminated string literal".to_string(),
        })
    }

    fn number_literal(&mut self, first: char) -> Result<Token, LexError> {
        let mut literal = String::from(first);
        let mut seen_dot = first == '.';
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                literal.push(ch);
            } else if ch == '.'
                && !seen_dot
                && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit())
            {
                seen_dot = true;
                literal.push(ch);
            } else {
                break;
            }
            self.advance();
        }
        literal.parse::<f64>().map(Token::Number).map_err(|_| LexError {
            message: format!("invalid number '{}'", literal),
        })
    }

    fn identifier_or_keyword(&mut self, first: char) -> Token {
        let mut ident = String::from(first);
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        match ident.as_str() {
            "true" => Token::True,
            "false" => Token::False,
            "null" => Token::Null,
            "new" => Token::New,
            "return" => Token::Return,
            "del" => Token::Del,
            "make" => Token::Make,
            _ => Token::Ident(ident),
        }
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied();
        if ch.is_some() {
            self.position += 1;
        }
        ch
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }
}

/// Tokenize `text` in one call.
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(text).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_tokens() {
        let tokens = tokenize("speed=drive(1,2.5)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("speed".to_string()),
                Token::Eq,
                Token::Ident("drive".to_string()),
                Token::LParen,
                Token::Number(1.0),
                Token::Comma,
                Token::Number(2.5),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_operators() {
        let tokens = tokenize("++ -- += -= == != && || <= >= ! %=").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::PlusPlus,
                Token::MinusMinus,
                Token::PlusEq,
                Token::MinusEq,
                Token::EqEq,
                Token::NotEq,
                Token::AndAnd,
                Token::OrOr,
                Token::Le,
                Token::Ge,
                Token::Bang,
                Token::PercentEq,
            ]
        );
    }

    #[test]
    fn test_keywords() {
        let tokens = tokenize("return new Arm(true)").unwrap();
        assert_eq!(tokens[0], Token::Return);
        assert_eq!(tokens[1], Token::New);
        assert_eq!(tokens[2], Token::Ident("Arm".to_string()));
        assert_eq!(tokens[4], Token::True);
    }

    #[test]
    fn test_string_literals() {
        let tokens = tokenize(r#"'it\'s' "a\nb""#).unwrap();
        assert_eq!(tokens[0], Token::Str("it's".to_string()));
        assert_eq!(tokens[1], Token::Str("a\nb".to_string()));
    }

    #[test]
    fn test_member_access_is_not_a_number() {
        let tokens = tokenize("arm.lift").unwrap();
        assert_eq!(tokens[1], Token::Dot);
    }

    #[test]
    fn test_unexpected_character() {
        assert!(tokenize("a @ b").is_err());
        assert!(tokenize("a & b").is_err());
    }
}

//! Statement parsing
//!
//! Instructions (one `;`-terminated segment) are recognised in this order:
//!
//! - `return [expr]`, `del place`, `make name`
//! - `place = expr` and compound `place op= expr`
//! - `place++` / `place--`
//! - `name(args)` / `object.name(args)` calls
//!
//! Anything else is not an instruction. Blocks are recognised by the word
//! before the first `(` or `{`: `if`, `while`, `for`, `count`, `try`,
//! `thread`, `def`, `class`.

use crate::interpreter::errors::{ErrorKind, ScriptError};
use crate::parser::ast::*;
use crate::parser::expressions::{matching, parse_expression, split_commas};
use crate::parser::lexer::{render, tokenize, Token};
use crate::parser::parse::Parser;
use crate::parser::segment::{find_unquoted, matching_close};

fn illegal_name(tokens: &[Token]) -> ScriptError {
    ErrorKind::IllegalName {
        name: render(tokens),
    }
    .into()
}

fn compound_op(token: &Token) -> Option<BinOp> {
    match token {
        Token::PlusEq => Some(BinOp::Add),
        Token::MinusEq => Some(BinOp::Sub),
        Token::StarEq => Some(BinOp::Mul),
        Token::SlashEq => Some(BinOp::Div),
        Token::PercentEq => Some(BinOp::Mod),
        _ => None,
    }
}

/// Index of the first assignment operator outside parentheses and brackets.
fn top_level_assignment(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate() {
        match token {
            Token::LParen | Token::LBracket => depth += 1,
            Token::RParen | Token::RBracket => depth = depth.saturating_sub(1),
            _ if depth == 0 && token.is_assignment() => return Some(index),
            _ => {}
        }
    }
    None
}

/// An assignable place: a bare name or a member access.
fn parse_place(tokens: &[Token]) -> Result<Place, ScriptError> {
    if let [Token::Ident(name)] = tokens {
        return Ok(Place::Name(name.clone()));
    }
    match parse_expression(tokens) {
        Ok(Expr::Member { object, name }) => Ok(Place::Member {
            object: *object,
            name,
        }),
        _ => Err(illegal_name(tokens)),
    }
}

/// Contents of `keyword(...)` when the header is exactly that.
fn parenthesized(header: &[Token]) -> Option<&[Token]> {
    if header.len() < 3 || header[1] != Token::LParen {
        return None;
    }
    let close = matching(header, 1)?;
    (close == header.len() - 1).then(|| &header[2..close])
}

/// The single name in `tokens`, or an illegal-name failure.
fn single_name(tokens: &[Token]) -> Result<String, ScriptError> {
    match tokens {
        [Token::Ident(name)] => Ok(name.clone()),
        _ => Err(illegal_name(tokens)),
    }
}

fn skip_terminators(text: &str, mut cursor: usize) -> usize {
    while text.as_bytes().get(cursor) == Some(&b';') {
        cursor += 1;
    }
    cursor
}

impl Parser {
    pub(crate) fn parse_instruction(&self, text: &str) -> Result<StmtKind, ScriptError> {
        let not_an_instruction = || ScriptError::not_an_instruction(text);
        let tokens = tokenize(text).map_err(|_| not_an_instruction())?;

        match tokens.first() {
            None => return Err(not_an_instruction()),
            Some(Token::Return) => {
                let rest = &tokens[1..];
                let value = if rest.is_empty() {
                    None
                } else {
                    Some(parse_expression(rest)?)
                };
                return Ok(StmtKind::Return(value));
            }
            Some(Token::Del) => return Ok(StmtKind::Delete(parse_place(&tokens[1..])?)),
            Some(Token::Make) => return Ok(StmtKind::Make(single_name(&tokens[1..])?)),
            _ => {}
        }

        if let Some(index) = top_level_assignment(&tokens) {
            let place = parse_place(&tokens[..index])?;
            let value = parse_expression(&tokens[index + 1..])?;
            return Ok(match compound_op(&tokens[index]) {
                Some(op) => StmtKind::Compound { place, op, value },
                None => StmtKind::Assign { place, value },
            });
        }

        let delta = match tokens.last() {
            Some(Token::PlusPlus) => Some(1.0),
            Some(Token::MinusMinus) => Some(-1.0),
            _ => None,
        };
        if let Some(delta) = delta {
            let place = parse_place(&tokens[..tokens.len() - 1])?;
            return Ok(StmtKind::Step { place, delta });
        }

        match parse_expression(&tokens) {
            Ok(Expr::Call { name, args }) => Ok(StmtKind::Call {
                callee: Callee::Name(name),
                args,
            }),
            Ok(Expr::MethodCall { object, name, args }) => Ok(StmtKind::Call {
                callee: Callee::Method {
                    object: *object,
                    name,
                },
                args,
            }),
            _ => Err(not_an_instruction()),
        }
    }

    /// Parse a block segment starting at byte `offset` of the normalized text.
    pub(crate) fn parse_compound(&self, text: &str, offset: usize) -> Result<StmtKind, ScriptError> {
        let not_an_instruction = || ScriptError::not_an_instruction(text);
        let open = find_unquoted(text, 0, b'{').ok_or_else(not_an_instruction)?;
        let close = matching_close(text, open).ok_or_else(not_an_instruction)?;
        let header = tokenize(&text[..open]).map_err(|_| not_an_instruction())?;
        let body = self.parse_block(offset + open + 1, offset + close);
        let after = skip_terminators(text, close + 1);

        let keyword = match header.first() {
            Some(Token::Ident(keyword)) => keyword.as_str(),
            _ => return Err(not_an_instruction()),
        };

        if keyword == "if" {
            let condition = parse_expression(parenthesized(&header).ok_or_else(not_an_instruction)?)?;
            let mut branches = vec![Branch {
                condition: Some(condition),
                body,
            }];
            self.parse_else_chain(text, offset, after, &mut branches)?;
            return Ok(StmtKind::If { branches });
        }

        if keyword == "try" {
            if header.len() != 1 {
                return Err(not_an_instruction());
            }
            let handler = if after < text.len() {
                if !text[after..].starts_with("catch{") {
                    return Err(not_an_instruction());
                }
                let open = after + "catch".len();
                let close = matching_close(text, open).ok_or_else(not_an_instruction)?;
                if skip_terminators(text, close + 1) < text.len() {
                    return Err(not_an_instruction());
                }
                Some(self.parse_block(offset + open + 1, offset + close))
            } else {
                None
            };
            return Ok(StmtKind::Try { body, handler });
        }

        // Every other block is a single unit with nothing after its body
        if after < text.len() {
            return Err(not_an_instruction());
        }

        match keyword {
            "while" => {
                let condition =
                    parse_expression(parenthesized(&header).ok_or_else(not_an_instruction)?)?;
                Ok(StmtKind::While { condition, body })
            }
            "for" => {
                let count = parse_expression(parenthesized(&header).ok_or_else(not_an_instruction)?)?;
                Ok(StmtKind::For { count, body })
            }
            "count" => {
                let inner = parenthesized(&header).ok_or_else(not_an_instruction)?;
                let pieces = split_commas(inner);
                let [name, from, to] = pieces.as_slice() else {
                    return Err(not_an_instruction());
                };
                Ok(StmtKind::Count {
                    name: single_name(name)?,
                    from: parse_expression(from)?,
                    to: parse_expression(to)?,
                    body,
                })
            }
            "thread" if header.len() == 1 => Ok(StmtKind::Thread { body }),
            "def" => {
                let paren = header
                    .iter()
                    .position(|t| *t == Token::LParen)
                    .ok_or_else(not_an_instruction)?;
                let name = single_name(&header[1..paren])?;
                let inner = parenthesized(&header[paren - 1..]).ok_or_else(not_an_instruction)?;
                let params = if inner.is_empty() {
                    Vec::new()
                } else {
                    split_commas(inner)
                        .into_iter()
                        .map(single_name)
                        .collect::<Result<Vec<_>, _>>()?
                };
                Ok(StmtKind::Def { name, params, body })
            }
            "class" => {
                let paren = header.iter().position(|t| *t == Token::LParen);
                let name = single_name(&header[1..paren.unwrap_or(header.len())])?;
                let parent = match paren {
                    None => None,
                    Some(paren) => {
                        let inner = parenthesized(&header[paren - 1..])
                            .ok_or_else(not_an_instruction)?;
                        Some(parse_expression(inner)?)
                    }
                };
                Ok(StmtKind::Class { name, parent, body })
            }
            _ => Err(not_an_instruction()),
        }
    }

    /// Parse `elseif(...){...}` and `else{...}` arms following an `if` body.
    fn parse_else_chain(
        &self,
        text: &str,
        offset: usize,
        mut cursor: usize,
        branches: &mut Vec<Branch>,
    ) -> Result<(), ScriptError> {
        let not_an_instruction = || ScriptError::not_an_instruction(text);
        while cursor < text.len() {
            let rest = &text[cursor..];
            let (condition, open) = if rest.starts_with("elseif(") {
                let open = find_unquoted(text, cursor, b'{').ok_or_else(not_an_instruction)?;
                let header = tokenize(&text[cursor..open]).map_err(|_| not_an_instruction())?;
                let condition =
                    parse_expression(parenthesized(&header).ok_or_else(not_an_instruction)?)?;
                (Some(condition), open)
            } else if rest.starts_with("else{") {
                (None, cursor + "else".len())
            } else {
                return Err(not_an_instruction());
            };
            let close = matching_close(text, open).ok_or_else(not_an_instruction)?;
            branches.push(Branch {
                condition,
                body: self.parse_block(offset + open + 1, offset + close),
            });
            cursor = skip_terminators(text, close + 1);
        }
        Ok(())
    }
}

//! Expression parsing
//!
//! Builds an [`Expr`] tree from the tokens of one expression. Rather than a
//! grammar with fixed precedence levels, the parser applies a fixed
//! recognition order and splits the token slice at a top-level operator (one
//! not nested in parentheses or brackets):
//!
//! 1. `&&`, then `||`, split at the first occurrence
//! 2. `>=`, `<=`, `>`, `<`, `==`, `!=` in that order, split at the first
//!    occurrence of the first one present
//! 3. string concatenation: a `+` chain with a top-level string literal is
//!    split at its first `+`
//! 4. additive/multiplicative: with only one family present, split at its
//!    last occurrence (left associative). With both present, take the last
//!    occurrence of each and split at whichever is further left, so that the
//!    rightmost one is applied first. `2+3*4` is `2+(3*4)` and `10-4-3` is
//!    `(10-4)-3`, but `2*3+4` is `2*(3+4)`.
//! 5. prefix `-`, `+`, `!` on a complete operand
//! 6. postfix chains (`a.b`, `a.b(args)`, `a[i]`) over a primary: literal,
//!    variable, call, `new Class(args)`, list or parenthesised expression
//!
//! A `+` or `-` at the start of a slice, or after another operator, comma or
//! opening delimiter, is a prefix operator and never a split point.

use crate::interpreter::errors::ScriptError;
use crate::interpreter::stack::ensure_sufficient_stack;
use crate::parser::ast::{BinOp, Expr, UnOp};
use crate::parser::lexer::{render, Token};

/// Logical and relational operators, in recognition order.
const SPLIT_FIRST: [BinOp; 8] = [
    BinOp::And,
    BinOp::Or,
    BinOp::Ge,
    BinOp::Le,
    BinOp::Gt,
    BinOp::Lt,
    BinOp::Eq,
    BinOp::Ne,
];

/// Parse the tokens of one complete expression.
pub fn parse_expression(tokens: &[Token]) -> Result<Expr, ScriptError> {
    ensure_sufficient_stack(|| split_expression(tokens))
}

fn split_expression(tokens: &[Token]) -> Result<Expr, ScriptError> {
    if tokens.is_empty() {
        return Err(ScriptError::not_a_value(""));
    }
    let operators = top_level_operators(tokens);

    for op in SPLIT_FIRST {
        if let Some(&(index, _)) = operators.iter().find(|(_, found)| *found == op) {
            return split(tokens, index, op);
        }
    }

    if has_top_level_string(tokens) {
        if let Some(&(index, _)) = operators.iter().find(|(_, op)| *op == BinOp::Add) {
            return split(tokens, index, BinOp::Concat);
        }
    }

    let last_additive = operators.iter().rev().find(|(_, op)| op.is_additive());
    let last_multiplicative = operators.iter().rev().find(|(_, op)| op.is_multiplicative());
    let pivot = match (last_additive, last_multiplicative) {
        (Some(additive), Some(multiplicative)) => Some(if additive.0 < multiplicative.0 {
            *additive
        } else {
            *multiplicative
        }),
        (Some(only), None) | (None, Some(only)) => Some(*only),
        (None, None) => None,
    };
    if let Some((index, op)) = pivot {
        return split(tokens, index, op);
    }

    parse_unary(tokens)
}

fn split(tokens: &[Token], index: usize, op: BinOp) -> Result<Expr, ScriptError> {
    let (left, right) = (&tokens[..index], &tokens[index + 1..]);
    if left.is_empty() || right.is_empty() {
        return Err(ScriptError::not_a_value(render(tokens)));
    }
    Ok(Expr::Binary {
        op,
        left: Box::new(parse_expression(left)?),
        right: Box::new(parse_expression(right)?),
    })
}

fn binary_op(token: &Token) -> Option<BinOp> {
    let op = match token {
        Token::AndAnd => BinOp::And,
        Token::OrOr => BinOp::Or,
        Token::Ge => BinOp::Ge,
        Token::Le => BinOp::Le,
        Token::Gt => BinOp::Gt,
        Token::Lt => BinOp::Lt,
        Token::EqEq => BinOp::Eq,
        Token::NotEq => BinOp::Ne,
        Token::Plus => BinOp::Add,
        Token::Minus => BinOp::Sub,
        Token::Star => BinOp::Mul,
        Token::Slash => BinOp::Div,
        Token::Percent => BinOp::Mod,
        _ => return None,
    };
    Some(op)
}

fn is_prefix_position(tokens: &[Token], index: usize) -> bool {
    match index.checked_sub(1).map(|prev| &tokens[prev]) {
        None => true,
        Some(prev) => {
            binary_op(prev).is_some()
                || matches!(
                    prev,
                    Token::Bang | Token::LParen | Token::LBracket | Token::Comma
                )
        }
    }
}

/// Binary operators outside parentheses and brackets, with their indices.
fn top_level_operators(tokens: &[Token]) -> Vec<(usize, BinOp)> {
    let mut found = Vec::new();
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate() {
        match token {
            Token::LParen | Token::LBracket => depth += 1,
            Token::RParen | Token::RBracket => depth = depth.saturating_sub(1),
            _ if depth == 0 => {
                if let Some(op) = binary_op(token) {
                    let prefix = matches!(token, Token::Plus | Token::Minus)
                        && is_prefix_position(tokens, index);
                    if !prefix {
                        found.push((index, op));
                    }
                }
            }
            _ => {}
        }
    }
    found
}

fn has_top_level_string(tokens: &[Token]) -> bool {
    let mut depth = 0usize;
    for token in tokens {
        match token {
            Token::LParen | Token::LBracket => depth += 1,
            Token::RParen | Token::RBracket => depth = depth.saturating_sub(1),
            Token::Str(_) if depth == 0 => return true,
            _ => {}
        }
    }
    false
}

fn parse_unary(tokens: &[Token]) -> Result<Expr, ScriptError> {
    let op = match tokens.first() {
        Some(Token::Minus) => UnOp::Neg,
        Some(Token::Plus) => UnOp::Plus,
        Some(Token::Bang) => UnOp::Not,
        _ => return parse_postfix(tokens),
    };
    let operand = &tokens[1..];
    if operand.is_empty() {
        return Err(ScriptError::not_a_value(render(tokens)));
    }
    Ok(Expr::Unary {
        op,
        operand: Box::new(parse_unary(operand)?),
    })
}

fn parse_postfix(tokens: &[Token]) -> Result<Expr, ScriptError> {
    let not_a_value = || ScriptError::not_a_value(render(tokens));
    let (mut expr, mut position) = parse_primary(tokens)?;

    while position < tokens.len() {
        match &tokens[position] {
            Token::Dot => {
                let name = match tokens.get(position + 1) {
                    Some(Token::Ident(name)) => name.clone(),
                    _ => return Err(not_a_value()),
                };
                if tokens.get(position + 2) == Some(&Token::LParen) {
                    let close = matching(tokens, position + 2).ok_or_else(not_a_value)?;
                    let args = parse_arguments(&tokens[position + 3..close])?;
                    expr = Expr::MethodCall {
                        object: Box::new(expr),
                        name,
                        args,
                    };
                    position = close + 1;
                } else {
                    expr = Expr::Member {
                        object: Box::new(expr),
                        name,
                    };
                    position += 2;
                }
            }
            Token::LBracket => {
                let close = matching(tokens, position).ok_or_else(not_a_value)?;
                let index = parse_expression(&tokens[position + 1..close])?;
                expr = Expr::Index {
                    target: Box::new(expr),
                    index: Box::new(index),
                };
                position = close + 1;
            }
            _ => return Err(not_a_value()),
        }
    }
    Ok(expr)
}

/// Parse the leading primary of `tokens`, returning it and the tokens consumed.
fn parse_primary(tokens: &[Token]) -> Result<(Expr, usize), ScriptError> {
    let not_a_value = || ScriptError::not_a_value(render(tokens));
    let primary = match &tokens[0] {
        Token::Number(n) => (Expr::Number(*n), 1),
        Token::Str(s) => (Expr::Str(s.clone()), 1),
        Token::True => (Expr::Bool(true), 1),
        Token::False => (Expr::Bool(false), 1),
        Token::Null => (Expr::Null, 1),
        Token::New => {
            let class = match tokens.get(1) {
                Some(Token::Ident(class)) => class.clone(),
                _ => return Err(not_a_value()),
            };
            if tokens.get(2) != Some(&Token::LParen) {
                return Err(not_a_value());
            }
            let close = matching(tokens, 2).ok_or_else(not_a_value)?;
            let args = parse_arguments(&tokens[3..close])?;
            (Expr::New { class, args }, close + 1)
        }
        Token::Ident(name) => {
            if tokens.get(1) == Some(&Token::LParen) {
                let close = matching(tokens, 1).ok_or_else(not_a_value)?;
                let args = parse_arguments(&tokens[2..close])?;
                (
                    Expr::Call {
                        name: name.clone(),
                        args,
                    },
                    close + 1,
                )
            } else {
                (Expr::Variable(name.clone()), 1)
            }
        }
        Token::LParen => {
            let close = matching(tokens, 0).ok_or_else(not_a_value)?;
            (parse_expression(&tokens[1..close])?, close + 1)
        }
        Token::LBracket => {
            let close = matching(tokens, 0).ok_or_else(not_a_value)?;
            (Expr::List(parse_arguments(&tokens[1..close])?), close + 1)
        }
        _ => return Err(not_a_value()),
    };
    Ok(primary)
}

/// Index of the token closing the `(` or `[` at `open`.
pub(crate) fn matching(tokens: &[Token], open: usize) -> Option<usize> {
    let (opener, closer) = match tokens.get(open)? {
        Token::LParen => (Token::LParen, Token::RParen),
        Token::LBracket => (Token::LBracket, Token::RBracket),
        Token::LBrace => (Token::LBrace, Token::RBrace),
        _ => return None,
    };
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        if *token == opener {
            depth += 1;
        } else if *token == closer {
            depth -= 1;
            if depth == 0 {
                return Some(index);
            }
        }
    }
    None
}

/// Split `tokens` on commas outside parentheses and brackets.
pub(crate) fn split_commas(tokens: &[Token]) -> Vec<&[Token]> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, token) in tokens.iter().enumerate() {
        match token {
            Token::LParen | Token::LBracket => depth += 1,
            Token::RParen | Token::RBracket => depth = depth.saturating_sub(1),
            Token::Comma if depth == 0 => {
                pieces.push(&tokens[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    pieces.push(&tokens[start..]);
    pieces
}

/// Parse a comma-separated argument list; an empty slice is zero arguments.
pub(crate) fn parse_arguments(tokens: &[Token]) -> Result<Vec<Expr>, ScriptError> {
    if tokens.is_empty() {
        return Ok(Vec::new());
    }
    split_commas(tokens)
        .into_iter()
        .map(|piece| {
            if piece.is_empty() {
                Err(ScriptError::not_a_value(render(tokens)))
            } else {
                parse_expression(piece)
            }
        })
        .collect()
}

//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct: it normalizes a script once,
//! segments it into statements, and hands each segment to the statement
//! parser. Nested block bodies are segmented the same way, recursively, using
//! byte offsets into the one normalized text so every statement knows its
//! source line.
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks:
//! - this module: Parser struct, block segmentation, entry points
//! - `statements`: instruction forms and block headers
//! - `expressions`: expression trees (free functions over token slices)
//!
//! Statements that fail to parse do not fail the script. They become
//! [`StmtKind::Invalid`] and raise their error only if execution reaches them.

use crate::interpreter::errors::ScriptError;
use crate::interpreter::stack::ensure_sufficient_stack;
use crate::parser::ast::*;
use crate::parser::expressions::parse_expression;
use crate::parser::lexer::tokenize;
use crate::parser::normalize::{normalize, Normalized};
use crate::parser::segment::{Segment, SegmentKind, Segmenter};

/// Statement parser over one normalized script
pub struct Parser {
    pub(crate) normalized: Normalized,
}

impl Parser {
    /// Normalize `source`, failing on unbalanced quotes or delimiters.
    pub fn new(source: &str) -> Result<Self, ScriptError> {
        Ok(Parser {
            normalized: normalize(source)?,
        })
    }

    /// Parse the whole script.
    pub fn parse_program(&self) -> Program {
        Program {
            statements: self.parse_block(0, self.normalized.text().len()),
        }
    }

    /// Parse the statements between byte offsets `start` and `end`.
    pub(crate) fn parse_block(&self, start: usize, end: usize) -> Block {
        let text = &self.normalized.text()[start..end];
        ensure_sufficient_stack(|| {
            Segmenter::new(text, start)
                .map(|segment| self.parse_segment(segment))
                .collect()
        })
    }

    fn parse_segment(&self, segment: Segment<'_>) -> Stmt {
        let line = self.normalized.line_at(segment.offset);
        let parsed = match segment.kind {
            SegmentKind::Instruction => self.parse_instruction(segment.text),
            SegmentKind::Block => self.parse_compound(segment.text, segment.offset),
        };
        let kind = parsed.unwrap_or_else(|err| StmtKind::Invalid(err.at_line(line)));
        Stmt::new(kind, line)
    }
}

/// Parse a complete script.
pub fn parse_program(source: &str) -> Result<Program, ScriptError> {
    Ok(Parser::new(source)?.parse_program())
}

/// Parse standalone expression text, such as a host query.
pub fn parse_expression_text(text: &str) -> Result<Expr, ScriptError> {
    let normalized = normalize(text)?;
    let body = normalized.text().trim_matches(';');
    let tokens = tokenize(body).map_err(|_| ScriptError::not_a_value(body))?;
    parse_expression(&tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_program() {
        let program = parse_program("x = 1\ny = x + 2\n").unwrap();
        assert_eq!(program.statements.len(), 2);
        assert_eq!(program.statements[1].line, 2);
        assert!(matches!(
            &program.statements[0].kind,
            StmtKind::Assign { place: Place::Name(name), .. } if name == "x"
        ));
    }

    #[test]
    fn test_nested_lines() {
        let source = "while(a){\n  b = 1\n  if(b){\n    c = 2\n  }\n}";
        let program = parse_program(source).unwrap();
        let StmtKind::While { body, .. } = &program.statements[0].kind else {
            panic!("expected while");
        };
        assert_eq!(body[0].line, 2);
        let StmtKind::If { branches } = &body[1].kind else {
            panic!("expected if");
        };
        assert_eq!(branches[0].body[0].line, 4);
    }

    #[test]
    fn test_bad_statement_is_deferred() {
        let program = parse_program("x = 1\n1/0\ny = 2").unwrap();
        assert_eq!(program.statements.len(), 3);
        match &program.statements[1].kind {
            StmtKind::Invalid(err) => assert_eq!(err.line, Some(2)),
            other => panic!("expected invalid statement, got {:?}", other),
        }
    }

    #[test]
    fn test_unbalanced_script_fails_up_front() {
        assert!(parse_program("if(x){ y = 1").is_err());
    }

    #[test]
    fn test_expression_text() {
        assert_eq!(
            parse_expression_text(" x ;").unwrap(),
            Expr::Variable("x".to_string())
        );
    }
}

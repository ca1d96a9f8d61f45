// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Recursive-descent expression parsing over the token stream.
//!
//! One function per precedence level:
//!
//! | level | operators |
//! |-------|-----------|
//! | 6 | unary `-` `^` `!` |
//! | 5 | `*` `/` `%` `<<` `>>` `&` `&^` |
//! | 4 | `+` `-` `\|` `^` |
//! | 3 | `==` `!=` `<` `<=` `>` `>=` |
//! | 2 | `&&` |
//! | 1 | `\|\|` |
//!
//! A parenthesized expression produces a [`Expr::Bracket`] node; whether it
//! means grouping or indirection is the operand matcher's decision.

use crate::core::expr::{BinaryOp, Expr, UnaryOp};
use crate::core::source::TokenStream;
use crate::core::tokenizer::{LexError, OpKind, Span, TokenKind};

#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        Self {
            message: err.message,
            span: err.span,
        }
    }
}

/// Parse a comma-separated argument list, consuming the statement terminator.
///
/// A trailing comma is accepted only when `trailing_ok` is set (the data
/// directives); for instructions it is an error.
pub fn parse_args(ts: &mut TokenStream, trailing_ok: bool) -> Result<Vec<Expr>, ParseError> {
    let mut args = Vec::new();
    let first = ts.peek()?;
    if first.ends_statement() {
        ts.next()?;
        return Ok(args);
    }
    loop {
        args.push(parse_expr(ts)?);
        let tok = ts.next()?;
        match tok.kind {
            TokenKind::Punct(',') => {
                let next = ts.peek()?;
                if next.ends_statement() {
                    if !trailing_ok {
                        return Err(ParseError::new("unexpected trailing \",\"", tok.span));
                    }
                    ts.next()?;
                    return Ok(args);
                }
            }
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof => return Ok(args),
            _ => return Err(ParseError::new(format!("unexpected {tok}"), tok.span)),
        }
    }
}

pub fn parse_expr(ts: &mut TokenStream) -> Result<Expr, ParseError> {
    parse_or(ts)
}

fn parse_or(ts: &mut TokenStream) -> Result<Expr, ParseError> {
    let mut node = parse_and(ts)?;
    while let Some(span) = match_op(ts, OpKind::OrOr)? {
        let right = parse_and(ts)?;
        node = binary(BinaryOp::LogicOr, node, right, span);
    }
    Ok(node)
}

fn parse_and(ts: &mut TokenStream) -> Result<Expr, ParseError> {
    let mut node = parse_cmp(ts)?;
    while let Some(span) = match_op(ts, OpKind::AndAnd)? {
        let right = parse_cmp(ts)?;
        node = binary(BinaryOp::LogicAnd, node, right, span);
    }
    Ok(node)
}

fn parse_cmp(ts: &mut TokenStream) -> Result<Expr, ParseError> {
    let mut node = parse_sum(ts)?;
    loop {
        let (op, span) = match peek_kind(ts)? {
            (TokenKind::Op(OpKind::EqEq), span) => (BinaryOp::Eq, span),
            (TokenKind::Op(OpKind::NotEq), span) => (BinaryOp::Ne, span),
            (TokenKind::Op(OpKind::LtEq), span) => (BinaryOp::Le, span),
            (TokenKind::Op(OpKind::GtEq), span) => (BinaryOp::Ge, span),
            (TokenKind::Punct('<'), span) => (BinaryOp::Lt, span),
            (TokenKind::Punct('>'), span) => (BinaryOp::Gt, span),
            _ => break,
        };
        ts.next()?;
        let right = parse_sum(ts)?;
        node = binary(op, node, right, span);
    }
    Ok(node)
}

fn parse_sum(ts: &mut TokenStream) -> Result<Expr, ParseError> {
    let mut node = parse_term(ts)?;
    loop {
        let (op, span) = match peek_kind(ts)? {
            (TokenKind::Punct('+'), span) => (BinaryOp::Add, span),
            (TokenKind::Punct('-'), span) => (BinaryOp::Subtract, span),
            (TokenKind::Punct('|'), span) => (BinaryOp::BitOr, span),
            (TokenKind::Punct('^'), span) => (BinaryOp::BitXor, span),
            _ => break,
        };
        ts.next()?;
        let right = parse_term(ts)?;
        node = binary(op, node, right, span);
    }
    Ok(node)
}

fn parse_term(ts: &mut TokenStream) -> Result<Expr, ParseError> {
    let mut node = parse_unary(ts)?;
    loop {
        let (op, span) = match peek_kind(ts)? {
            (TokenKind::Punct('*'), span) => (BinaryOp::Multiply, span),
            (TokenKind::Punct('/'), span) => (BinaryOp::Divide, span),
            (TokenKind::Punct('%'), span) => (BinaryOp::Mod, span),
            (TokenKind::Punct('&'), span) => (BinaryOp::BitAnd, span),
            (TokenKind::Op(OpKind::Shl), span) => (BinaryOp::Shl, span),
            (TokenKind::Op(OpKind::Shr), span) => (BinaryOp::Shr, span),
            (TokenKind::Op(OpKind::AndNot), span) => (BinaryOp::AndNot, span),
            _ => break,
        };
        ts.next()?;
        let right = parse_unary(ts)?;
        node = binary(op, node, right, span);
    }
    Ok(node)
}

fn parse_unary(ts: &mut TokenStream) -> Result<Expr, ParseError> {
    let op = match peek_kind(ts)? {
        (TokenKind::Punct('-'), span) => Some((UnaryOp::Minus, span)),
        (TokenKind::Punct('^'), span) => Some((UnaryOp::BitNot, span)),
        (TokenKind::Punct('!'), span) => Some((UnaryOp::LogicNot, span)),
        _ => None,
    };
    if let Some((op, span)) = op {
        ts.next()?;
        let expr = parse_unary(ts)?;
        return Ok(Expr::Unary {
            op,
            expr: Box::new(expr),
            span,
        });
    }
    parse_primary(ts)
}

fn parse_primary(ts: &mut TokenStream) -> Result<Expr, ParseError> {
    let tok = ts.peek()?;
    if tok.ends_statement() {
        // Do not consume the separator; the caller's error drain relies on it.
        return Err(ParseError::new(
            format!("expected expression, found {tok}"),
            tok.span,
        ));
    }
    let tok = ts.next()?;
    match tok.kind {
        TokenKind::Int(i) => Ok(Expr::Int(i, tok.span)),
        TokenKind::Char(c) => Ok(Expr::Char(c, tok.span)),
        TokenKind::Str(bytes) | TokenKind::RawStr(bytes) => Ok(Expr::Str(bytes, tok.span)),
        TokenKind::Ident(name) => Ok(Expr::Ident(name, tok.span)),
        TokenKind::Punct('(') => {
            let inner = parse_expr(ts)?;
            let close = ts.peek()?;
            if close.kind != TokenKind::Punct(')') {
                return Err(ParseError::new("missing ')'", close.span));
            }
            ts.next()?;
            Ok(Expr::Bracket(Box::new(inner), tok.span))
        }
        _ => Err(ParseError::new(
            format!("unexpected {tok} in expression"),
            tok.span,
        )),
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr, span: Span) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        span,
    }
}

fn peek_kind(ts: &mut TokenStream) -> Result<(TokenKind, Span), ParseError> {
    let tok = ts.peek()?;
    Ok((tok.kind, tok.span))
}

fn match_op(ts: &mut TokenStream, op: OpKind) -> Result<Option<Span>, ParseError> {
    let tok = ts.peek()?;
    if tok.kind == TokenKind::Op(op) {
        ts.next()?;
        return Ok(Some(tok.span));
    }
    Ok(None)
}

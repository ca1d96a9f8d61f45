// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Source stack and token stream.
//!
//! `include` pushes a scanner, end-of-file pops it, and the pass is over when
//! the stack is empty. The `Eof` token is still returned once per pop so that
//! a file ending mid-statement terminates that statement. Scanners are owned
//! by the stack, so readers are released newest-first on every path.
//!
//! A lexical failure is sticky: after the first scan error the stream refuses
//! to produce more tokens and the pass stops with that single error.

use crate::core::tokenizer::{LexError, Scanner, Span, Token, TokenKind};
use std::io::{self, Read};

/// Injectable file opener, replaced by an in-memory map in tests.
pub type Opener = Box<dyn FnMut(&str) -> io::Result<Box<dyn Read>>>;

/// The default opener reads from the real filesystem.
pub fn file_opener() -> Opener {
    Box::new(|name: &str| {
        let f = std::fs::File::open(name)?;
        Ok(Box::new(f) as Box<dyn Read>)
    })
}

#[derive(Default, Debug)]
pub struct TokenStream {
    stack: Vec<Scanner>,
    current_file: String,
    peeked: Option<Token>,
    last: Option<Token>,
    last_span: Span,
    failed: bool,
}

impl TokenStream {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all state and start a fresh pass on the given root file.
    pub fn open_root(&mut self, file: &str, text: String) {
        self.stack.clear();
        self.peeked = None;
        self.last = None;
        self.last_span = Span::default();
        self.failed = false;
        self.push(file, text);
    }

    pub fn push(&mut self, file: &str, text: String) {
        self.current_file = file.to_string();
        self.stack.push(Scanner::new(file, text));
    }

    pub fn reset(&mut self) {
        self.stack.clear();
        self.peeked = None;
    }

    /// True while the named file is still being scanned (recursion check).
    #[must_use]
    pub fn is_open(&self, file: &str) -> bool {
        self.stack.iter().any(|s| s.file() == file)
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// File the most recent token came from.
    pub fn file(&self) -> &str {
        &self.current_file
    }

    /// Span of the most recently consumed token.
    pub fn last_span(&self) -> Span {
        self.last_span
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    /// True when the last consumed token ended a statement (or nothing has
    /// been consumed yet, in which case there is nothing to drain).
    pub fn last_ends_statement(&self) -> bool {
        self.last.as_ref().map_or(true, Token::ends_statement)
    }

    pub fn next(&mut self) -> Result<Token, LexError> {
        let tok = match self.peeked.take() {
            Some(tok) => tok,
            None => self.fetch()?,
        };
        self.last_span = tok.span;
        self.last = Some(tok.clone());
        Ok(tok)
    }

    pub fn peek(&mut self) -> Result<Token, LexError> {
        match &self.peeked {
            Some(tok) => Ok(tok.clone()),
            None => {
                let tok = self.fetch()?;
                self.peeked = Some(tok.clone());
                Ok(tok)
            }
        }
    }

    fn fetch(&mut self) -> Result<Token, LexError> {
        if self.failed {
            return Err(LexError {
                message: "scanning stopped after earlier error".to_string(),
                span: self.last_span,
            });
        }
        let Some(scan) = self.stack.last_mut() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                span: self.last_span,
            });
        };
        match scan.next_token() {
            Ok(tok) => {
                if tok.kind == TokenKind::Eof {
                    self.stack.pop();
                    if let Some(top) = self.stack.last() {
                        self.current_file = top.file().to_string();
                    }
                }
                Ok(tok)
            }
            Err(err) => {
                self.failed = true;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TokenStream;
    use crate::core::tokenizer::TokenKind;

    #[test]
    fn pops_on_eof_and_continues_with_parent() {
        let mut ts = TokenStream::new();
        ts.open_root("outer.z80", "nop\n".to_string());
        ts.push("inner.z80", "di".to_string());
        assert_eq!(ts.depth(), 2);

        let t = ts.next().unwrap();
        assert_eq!(t.kind, TokenKind::Ident("di".to_string()));
        // Eof of the inner file terminates its last statement and pops it.
        let t = ts.next().unwrap();
        assert_eq!(t.kind, TokenKind::Eof);
        assert_eq!(ts.depth(), 1);
        assert_eq!(ts.file(), "outer.z80");

        let t = ts.next().unwrap();
        assert_eq!(t.kind, TokenKind::Ident("nop".to_string()));
    }

    #[test]
    fn recursion_check_sees_open_files() {
        let mut ts = TokenStream::new();
        ts.open_root("a.z80", String::new());
        ts.push("b.z80", String::new());
        assert!(ts.is_open("a.z80"));
        assert!(ts.is_open("b.z80"));
        assert!(!ts.is_open("c.z80"));
    }

    #[test]
    fn peek_does_not_consume() {
        let mut ts = TokenStream::new();
        ts.open_root("t.z80", "nop".to_string());
        let p = ts.peek().unwrap();
        assert_eq!(p.kind, TokenKind::Ident("nop".to_string()));
        assert!(ts.last_ends_statement()); // nothing consumed yet
        let t = ts.next().unwrap();
        assert_eq!(t.kind, p.kind);
        assert!(!ts.last_ends_statement());
    }

    #[test]
    fn lexical_failure_is_sticky() {
        let mut ts = TokenStream::new();
        ts.open_root("t.z80", "@ nop".to_string());
        assert!(ts.next().is_err());
        assert!(ts.failed());
        assert!(ts.next().is_err());
    }

    #[test]
    fn empty_stack_keeps_returning_eof() {
        let mut ts = TokenStream::new();
        ts.open_root("t.z80", String::new());
        assert_eq!(ts.next().unwrap().kind, TokenKind::Eof);
        assert_eq!(ts.depth(), 0);
        assert_eq!(ts.next().unwrap().kind, TokenKind::Eof);
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! The two-pass assembler.
//!
//! Pass 0 collects label addresses, emitting placeholder zeros wherever a
//! forward reference is still unknown; pass 1 re-assembles everything with
//! the full symbol table and is the authority on errors. Pass-0 errors are
//! dropped: a statement that fails there (an unresolved `org`, say) fails
//! again in pass 1 if it is really wrong.
//!
//! Each statement is the error unit. On an error the token stream is drained
//! past the next `;`/newline/EOF and assembly continues, collecting up to 20
//! errors per file. Error lines carry `file:line.col:` locations and are
//! joined with newlines for the caller.

pub mod cli;
#[cfg(test)]
mod tests;

use std::io::Read;

use crate::core::expr::{int_value, EvalContext, EvalError, Expr, IntEval};
use crate::core::image::{Image, TARGET_LIMIT};
use crate::core::parser::{parse_args, parse_expr, ParseError};
use crate::core::source::{file_opener, Opener, TokenStream};
use crate::core::symbol_table::{ConstState, SymbolTable};
use crate::core::tokenizer::{Span, Token, TokenKind};
use crate::z80::args::Arg;
use crate::z80::encode;
use crate::z80::table::{CoreLevel, InstructionSet};

/// Assembler construction options.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub core: CoreLevel,
}

/// An assembly failure. The message holds one `file:line.col: text` line per
/// collected error.
#[derive(Debug, Clone)]
pub struct AsmError {
    message: String,
}

impl AsmError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AsmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AsmError {}

const MAX_ERRORS: usize = 20;
const DEFAULT_ORIGIN: u16 = 0x8000;

pub struct Assembler {
    opener: Opener,
    table: InstructionSet,
    symbols: SymbolTable,
    image: Image,
    sources: TokenStream,
    pass: u8,
}

impl std::fmt::Debug for Assembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assembler")
            .field("table", &self.table)
            .field("symbols", &self.symbols)
            .field("image", &self.image)
            .field("sources", &self.sources)
            .field("pass", &self.pass)
            .finish_non_exhaustive()
    }
}

impl Assembler {
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self {
            opener: file_opener(),
            table: InstructionSet::build(options.core),
            symbols: SymbolTable::new(),
            image: Image::new(DEFAULT_ORIGIN, DEFAULT_ORIGIN as usize),
            sources: TokenStream::new(),
            pass: 0,
        }
    }

    /// Replace the file opener (tests substitute an in-memory map).
    pub fn set_opener(&mut self, opener: Opener) {
        self.opener = opener;
    }

    /// The output image. At least 64 KiB; grows if emission runs past it.
    pub fn ram(&self) -> &[u8] {
        self.image.ram()
    }

    /// Lowest and highest written offsets, if anything was emitted.
    pub fn written_range(&self) -> Option<(usize, usize)> {
        self.image.written_range()
    }

    /// Look up a label: `major.name` first, then bare `name`.
    pub fn get_label(&self, major: &str, name: &str) -> Option<u16> {
        self.symbols.get_label(major, name)
    }

    /// Look up a constant. Errs when the name is a constant that was used
    /// before its definition (never materialized).
    pub fn get_const(&self, name: &str) -> Result<Option<i64>, AsmError> {
        match self.symbols.const_state(name) {
            ConstState::NotConst => Ok(None),
            ConstState::Value(v) => Ok(Some(v)),
            ConstState::Unmaterialized | ConstState::NotYetDefined => Err(AsmError::new(format!(
                "use of const {name:?} before definition"
            ))),
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = (&str, u16)> {
        self.symbols.labels()
    }

    /// Assemble the named file in two passes. Pass-0 errors are suppressed;
    /// pass-1 errors are joined and returned. The origin is restored
    /// afterwards so repeated calls assemble at the same address.
    pub fn assemble_file(&mut self, path: &str) -> Result<(), AsmError> {
        let init_pc = self.image.pc();
        let init_target = self.image.target();
        let mut result = Ok(());
        for pass in 0..2u8 {
            self.pass = pass;
            self.image.reset(init_pc, init_target);
            self.symbols.begin_pass();
            tracing::debug!(pass, file = path, "starting pass");
            let errs = self.run_pass(path);
            tracing::debug!(pass, errors = errs.len(), "pass finished");
            if pass == 1 && !errs.is_empty() {
                result = Err(AsmError::new(errs.join("\n")));
            }
        }
        self.image.reset(init_pc, init_target);
        result
    }

    fn run_pass(&mut self, path: &str) -> Vec<String> {
        let text = match self.open_source(path) {
            Ok(text) => text,
            Err(err) => return vec![format!("failed to assemble {path:?}: {err}")],
        };
        self.sources.open_root(path, text);

        let mut errs = Vec::new();
        while errs.len() < MAX_ERRORS {
            match self.statements() {
                Ok(()) => break,
                Err(err) => {
                    errs.push(err.message);
                    if !self.drain_statement() {
                        break;
                    }
                }
            }
        }
        self.sources.reset();
        errs
    }

    fn open_source(&mut self, path: &str) -> std::io::Result<String> {
        let mut reader = (self.opener)(path)?;
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(text)
    }

    /// Consume statements until the pass ends cleanly or a statement fails.
    fn statements(&mut self) -> Result<(), AsmError> {
        loop {
            let tok = self.next_token()?;
            match tok.kind {
                TokenKind::Eof => {
                    if self.sources.depth() == 0 {
                        return Ok(());
                    }
                    // An include just ended; carry on in the outer file.
                }
                TokenKind::Newline | TokenKind::Semicolon => {}
                TokenKind::Ident(name) => self.statement(&name, tok.span)?,
                TokenKind::Punct('.') => self.minor_label()?,
                _ => return Err(self.err_at(tok.span, format!("unexpected {tok}"))),
            }
        }
    }

    /// One statement starting with an identifier: a major label definition
    /// when a colon follows, a directive or instruction otherwise.
    fn statement(&mut self, name: &str, span: Span) -> Result<(), AsmError> {
        let next = self.peek_token()?;
        if next.kind == TokenKind::Punct(':') {
            self.next_token()?;
            self.define_label(name, span)?;
            self.symbols.set_major(name);
            return Ok(());
        }

        let cmd = name.to_lowercase();
        match cmd.as_str() {
            "org" => self.cmd_org(),
            "db" => self.cmd_data(Arg::Const8),
            "dw" => self.cmd_data(Arg::Const16),
            "ds" => self.cmd_data(Arg::ArgString),
            "const" => self.cmd_const(),
            "include" => self.cmd_include(),
            _ => self.cmd_instruction(&cmd, name),
        }
    }

    /// `.name` defines a minor label under the current major.
    fn minor_label(&mut self) -> Result<(), AsmError> {
        let tok = self.next_token()?;
        match tok.kind {
            TokenKind::Ident(name) => {
                let qualified = self.symbols.qualify_minor(&name);
                self.define_label(&qualified, tok.span)
            }
            _ => Err(self.err_at(tok.span, format!("unexpected {tok}"))),
        }
    }

    fn define_label(&mut self, qualified: &str, span: Span) -> Result<(), AsmError> {
        let loc = self.loc_string(span);
        let pc = self.image.pc();
        self.symbols
            .define_label(qualified, pc, &loc, self.pass)
            .map_err(|msg| self.err_at(span, msg))
    }

    fn cmd_instruction(&mut self, cmd: &str, orig: &str) -> Result<(), AsmError> {
        let span = self.sources.last_span();
        if !self.table.is_mnemonic(cmd) {
            return Err(self.err_at(span, format!("unknown command {orig}")));
        }
        let args = self.parse_arg_list(false)?;
        let variants = self.table.variants(cmd).expect("checked mnemonic");
        let bytes = encode::encode(self, variants, cmd, &args).map_err(|e| self.eval_err(e))?;
        match bytes {
            Some(bytes) => self.emit(&bytes),
            None => {
                let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
                Err(self.err_at(
                    span,
                    format!(
                        "no suitable form of {cmd} found that matches {cmd} {}",
                        rendered.join(", ")
                    ),
                ))
            }
        }
    }

    /// `org n [, t]`: move the program counter, and optionally emit at a
    /// different target offset (paged memory).
    fn cmd_org(&mut self) -> Result<(), AsmError> {
        let span = self.sources.last_span();
        let args = self.parse_arg_list(true)?;
        if args.is_empty() || args.len() > 2 {
            return Err(self.err_at(
                span,
                format!("org takes one or two arguments: {} found", args.len()),
            ));
        }
        let n = match int_value(&args[0], self).map_err(|e| self.eval_err(e))? {
            IntEval::Known(n) => n,
            IntEval::Unknown => {
                return Err(self.err_at(args[0].span(), "org address must be known"))
            }
            IntEval::NotInt => {
                return Err(self.err_at(
                    args[0].span(),
                    format!("org wants address, found {}", args[0]),
                ))
            }
        };
        if !(0..=65535).contains(&n) {
            return Err(self.err_at(args[0].span(), format!("org {n:#x} out of range")));
        }
        let target = match args.get(1) {
            None => n,
            Some(expr) => match int_value(expr, self).map_err(|e| self.eval_err(e))? {
                IntEval::Known(t) => {
                    if !(0..=TARGET_LIMIT as i64).contains(&t) {
                        return Err(
                            self.err_at(expr.span(), format!("org target {t:#x} out of range"))
                        );
                    }
                    t
                }
                _ => {
                    return Err(self.err_at(
                        expr.span(),
                        format!("org wants target address, found {expr}"),
                    ))
                }
            },
        };
        self.image.set_pc(n as u16);
        self.image.set_target(target as usize);
        Ok(())
    }

    /// `db`/`dw`/`ds`: emit each argument in the given shape.
    fn cmd_data(&mut self, shape: Arg) -> Result<(), AsmError> {
        let args = self.parse_arg_list(true)?;
        for arg in &args {
            let bytes =
                encode::eval_as(self, arg, shape, false).map_err(|e| self.eval_err(e))?;
            match bytes {
                Some(bytes) => self.emit(&bytes)?,
                None => {
                    return Err(self.err_at(arg.span(), format!("bad data value: {arg}")));
                }
            }
        }
        Ok(())
    }

    /// `const name = expr`, evaluated on the spot. A value that still needs
    /// a forward label in pass 0 is recorded unmaterialized; pass 1
    /// recomputes it.
    fn cmd_const(&mut self) -> Result<(), AsmError> {
        let tok = self.next_token()?;
        let name = match tok.kind {
            TokenKind::Ident(ref name) => name.clone(),
            _ => {
                return Err(
                    self.err_at(tok.span, format!("const wants identifier, found {tok}"))
                )
            }
        };
        let eq = self.next_token()?;
        if eq.kind != TokenKind::Punct('=') {
            return Err(self.err_at(eq.span, format!("expected '=', found {eq}")));
        }
        let expr = parse_expr(&mut self.sources).map_err(|e| self.parse_err(e))?;
        self.expect_statement_end()?;

        let value = match int_value(&expr, self).map_err(|e| self.eval_err(e))? {
            IntEval::Known(v) => Some(v),
            IntEval::Unknown => None,
            IntEval::NotInt => {
                return Err(self.err_at(expr.span(), format!("can't compute constant: {expr}")))
            }
        };
        let loc = self.loc_string(tok.span);
        self.symbols
            .define_const(&name, value, &loc, self.pass)
            .map_err(|msg| self.err_at(tok.span, msg))
    }

    /// `include "file"`: push the named file onto the source stack.
    fn cmd_include(&mut self) -> Result<(), AsmError> {
        let tok = self.next_token()?;
        let name = match tok.kind {
            TokenKind::Str(ref bytes) | TokenKind::RawStr(ref bytes) => {
                String::from_utf8_lossy(bytes).to_string()
            }
            _ => {
                return Err(
                    self.err_at(tok.span, format!("include wants string filename, found {tok}"))
                )
            }
        };
        self.expect_statement_end()?;
        if self.sources.is_open(&name) {
            return Err(self.err_at(tok.span, format!("recursive include of {name:?}")));
        }
        let text = match self.open_source(&name) {
            Ok(text) => text,
            Err(err) => {
                return Err(self.err_at(tok.span, format!("failed to include {name:?}: {err}")))
            }
        };
        tracing::trace!(file = name.as_str(), "include");
        self.sources.push(&name, text);
        Ok(())
    }

    fn emit(&mut self, bytes: &[u8]) -> Result<(), AsmError> {
        self.image
            .write_bytes(bytes)
            .map_err(|msg| self.err_at(self.sources.last_span(), msg))
    }

    fn parse_arg_list(&mut self, trailing_ok: bool) -> Result<Vec<Expr>, AsmError> {
        parse_args(&mut self.sources, trailing_ok).map_err(|e| self.parse_err(e))
    }

    fn expect_statement_end(&mut self) -> Result<(), AsmError> {
        let tok = self.next_token()?;
        if tok.ends_statement() {
            Ok(())
        } else {
            Err(self.err_at(tok.span, format!("expected end of statement, found {tok}")))
        }
    }

    /// After a statement error: skip tokens until the statement ends. False
    /// when scanning itself has failed and the pass must stop.
    fn drain_statement(&mut self) -> bool {
        while !self.sources.last_ends_statement() {
            if self.sources.next().is_err() {
                return false;
            }
        }
        !self.sources.failed()
    }

    fn next_token(&mut self) -> Result<Token, AsmError> {
        self.sources
            .next()
            .map_err(|e| self.err_at(e.span, e.message))
    }

    fn peek_token(&mut self) -> Result<Token, AsmError> {
        self.sources
            .peek()
            .map_err(|e| self.err_at(e.span, e.message))
    }

    fn loc_string(&self, span: Span) -> String {
        format!("{}:{}", self.sources.file(), span)
    }

    fn err_at(&self, span: Span, message: impl std::fmt::Display) -> AsmError {
        AsmError::new(format!("{}:{}: {}", self.sources.file(), span, message))
    }

    fn parse_err(&self, err: ParseError) -> AsmError {
        self.err_at(err.span, err.message)
    }

    fn eval_err(&self, err: EvalError) -> AsmError {
        self.err_at(err.span, err.message)
    }
}

impl EvalContext for Assembler {
    fn lookup_value(&self, name: &str, span: Span) -> Result<IntEval, EvalError> {
        match self.symbols.const_state(name) {
            ConstState::Value(v) => Ok(IntEval::Known(v)),
            ConstState::Unmaterialized => Ok(IntEval::Unknown),
            ConstState::NotYetDefined => Err(EvalError::new(
                format!("use of const {name:?} before definition"),
                span,
            )),
            ConstState::NotConst => {
                if let Some(v) = self.symbols.lookup_label(name) {
                    return Ok(IntEval::Known(i64::from(v)));
                }
                if self.pass == 0 {
                    Ok(IntEval::Unknown)
                } else {
                    Err(EvalError::new(format!("unknown label {name:?}"), span))
                }
            }
        }
    }

    fn is_reserved(&self, name: &str) -> bool {
        crate::z80::is_reserved_name(name)
    }

    fn pass(&self) -> u8 {
        self.pass
    }

    fn pc(&self) -> u16 {
        self.image.pc()
    }
}

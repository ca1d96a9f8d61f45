// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Scanner for Z80 assembly source.
//!
//! The scanner walks a whole file and yields one token per call. Newlines and
//! semicolons are tokens of their own: together with end-of-file they are the
//! statement separators the assembler drains to after an error. Lexical
//! errors are returned, never called back.

/// Position of a token within its file, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: u32,
    pub col: usize,
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.line, self.col)
    }
}

/// Two-character operators, recognized by one-byte lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Shl,    // <<
    Shr,    // >>
    AndNot, // &^
    EqEq,   // ==
    NotEq,  // !=
    LtEq,   // <=
    GtEq,   // >=
    AndAnd, // &&
    OrOr,   // ||
}

impl OpKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OpKind::Shl => "<<",
            OpKind::Shr => ">>",
            OpKind::AndNot => "&^",
            OpKind::EqEq => "==",
            OpKind::NotEq => "!=",
            OpKind::LtEq => "<=",
            OpKind::GtEq => ">=",
            OpKind::AndAnd => "&&",
            OpKind::OrOr => "||",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Int(i64),
    Char(u32),
    Str(Vec<u8>),
    RawStr(Vec<u8>),
    Punct(char),
    Op(OpKind),
    Newline,
    Semicolon,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// True for the tokens that end a statement.
    pub fn ends_statement(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof
        )
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            TokenKind::Ident(name) => write!(f, "identifier \"{name}\""),
            TokenKind::Int(i) => write!(f, "{i}"),
            TokenKind::Char(c) => match char::from_u32(*c) {
                Some(c) => write!(f, "{c:?}"),
                None => write!(f, "char {c:#x}"),
            },
            TokenKind::Str(bytes) | TokenKind::RawStr(bytes) => {
                write!(f, "{:?}", String::from_utf8_lossy(bytes))
            }
            TokenKind::Punct(c) => write!(f, "{c:?}"),
            TokenKind::Op(op) => write!(f, "{}", op.as_str()),
            TokenKind::Newline => write!(f, "newline"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LexError {}

#[derive(Debug)]
pub struct Scanner {
    file: String,
    input: Vec<u8>,
    cursor: usize,
    line: u32,
    line_start: usize,
}

impl Scanner {
    #[must_use]
    pub fn new(file: impl Into<String>, text: impl Into<Vec<u8>>) -> Self {
        Self {
            file: file.into(),
            input: text.into(),
            cursor: 0,
            line: 1,
            line_start: 0,
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Position of the next unread byte.
    pub fn span(&self) -> Span {
        Span {
            line: self.line,
            col: self.cursor - self.line_start + 1,
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_blanks()?;
        let span = self.span();
        let c = self.current_byte();
        match c {
            0 => Ok(Token {
                kind: TokenKind::Eof,
                span,
            }),
            b'\n' => {
                self.advance_line();
                Ok(Token {
                    kind: TokenKind::Newline,
                    span,
                })
            }
            b';' => {
                self.cursor += 1;
                Ok(Token {
                    kind: TokenKind::Semicolon,
                    span,
                })
            }
            _ if is_ident_start(c) => self.scan_identifier(span),
            _ if c.is_ascii_digit() => self.scan_number(span),
            b'\'' => self.scan_char(span),
            b'"' => self.scan_string(span),
            b'`' => self.scan_raw_string(span),
            _ => self.scan_operator(span, c),
        }
    }

    fn scan_operator(&mut self, span: Span, c: u8) -> Result<Token, LexError> {
        self.cursor += 1;
        let kind = match c {
            b'<' => match self.current_byte() {
                b'<' => self.take(TokenKind::Op(OpKind::Shl)),
                b'=' => self.take(TokenKind::Op(OpKind::LtEq)),
                _ => TokenKind::Punct('<'),
            },
            b'>' => match self.current_byte() {
                b'>' => self.take(TokenKind::Op(OpKind::Shr)),
                b'=' => self.take(TokenKind::Op(OpKind::GtEq)),
                _ => TokenKind::Punct('>'),
            },
            b'&' => match self.current_byte() {
                b'^' => self.take(TokenKind::Op(OpKind::AndNot)),
                b'&' => self.take(TokenKind::Op(OpKind::AndAnd)),
                _ => TokenKind::Punct('&'),
            },
            b'=' => match self.current_byte() {
                b'=' => self.take(TokenKind::Op(OpKind::EqEq)),
                _ => TokenKind::Punct('='),
            },
            b'!' => match self.current_byte() {
                b'=' => self.take(TokenKind::Op(OpKind::NotEq)),
                _ => TokenKind::Punct('!'),
            },
            b'|' => match self.current_byte() {
                b'|' => self.take(TokenKind::Op(OpKind::OrOr)),
                _ => TokenKind::Punct('|'),
            },
            b'(' | b')' | b',' | b':' | b'.' | b'+' | b'-' | b'*' | b'/' | b'%' | b'^' => {
                TokenKind::Punct(c as char)
            }
            _ => {
                return Err(LexError {
                    message: format!("illegal character {:?}", c as char),
                    span,
                })
            }
        };
        Ok(Token { kind, span })
    }

    fn scan_identifier(&mut self, span: Span) -> Result<Token, LexError> {
        let start = self.cursor;
        while is_ident_char(self.current_byte()) {
            self.cursor += 1;
        }
        let mut text = String::from_utf8_lossy(&self.input[start..self.cursor]).to_string();
        // The alternate register set is spelled af'.
        if text.eq_ignore_ascii_case("af") && self.current_byte() == b'\'' {
            self.cursor += 1;
            text.push('\'');
        }
        Ok(Token {
            kind: TokenKind::Ident(text),
            span,
        })
    }

    fn scan_number(&mut self, span: Span) -> Result<Token, LexError> {
        let start = self.cursor;
        while self.current_byte().is_ascii_alphanumeric() || self.current_byte() == b'_' {
            self.cursor += 1;
        }
        let text = String::from_utf8_lossy(&self.input[start..self.cursor]).to_string();
        // Underscores are visual separators.
        let digits: String = text.chars().filter(|&c| c != '_').collect();
        let parsed = if let Some(hex) = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
        {
            if hex.is_empty() {
                None
            } else {
                i64::from_str_radix(hex, 16).ok()
            }
        } else if digits.len() > 1 && digits.starts_with('0') {
            i64::from_str_radix(&digits[1..], 8).ok()
        } else {
            digits.parse::<i64>().ok()
        };
        match parsed {
            Some(i) => Ok(Token {
                kind: TokenKind::Int(i),
                span,
            }),
            None => Err(LexError {
                message: format!("bad number {text:?}"),
                span,
            }),
        }
    }

    fn scan_char(&mut self, span: Span) -> Result<Token, LexError> {
        self.cursor += 1;
        let value = match self.current_byte() {
            0 | b'\n' => {
                return Err(LexError {
                    message: "char literal not terminated".to_string(),
                    span,
                })
            }
            b'\\' => {
                self.cursor += 1;
                self.scan_escape(span)? as u32
            }
            b'\'' => {
                return Err(LexError {
                    message: "empty char literal".to_string(),
                    span,
                })
            }
            c if c < 0x80 => {
                self.cursor += 1;
                c as u32
            }
            _ => {
                // Multi-byte UTF-8 scalar.
                let rest = &self.input[self.cursor..];
                let s = String::from_utf8_lossy(rest);
                let ch = s.chars().next().unwrap_or('\u{fffd}');
                self.cursor += ch.len_utf8();
                ch as u32
            }
        };
        if self.current_byte() != b'\'' {
            return Err(LexError {
                message: "char literal not terminated".to_string(),
                span,
            });
        }
        self.cursor += 1;
        Ok(Token {
            kind: TokenKind::Char(value),
            span,
        })
    }

    fn scan_string(&mut self, span: Span) -> Result<Token, LexError> {
        self.cursor += 1;
        let mut out = Vec::new();
        loop {
            match self.current_byte() {
                0 | b'\n' => {
                    return Err(LexError {
                        message: "string not terminated".to_string(),
                        span,
                    })
                }
                b'"' => {
                    self.cursor += 1;
                    return Ok(Token {
                        kind: TokenKind::Str(out),
                        span,
                    });
                }
                b'\\' => {
                    self.cursor += 1;
                    out.push(self.scan_escape(span)?);
                }
                c => {
                    out.push(c);
                    self.cursor += 1;
                }
            }
        }
    }

    fn scan_raw_string(&mut self, span: Span) -> Result<Token, LexError> {
        self.cursor += 1;
        let mut out = Vec::new();
        loop {
            match self.current_byte() {
                0 => {
                    return Err(LexError {
                        message: "raw string not terminated".to_string(),
                        span,
                    })
                }
                b'`' => {
                    self.cursor += 1;
                    return Ok(Token {
                        kind: TokenKind::RawStr(out),
                        span,
                    });
                }
                b'\n' => {
                    out.push(b'\n');
                    self.advance_line();
                }
                c => {
                    out.push(c);
                    self.cursor += 1;
                }
            }
        }
    }

    fn scan_escape(&mut self, span: Span) -> Result<u8, LexError> {
        let esc = self.current_byte();
        self.cursor += 1;
        let val = match esc {
            b'a' => 0x07,
            b'b' => 0x08,
            b'f' => 0x0c,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'v' => 0x0b,
            b'0' => 0,
            b'\\' => b'\\',
            b'\'' => b'\'',
            b'"' => b'"',
            b'x' => {
                let hi = self.current_byte();
                let lo = self.peek_byte(1);
                if !hi.is_ascii_hexdigit() || !lo.is_ascii_hexdigit() {
                    return Err(LexError {
                        message: "bad hex escape".to_string(),
                        span,
                    });
                }
                self.cursor += 2;
                (hex_digit(hi) << 4) | hex_digit(lo)
            }
            _ => {
                return Err(LexError {
                    message: format!("unknown escape \\{}", esc as char),
                    span,
                })
            }
        };
        Ok(val)
    }

    fn skip_blanks(&mut self) -> Result<(), LexError> {
        loop {
            match self.current_byte() {
                b' ' | b'\t' | b'\r' => self.cursor += 1,
                b'/' if self.peek_byte(1) == b'/' => {
                    while self.current_byte() != 0 && self.current_byte() != b'\n' {
                        self.cursor += 1;
                    }
                }
                b'/' if self.peek_byte(1) == b'*' => {
                    let open = self.span();
                    self.cursor += 2;
                    loop {
                        match self.current_byte() {
                            0 => {
                                return Err(LexError {
                                    message: "comment not terminated".to_string(),
                                    span: open,
                                })
                            }
                            b'\n' => self.advance_line(),
                            b'*' if self.peek_byte(1) == b'/' => {
                                self.cursor += 2;
                                break;
                            }
                            _ => self.cursor += 1,
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn take(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor += 1;
        kind
    }

    fn advance_line(&mut self) {
        self.cursor += 1;
        self.line += 1;
        self.line_start = self.cursor;
    }

    fn current_byte(&self) -> u8 {
        self.input.get(self.cursor).copied().unwrap_or(0)
    }

    fn peek_byte(&self, offset: usize) -> u8 {
        self.input.get(self.cursor + offset).copied().unwrap_or(0)
    }
}

pub fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

pub fn is_ident_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

fn hex_digit(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'A'..=b'F' => c - b'A' + 10,
        _ => c - b'a' + 10,
    }
}

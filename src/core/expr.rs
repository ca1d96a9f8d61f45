// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Expression tree and integer evaluation.
//!
//! Evaluation is 64-bit signed throughout; truncation to operand widths
//! happens at encoding time. An identifier can resolve to a known value, to
//! an unknown-but-legal value (a forward label during pass 0), or to nothing
//! numeric at all (register and condition-code names), so integer evaluation
//! has three non-error outcomes, [`IntEval`].

use crate::core::tokenizer::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,
    BitNot,
    LogicNot,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Minus => "-",
            UnaryOp::BitNot => "^",
            UnaryOp::LogicNot => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Multiply,
    Divide,
    Mod,
    Shl,
    Shr,
    BitAnd,
    AndNot,
    Add,
    Subtract,
    BitOr,
    BitXor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LogicAnd,
    LogicOr,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::BitAnd => "&",
            BinaryOp::AndNot => "&^",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::LogicAnd => "&&",
            BinaryOp::LogicOr => "||",
        }
    }

    /// Binding strength, matching the parser's level functions.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Multiply
            | BinaryOp::Divide
            | BinaryOp::Mod
            | BinaryOp::Shl
            | BinaryOp::Shr
            | BinaryOp::BitAnd
            | BinaryOp::AndNot => 5,
            BinaryOp::Add | BinaryOp::Subtract | BinaryOp::BitOr | BinaryOp::BitXor => 4,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => 3,
            BinaryOp::LogicAnd => 2,
            BinaryOp::LogicOr => 1,
        }
    }
}

const UNARY_PRECEDENCE: u8 = 6;

/// A parsed operand expression.
///
/// `Bracket` is the indirection wrapper: `(hl)` as a whole operand selects
/// indirect operand shapes, while `(2+3)*4` inside arithmetic is ordinary
/// grouping. Which reading applies is decided during operand matching, not
/// here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Int(i64, Span),
    Char(u32, Span),
    Str(Vec<u8>, Span),
    Ident(String, Span),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    Bracket(Box<Expr>, Span),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Int(_, span)
            | Expr::Char(_, span)
            | Expr::Str(_, span)
            | Expr::Ident(_, span)
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Bracket(_, span) => *span,
        }
    }

    fn fmt_pri(&self, f: &mut std::fmt::Formatter<'_>, pri: u8) -> std::fmt::Result {
        match self {
            Expr::Int(i, _) => write!(f, "{i}"),
            Expr::Char(c, _) => match char::from_u32(*c) {
                Some(c) => write!(f, "{c}"),
                None => write!(f, "{c:#x}"),
            },
            Expr::Str(bytes, _) => write!(f, "{:?}", String::from_utf8_lossy(bytes)),
            Expr::Ident(name, _) => write!(f, "{name}"),
            Expr::Unary { op, expr, .. } => {
                write!(f, "{}", op.as_str())?;
                expr.fmt_pri(f, UNARY_PRECEDENCE)
            }
            Expr::Binary {
                op, left, right, ..
            } => {
                let my_pri = op.precedence();
                if my_pri < pri {
                    write!(f, "(")?;
                }
                left.fmt_pri(f, my_pri)?;
                write!(f, " {} ", op.as_str())?;
                right.fmt_pri(f, my_pri + 1)?;
                if my_pri < pri {
                    write!(f, ")")?;
                }
                Ok(())
            }
            Expr::Bracket(inner, _) => {
                // Inside arithmetic a bracket is plain grouping; at
                // precedence zero it prints as the indirection it is.
                if pri > 0 {
                    inner.fmt_pri(f, pri)
                } else {
                    write!(f, "(")?;
                    inner.fmt_pri(f, 0)?;
                    write!(f, ")")
                }
            }
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.fmt_pri(f, 0)
    }
}

/// Outcome of integer evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntEval {
    Known(i64),
    /// A forward label during pass 0. Serializes as placeholder zeros.
    Unknown,
    /// Not an arithmetic value (register name, condition code, string).
    NotInt,
}

#[derive(Debug, Clone)]
pub struct EvalError {
    pub message: String,
    pub span: Span,
}

impl EvalError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvalError {}

/// Evaluation context: symbol resolution plus the pass/pc state the encoder
/// needs for relative addressing.
pub trait EvalContext {
    /// Resolve an identifier. `Unknown` is only legal during pass 0.
    fn lookup_value(&self, name: &str, span: Span) -> Result<IntEval, EvalError>;

    /// True when the identifier names a register or condition code; such
    /// names never resolve as labels.
    fn is_reserved(&self, name: &str) -> bool;

    fn pass(&self) -> u8;

    /// Logical program counter at the start of the current instruction.
    fn pc(&self) -> u16;
}

/// Evaluate an expression to an integer, if it is one.
pub fn int_value(expr: &Expr, ctx: &dyn EvalContext) -> Result<IntEval, EvalError> {
    match expr {
        Expr::Int(i, _) => Ok(IntEval::Known(*i)),
        Expr::Char(c, _) => Ok(IntEval::Known(i64::from(*c))),
        Expr::Str(_, _) => Ok(IntEval::NotInt),
        Expr::Ident(name, span) => {
            if ctx.is_reserved(name) {
                return Ok(IntEval::NotInt);
            }
            ctx.lookup_value(name, *span)
        }
        Expr::Bracket(inner, _) => int_value(inner, ctx),
        Expr::Unary { op, expr, .. } => match int_value(expr, ctx)? {
            IntEval::Known(v) => Ok(IntEval::Known(apply_unary(*op, v))),
            other => Ok(other),
        },
        Expr::Binary {
            op,
            left,
            right,
            span,
        } => eval_binary(*op, left, right, *span, ctx),
    }
}

pub fn apply_unary(op: UnaryOp, v: i64) -> i64 {
    match op {
        UnaryOp::Minus => v.wrapping_neg(),
        UnaryOp::BitNot => !v,
        UnaryOp::LogicNot => i64::from(v == 0),
    }
}

fn eval_binary(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    span: Span,
    ctx: &dyn EvalContext,
) -> Result<IntEval, EvalError> {
    if matches!(op, BinaryOp::LogicAnd | BinaryOp::LogicOr) {
        return eval_short_circuit(op, left, right, span, ctx);
    }

    let l = match int_value(left, ctx)? {
        IntEval::NotInt => return Ok(IntEval::NotInt),
        other => other,
    };
    let r = match int_value(right, ctx)? {
        IntEval::NotInt => {
            return Err(EvalError::new(
                format!("can't compute constant: {right}"),
                span,
            ))
        }
        other => other,
    };

    // Range errors that only depend on the right operand are reported even
    // when the left side is still unknown.
    match op {
        BinaryOp::Divide => {
            if r == IntEval::Known(0) {
                return Err(EvalError::new("divide by zero", span));
            }
        }
        BinaryOp::Mod => {
            if r == IntEval::Known(0) {
                return Err(EvalError::new("second arg of % must be non-zero", span));
            }
        }
        BinaryOp::Shl | BinaryOp::Shr => {
            if let IntEval::Known(n) = r {
                if n < 0 {
                    return Err(EvalError::new("shift must be positive", span));
                }
            }
        }
        _ => {}
    }

    let (n1, n2) = match (l, r) {
        (IntEval::Known(n1), IntEval::Known(n2)) => (n1, n2),
        _ => return Ok(IntEval::Unknown),
    };
    Ok(IntEval::Known(apply_binary(op, n1, n2)))
}

fn eval_short_circuit(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    span: Span,
    ctx: &dyn EvalContext,
) -> Result<IntEval, EvalError> {
    let n1 = match int_value(left, ctx)? {
        IntEval::Known(n1) => n1,
        other => return Ok(other),
    };
    // The value of && / || is the determining operand, not 0/1.
    let determined = match op {
        BinaryOp::LogicOr => n1 != 0,
        _ => n1 == 0,
    };
    if determined {
        return Ok(IntEval::Known(n1));
    }
    match int_value(right, ctx)? {
        IntEval::Known(n2) => Ok(IntEval::Known(n2)),
        IntEval::Unknown => Ok(IntEval::Unknown),
        IntEval::NotInt => Err(EvalError::new(
            format!("can't compute constant: {right}"),
            span,
        )),
    }
}

fn apply_binary(op: BinaryOp, n1: i64, n2: i64) -> i64 {
    match op {
        BinaryOp::Add => n1.wrapping_add(n2),
        BinaryOp::Subtract => n1.wrapping_sub(n2),
        BinaryOp::Multiply => n1.wrapping_mul(n2),
        BinaryOp::Divide => n1.wrapping_div(n2),
        BinaryOp::Mod => n1.wrapping_rem(n2),
        BinaryOp::BitAnd => n1 & n2,
        BinaryOp::AndNot => n1 & !n2,
        BinaryOp::BitOr => n1 | n2,
        BinaryOp::BitXor => n1 ^ n2,
        BinaryOp::Shl => {
            if n2 >= 64 {
                0
            } else {
                n1.wrapping_shl(n2 as u32)
            }
        }
        BinaryOp::Shr => {
            if n2 >= 64 {
                n1 >> 63
            } else {
                n1 >> n2
            }
        }
        BinaryOp::Eq => i64::from(n1 == n2),
        BinaryOp::Ne => i64::from(n1 != n2),
        BinaryOp::Lt => i64::from(n1 < n2),
        BinaryOp::Le => i64::from(n1 <= n2),
        BinaryOp::Gt => i64::from(n1 > n2),
        BinaryOp::Ge => i64::from(n1 >= n2),
        BinaryOp::LogicAnd | BinaryOp::LogicOr => unreachable!("short-circuit ops"),
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Operand matching and instruction encoding.
//!
//! [`eval_as`] decides whether an expression fits an operand shape and, when
//! it does, yields the operand's encoded bytes (empty for register and
//! condition matches). [`encode`] tries every variant of a mnemonic against
//! the parsed argument vector; the table guarantees at most one can match.
//!
//! Operand bytes are spliced after the first two fixed bytes of the pattern:
//! for the three-byte `DD CB op` bit/rotate patterns this puts the
//! displacement between the prefix and the final opcode byte, which is the
//! layout the hardware wants.

use crate::core::expr::{int_value, EvalContext, EvalError, Expr, IntEval};
use crate::core::tokenizer::Span;
use crate::z80::args::{is_valid_fixed, shape_len, Arg, ArgKind, Shape};
use crate::z80::table::Variants;
use crate::z80::{condition_arg, register_arg};

/// Match the argument vector against one variant shape, yielding the
/// concatenated operand bytes on success.
pub fn args_compatible(
    ctx: &dyn EvalContext,
    args: &[Expr],
    shape: Shape,
) -> Result<Option<Vec<u8>>, EvalError> {
    if args.len() != shape_len(shape) {
        return Ok(None);
    }
    match shape_len(shape) {
        0 => Ok(Some(Vec::new())),
        1 => eval_as(ctx, &args[0], shape.0, true),
        _ => {
            let Some(mut bytes) = eval_as(ctx, &args[0], shape.0, true)? else {
                return Ok(None);
            };
            let Some(more) = eval_as(ctx, &args[1], shape.1, true)? else {
                return Ok(None);
            };
            bytes.extend_from_slice(&more);
            Ok(Some(bytes))
        }
    }
}

/// Select the matching variant and produce the full instruction encoding.
///
/// Returns `Ok(None)` when no variant accepts the arguments. Two variants
/// accepting the same arguments is a table-construction bug and panics.
pub fn encode(
    ctx: &dyn EvalContext,
    variants: &Variants,
    mnemonic: &str,
    args: &[Expr],
) -> Result<Option<Vec<u8>>, EvalError> {
    let mut found: Option<Vec<u8>> = None;
    for (&shape, pattern) in variants {
        let Some(op_bytes) = args_compatible(ctx, args, shape)? else {
            continue;
        };
        if found.is_some() {
            panic!("more than one variant of {mnemonic} matches {args:?}");
        }
        let n = pattern.len().min(2);
        let mut out = pattern[..n].to_vec();
        out.extend_from_slice(&op_bytes);
        out.extend_from_slice(&pattern[n..]);
        found = Some(out);
    }
    Ok(found)
}

/// Does `expr` fit operand shape `a`? `top` is true for a whole operand:
/// only there does a bracket mean indirection rather than grouping.
pub fn eval_as(
    ctx: &dyn EvalContext,
    expr: &Expr,
    a: Arg,
    top: bool,
) -> Result<Option<Vec<u8>>, EvalError> {
    match expr {
        Expr::Int(i, span) => eval_int_as(IntEval::Known(*i), a, *span),
        Expr::Char(c, span) => match a.kind() {
            ArgKind::Int => serialize_int(IntEval::Known(i64::from(*c)), a, *span),
            _ => Ok(None),
        },
        Expr::Str(bytes, _) => {
            if a == Arg::ArgString {
                Ok(Some(bytes.clone()))
            } else {
                Ok(None)
            }
        }
        Expr::Ident(name, span) => eval_ident_as(ctx, name, a, *span),
        Expr::Unary { span, .. } | Expr::Binary { span, .. } => {
            match int_value(expr, ctx)? {
                IntEval::NotInt => Ok(None),
                value => eval_int_as(value, a, *span),
            }
        }
        Expr::Bracket(inner, span) => eval_bracket_as(ctx, inner, a, top, *span),
    }
}

/// A computed integer against an operand shape.
fn eval_int_as(value: IntEval, a: Arg, span: Span) -> Result<Option<Vec<u8>>, EvalError> {
    match a.kind() {
        ArgKind::Int | ArgKind::Address => serialize_int(value, a, span),
        // A raw integer is not a relative-jump target.
        ArgKind::RelAddress => Ok(None),
        ArgKind::Fixed => match value {
            IntEval::Known(i) => {
                if !is_valid_fixed(i) {
                    return Err(EvalError::new(
                        format!("{i:#x} is not a valid argument"),
                        span,
                    ));
                }
                Ok((i == a.fixed_value()).then(Vec::new))
            }
            _ => Ok(None),
        },
        _ => Ok(None),
    }
}

fn eval_ident_as(
    ctx: &dyn EvalContext,
    name: &str,
    a: Arg,
    span: Span,
) -> Result<Option<Vec<u8>>, EvalError> {
    match a.kind() {
        ArgKind::Reg => Ok((register_arg(name) == Some(a)).then(Vec::new)),
        ArgKind::Cc => Ok((condition_arg(name) == Some(a)).then(Vec::new)),
        ArgKind::Int | ArgKind::Address | ArgKind::RelAddress => {
            if ctx.is_reserved(name) {
                return Ok(None);
            }
            let value = ctx.lookup_value(name, span)?;
            if a.kind() == ArgKind::RelAddress {
                // Pass 0 emits displacement 0: the label may not exist yet
                // and 0 is always in range. Pass 1 computes it for real,
                // counting from the byte after this two-byte instruction.
                if ctx.pass() == 0 {
                    return serialize_int(IntEval::Known(0), a, span);
                }
                let IntEval::Known(target) = value else {
                    return Ok(None);
                };
                let disp = target - i64::from(ctx.pc().wrapping_add(2));
                return serialize_int(IntEval::Known(disp), a, span);
            }
            serialize_int(value, a, span)
        }
        _ => Ok(None),
    }
}

fn eval_bracket_as(
    ctx: &dyn EvalContext,
    inner: &Expr,
    a: Arg,
    top: bool,
    span: Span,
) -> Result<Option<Vec<u8>>, EvalError> {
    match a.kind() {
        ArgKind::Int => {
            // At the top of an operand a bracketed integer reads as
            // indirection, which this shape is not.
            if top {
                return Ok(None);
            }
            eval_as(ctx, inner, a, false)
        }
        ArgKind::IndReg => {
            let matched = eval_as(ctx, inner, a.ind_register(), false)?;
            Ok(matched.map(|_| Vec::new()))
        }
        ArgKind::IndAddress => eval_as(ctx, inner, Arg::Addr16, false),
        ArgKind::IndRegPlusInt => eval_indexed(ctx, inner, a, span),
        ArgKind::Port => eval_as(ctx, inner, Arg::Const8, false),
        ArgKind::PortC => eval_as(ctx, inner, Arg::RegC, false),
        _ => Ok(None),
    }
}

/// `(ix)`, `(ix+d)`, `(ix-d)` and the iy equivalents. A bare register means
/// displacement zero.
fn eval_indexed(
    ctx: &dyn EvalContext,
    inner: &Expr,
    a: Arg,
    span: Span,
) -> Result<Option<Vec<u8>>, EvalError> {
    use crate::core::expr::BinaryOp;
    match inner {
        Expr::Ident(..) => {
            let matched = eval_as(ctx, inner, a.ind_register(), false)?;
            Ok(matched.map(|_| vec![0]))
        }
        Expr::Binary {
            op, left, right, ..
        } => {
            if eval_as(ctx, left, a.ind_register(), false)?.is_none() {
                return Ok(None);
            }
            if !matches!(*op, BinaryOp::Add | BinaryOp::Subtract) {
                return Err(EvalError::new(
                    format!("expected {a}+n or {a}-n, got {}", op.as_str()),
                    span,
                ));
            }
            let n = match int_value(right, ctx)? {
                IntEval::Known(n) => n,
                IntEval::Unknown => return Ok(Some(vec![0])),
                IntEval::NotInt => {
                    return Err(EvalError::new(
                        format!("({a}+n) right hand side must be int"),
                        span,
                    ))
                }
            };
            let n = if *op == BinaryOp::Subtract { -n } else { n };
            if !(-128..=127).contains(&n) {
                return Err(EvalError::new(
                    format!("({a}{n:+}) out of range -128 to 127"),
                    span,
                ));
            }
            serialize_int(IntEval::Known(n), Arg::Const8, span)
        }
        _ => Ok(None),
    }
}

/// Encode an integer operand, range-checked. Unknown values (pass-0 forward
/// labels) encode as placeholder zeros of the right width.
fn serialize_int(value: IntEval, a: Arg, span: Span) -> Result<Option<Vec<u8>>, EvalError> {
    let (min, max, size) = a.range();
    let i = match value {
        IntEval::Known(i) => i,
        IntEval::Unknown => return Ok(Some(vec![0; size])),
        IntEval::NotInt => return Ok(None),
    };
    if i < min || i > max {
        return Err(EvalError::new(format!("{i:#x} is out of range"), span));
    }
    let bytes = match size {
        1 => vec![i as u8],
        _ => {
            if a == Arg::Const16Be {
                (i as u16).to_be_bytes().to_vec()
            } else {
                (i as u16).to_le_bytes().to_vec()
            }
        }
    };
    Ok(Some(bytes))
}

#[cfg(test)]
mod tests {
    use super::{encode, eval_as};
    use crate::core::expr::{BinaryOp, EvalContext, EvalError, Expr, IntEval};
    use crate::core::tokenizer::Span;
    use crate::z80::args::Arg;
    use crate::z80::table::{CoreLevel, InstructionSet};

    struct Ctx {
        pass: u8,
        pc: u16,
    }

    impl EvalContext for Ctx {
        fn lookup_value(&self, name: &str, span: Span) -> Result<IntEval, EvalError> {
            match name {
                "data" => Ok(IntEval::Known(0x8005)),
                "fwd" if self.pass == 0 => Ok(IntEval::Unknown),
                _ => Err(EvalError::new(format!("unknown label {name:?}"), span)),
            }
        }

        fn is_reserved(&self, name: &str) -> bool {
            crate::z80::is_reserved_name(name)
        }

        fn pass(&self) -> u8 {
            self.pass
        }

        fn pc(&self) -> u16 {
            self.pc
        }
    }

    fn ctx() -> Ctx {
        Ctx { pass: 1, pc: 0x8000 }
    }

    fn ident(name: &str) -> Expr {
        Expr::Ident(name.to_string(), Span::default())
    }

    fn int(i: i64) -> Expr {
        Expr::Int(i, Span::default())
    }

    fn bracket(e: Expr) -> Expr {
        Expr::Bracket(Box::new(e), Span::default())
    }

    fn plus(l: Expr, r: Expr) -> Expr {
        Expr::Binary {
            op: BinaryOp::Add,
            left: Box::new(l),
            right: Box::new(r),
            span: Span::default(),
        }
    }

    #[test]
    fn registers_match_without_bytes() {
        let got = eval_as(&ctx(), &ident("hl"), Arg::RegHL, true).unwrap();
        assert_eq!(got, Some(vec![]));
        let got = eval_as(&ctx(), &ident("hl"), Arg::RegDE, true).unwrap();
        assert_eq!(got, None);
    }

    #[test]
    fn const16_little_endian_const16be_big_endian() {
        let got = eval_as(&ctx(), &int(0x4243), Arg::Const16, true).unwrap();
        assert_eq!(got, Some(vec![0x43, 0x42]));
        let got = eval_as(&ctx(), &int(0x4243), Arg::Const16Be, true).unwrap();
        assert_eq!(got, Some(vec![0x42, 0x43]));
    }

    #[test]
    fn const8_allows_signed_and_unsigned() {
        assert_eq!(
            eval_as(&ctx(), &int(-2), Arg::Const8, true).unwrap(),
            Some(vec![254])
        );
        assert_eq!(
            eval_as(&ctx(), &int(255), Arg::Const8, true).unwrap(),
            Some(vec![255])
        );
        assert!(eval_as(&ctx(), &int(256), Arg::Const8, true).is_err());
    }

    #[test]
    fn bracketed_int_is_not_a_plain_immediate_at_top() {
        let e = bracket(int(5));
        assert_eq!(eval_as(&ctx(), &e, Arg::Const8, true).unwrap(), None);
        // ...but inside arithmetic it is ordinary grouping.
        assert_eq!(
            eval_as(&ctx(), &e, Arg::Const8, false).unwrap(),
            Some(vec![5])
        );
    }

    #[test]
    fn indirect_register_and_address() {
        let e = bracket(ident("hl"));
        assert_eq!(eval_as(&ctx(), &e, Arg::IndHL, true).unwrap(), Some(vec![]));
        let e = bracket(int(0x1234));
        assert_eq!(
            eval_as(&ctx(), &e, Arg::Ind16, true).unwrap(),
            Some(vec![0x34, 0x12])
        );
    }

    #[test]
    fn indexed_displacements() {
        // (ix) is displacement zero.
        let e = bracket(ident("ix"));
        assert_eq!(
            eval_as(&ctx(), &e, Arg::IndIXPlus, true).unwrap(),
            Some(vec![0])
        );
        let e = bracket(plus(ident("ix"), int(5)));
        assert_eq!(
            eval_as(&ctx(), &e, Arg::IndIXPlus, true).unwrap(),
            Some(vec![5])
        );
        let e = Expr::Bracket(
            Box::new(Expr::Binary {
                op: BinaryOp::Subtract,
                left: Box::new(ident("ix")),
                right: Box::new(int(1)),
                span: Span::default(),
            }),
            Span::default(),
        );
        assert_eq!(
            eval_as(&ctx(), &e, Arg::IndIXPlus, true).unwrap(),
            Some(vec![0xff])
        );
        // Out of range.
        let e = bracket(plus(ident("ix"), int(200)));
        assert!(eval_as(&ctx(), &e, Arg::IndIXPlus, true).is_err());
        // Wrong register inside the bracket: no match, not an error.
        let e = bracket(plus(ident("iy"), int(5)));
        assert_eq!(eval_as(&ctx(), &e, Arg::IndIXPlus, true).unwrap(), None);
    }

    #[test]
    fn relative_displacement_counts_from_next_instruction() {
        let got = eval_as(
            &Ctx { pass: 1, pc: 0x8000 },
            &ident("data"),
            Arg::RelAddr8,
            true,
        )
        .unwrap();
        // data = 0x8005, pc+2 = 0x8002 -> 3.
        assert_eq!(got, Some(vec![3]));
        // Pass 0 always emits 0.
        let got = eval_as(
            &Ctx { pass: 0, pc: 0x8000 },
            &ident("fwd"),
            Arg::RelAddr8,
            true,
        )
        .unwrap();
        assert_eq!(got, Some(vec![0]));
    }

    #[test]
    fn fixed_args_check_the_allowed_set() {
        assert_eq!(
            eval_as(&ctx(), &int(0x20), Arg::Val20, true).unwrap(),
            Some(vec![])
        );
        assert_eq!(eval_as(&ctx(), &int(0x20), Arg::Val10, true).unwrap(), None);
        assert!(eval_as(&ctx(), &int(9), Arg::Val10, true).is_err());
    }

    #[test]
    fn encode_splices_displacement_into_ddcb() {
        let table = InstructionSet::build(CoreLevel::Standard);
        let args = vec![int(4), bracket(plus(ident("ix"), int(10)))];
        let got = encode(&ctx(), table.variants("bit").unwrap(), "bit", &args)
            .unwrap()
            .expect("match");
        assert_eq!(got, vec![0xdd, 0xcb, 0x0a, 0x66]);
    }

    #[test]
    fn encode_finds_nothing_for_bad_args() {
        let table = InstructionSet::build(CoreLevel::Standard);
        let args = vec![bracket(ident("hl")), bracket(ident("hl"))];
        let got = encode(&ctx(), table.variants("ld").unwrap(), "ld", &args).unwrap();
        assert_eq!(got, None);
    }
}

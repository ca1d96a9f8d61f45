// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! The instruction catalog.
//!
//! Base Z80 first: a zero-operand map and a multi-operand map built with the
//! row helpers (the B,C,D,E,H,L,(HL),A register order shared by most opcode
//! rows). From the base, the IX and IY tables are derived by renaming
//! `hl -> ix` and `(hl) -> (ix+*)` and prefixing `0xDD`/`0xFD`, minus a small
//! exclusion set. The Spectrum Next extensions merge on top, gated by the
//! core level.
//!
//! Construction validates the whole catalog: a duplicate (mnemonic, shape)
//! entry is a table bug and panics.

use crate::z80::args::{shape1, shape2, shape_display, Arg, Shape, VOID_SHAPE};
use std::collections::HashMap;

/// Which instruction set to accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum CoreLevel {
    #[default]
    Standard,
    Next1,
    Next2,
}

/// Operand-shape -> fixed byte pattern for one mnemonic.
pub type Variants = HashMap<Shape, Vec<u8>>;

#[derive(Debug)]
pub struct InstructionSet {
    commands: HashMap<String, Variants>,
}

impl InstructionSet {
    #[must_use]
    pub fn build(core: CoreLevel) -> Self {
        let base = base_commands();
        let ix = derive_indexed(&base, Arg::RegIX, Arg::IndIXPlus, 0xdd, Arg::IndIX);
        let iy = derive_indexed(&base, Arg::RegIY, Arg::IndIYPlus, 0xfd, Arg::IndIY);
        let mut commands = join_commands(vec![base, ix, iy]);

        for (name, bytes) in zero_arg_commands() {
            let prev = commands.insert(name.to_string(), Variants::from([(VOID_SHAPE, bytes)]));
            if prev.is_some() {
                panic!("duplicate command: {name}");
            }
        }

        if core >= CoreLevel::Next1 {
            for (name, bytes) in next_zero_arg_commands() {
                let prev =
                    commands.insert(name.to_string(), Variants::from([(VOID_SHAPE, bytes)]));
                if prev.is_some() {
                    panic!("duplicate command: {name}");
                }
            }
            merge_commands(&mut commands, next_commands());
        }
        if core >= CoreLevel::Next2 {
            merge_commands(&mut commands, next_core2_commands());
        }

        Self { commands }
    }

    #[must_use]
    pub fn variants(&self, mnemonic: &str) -> Option<&Variants> {
        self.commands.get(mnemonic)
    }

    #[must_use]
    pub fn is_mnemonic(&self, mnemonic: &str) -> bool {
        self.commands.contains_key(mnemonic)
    }

    /// Total variant count, for sanity checks.
    #[must_use]
    pub fn variant_count(&self) -> usize {
        self.commands.values().map(HashMap::len).sum()
    }
}

/// One opcode row: the operands B,C,D,E,H,L,(HL),A encode as base..base+7.
/// With `first` set the row fills the second operand slot (`ld b, X`);
/// without it the row is single-operand (`sub X`).
fn std_opts(first: Option<Arg>, base: u8, prefix: &[u8]) -> Variants {
    let row = [
        Arg::RegB,
        Arg::RegC,
        Arg::RegD,
        Arg::RegE,
        Arg::RegH,
        Arg::RegL,
        Arg::IndHL,
        Arg::RegA,
    ];
    let mut out = Variants::new();
    for (i, reg) in row.into_iter().enumerate() {
        let shape = match first {
            Some(first) => shape2(first, reg),
            None => shape1(reg),
        };
        let mut bytes = prefix.to_vec();
        bytes.push(base + i as u8);
        out.insert(shape, bytes);
    }
    out
}

fn join_opts(parts: Vec<Variants>) -> Variants {
    let mut out = Variants::new();
    for part in parts {
        for (shape, bytes) in part {
            if out.insert(shape, bytes).is_some() {
                panic!("{} found in two args", shape_display(shape));
            }
        }
    }
    out
}

fn rm_opt(mut variants: Variants, shape: Shape) -> Variants {
    if variants.remove(&shape).is_none() {
        panic!("asked to remove {}, but not found", shape_display(shape));
    }
    variants
}

fn join_commands(maps: Vec<HashMap<String, Variants>>) -> HashMap<String, Variants> {
    let mut out: HashMap<String, Variants> = HashMap::new();
    for map in maps {
        for (name, variants) in map {
            let entry = out.entry(name.clone()).or_default();
            for (shape, bytes) in variants {
                if entry.insert(shape, bytes).is_some() {
                    panic!(
                        "duplicate args {} found for {name}",
                        shape_display(shape)
                    );
                }
            }
        }
    }
    out
}

fn merge_commands(commands: &mut HashMap<String, Variants>, extra: HashMap<String, Variants>) {
    for (name, variants) in extra {
        let entry = commands.entry(name.clone()).or_default();
        for (shape, bytes) in variants {
            if entry.insert(shape, bytes).is_some() {
                panic!("duplicate args {} found for {name}", shape_display(shape));
            }
        }
    }
}

/// Derive the IX (or IY) table: rename `hl`/`(hl)`, prefix every pattern,
/// skip the exclusions, then add the explicit `jp (ix)` form.
fn derive_indexed(
    base: &HashMap<String, Variants>,
    reg: Arg,
    ind_plus: Arg,
    prefix: u8,
    ind: Arg,
) -> HashMap<String, Variants> {
    let rename = |a: Arg| match a {
        Arg::RegHL => reg,
        Arg::IndHL => ind_plus,
        other => other,
    };
    let excluded = |name: &str, shape: Shape| match name {
        "ex" => shape == shape2(Arg::RegDE, Arg::RegHL),
        "jp" | "sll" => shape == shape1(Arg::IndHL),
        _ => false,
    };

    let mut out: HashMap<String, Variants> = HashMap::new();
    for (name, variants) in base {
        for (&shape, bytes) in variants {
            if excluded(name, shape) {
                continue;
            }
            let renamed = (rename(shape.0), rename(shape.1));
            if renamed == shape {
                continue;
            }
            let mut prefixed = vec![prefix];
            prefixed.extend_from_slice(bytes);
            out.entry(name.clone()).or_default().insert(renamed, prefixed);
        }
    }

    out.entry("jp".to_string())
        .or_default()
        .insert(shape1(ind), vec![prefix, 0xe9]);
    out
}

fn zero_arg_commands() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("nop", vec![0x00]),
        ("di", vec![0xf3]),
        ("rlca", vec![0x07]),
        ("rla", vec![0x17]),
        ("daa", vec![0x27]),
        ("scf", vec![0x37]),
        ("exx", vec![0xd9]),
        ("ei", vec![0xfb]),
        ("rrca", vec![0x0f]),
        ("rra", vec![0x1f]),
        ("cpl", vec![0x2f]),
        ("ccf", vec![0x3f]),
        ("halt", vec![0x76]),
        ("ldi", vec![0xed, 0xa0]),
        ("ldir", vec![0xed, 0xb0]),
        ("cpi", vec![0xed, 0xa1]),
        ("cpir", vec![0xed, 0xb1]),
        ("ini", vec![0xed, 0xa2]),
        ("inir", vec![0xed, 0xb2]),
        ("outi", vec![0xed, 0xa3]),
        ("otir", vec![0xed, 0xb3]),
        ("neg", vec![0xed, 0x44]),
        ("reti", vec![0xed, 0x4d]),
        ("retn", vec![0xed, 0x45]),
        ("rrd", vec![0xed, 0x67]),
        ("ldd", vec![0xed, 0xa8]),
        ("lddr", vec![0xed, 0xb8]),
        ("cpd", vec![0xed, 0xa9]),
        ("cpdr", vec![0xed, 0xb9]),
        ("ind", vec![0xed, 0xaa]),
        ("indr", vec![0xed, 0xba]),
        ("outd", vec![0xed, 0xab]),
        ("otdr", vec![0xed, 0xbb]),
        ("rld", vec![0xed, 0x6f]),
    ]
}

/// Zero-operand Spectrum Next extensions (core level 1).
fn next_zero_arg_commands() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("ldix", vec![0xed, 0xa4]),
        ("ldws", vec![0xed, 0xa5]),
        ("ldirx", vec![0xed, 0xb4]),
        ("lddx", vec![0xed, 0xac]),
        ("lddrx", vec![0xed, 0xbc]),
        ("ldpirx", vec![0xed, 0xb7]),
        ("outinb", vec![0xed, 0x90]),
        ("swapnib", vec![0xed, 0x23]),
        ("pixeldn", vec![0xed, 0x93]),
        ("pixelad", vec![0xed, 0x94]),
        ("setae", vec![0xed, 0x95]),
    ]
}

fn base_commands() -> HashMap<String, Variants> {
    use crate::z80::args::Arg::*;
    let mut m: HashMap<String, Variants> = HashMap::new();
    let mut cmd = |name: &str, variants: Variants| {
        m.insert(name.to_string(), variants);
    };

    cmd(
        "inc",
        Variants::from([
            (shape1(RegA), vec![0x3c]),
            (shape1(RegB), vec![0x04]),
            (shape1(RegC), vec![0x0c]),
            (shape1(RegD), vec![0x14]),
            (shape1(RegE), vec![0x1c]),
            (shape1(RegH), vec![0x24]),
            (shape1(RegL), vec![0x2c]),
            (shape1(RegBC), vec![0x03]),
            (shape1(RegDE), vec![0x13]),
            (shape1(RegHL), vec![0x23]),
            (shape1(RegSP), vec![0x33]),
            (shape1(IndHL), vec![0x34]),
        ]),
    );
    cmd(
        "dec",
        Variants::from([
            (shape1(RegA), vec![0x3d]),
            (shape1(RegB), vec![0x05]),
            (shape1(RegC), vec![0x0d]),
            (shape1(RegD), vec![0x15]),
            (shape1(RegE), vec![0x1d]),
            (shape1(RegH), vec![0x25]),
            (shape1(RegL), vec![0x2d]),
            (shape1(RegBC), vec![0x0b]),
            (shape1(RegDE), vec![0x1b]),
            (shape1(RegHL), vec![0x2b]),
            (shape1(RegSP), vec![0x3b]),
            (shape1(IndHL), vec![0x35]),
        ]),
    );
    cmd("djnz", Variants::from([(shape1(RelAddr8), vec![0x10])]));
    cmd(
        "sub",
        join_opts(vec![
            std_opts(None, 0x90, &[]),
            Variants::from([(shape1(Const8), vec![0xd6])]),
        ]),
    );
    cmd(
        "and",
        join_opts(vec![
            std_opts(None, 0xa0, &[]),
            Variants::from([(shape1(Const8), vec![0xe6])]),
        ]),
    );
    cmd(
        "xor",
        join_opts(vec![
            std_opts(None, 0xa8, &[]),
            Variants::from([(shape1(Const8), vec![0xee])]),
        ]),
    );
    cmd(
        "or",
        join_opts(vec![
            std_opts(None, 0xb0, &[]),
            Variants::from([(shape1(Const8), vec![0xf6])]),
        ]),
    );
    cmd(
        "cp",
        join_opts(vec![
            std_opts(None, 0xb8, &[]),
            Variants::from([(shape1(Const8), vec![0xfe])]),
        ]),
    );
    cmd("rlc", std_opts(None, 0x00, &[0xcb]));
    cmd("rrc", std_opts(None, 0x08, &[0xcb]));
    cmd("rl", std_opts(None, 0x10, &[0xcb]));
    cmd("rr", std_opts(None, 0x18, &[0xcb]));
    cmd("sla", std_opts(None, 0x20, &[0xcb]));
    cmd("sra", std_opts(None, 0x28, &[0xcb]));
    cmd("sll", std_opts(None, 0x30, &[0xcb]));
    cmd("srl", std_opts(None, 0x38, &[0xcb]));
    cmd(
        "ld",
        join_opts(vec![
            Variants::from([
                (shape2(RegBC, Const16), vec![0x01]),
                (shape2(RegDE, Const16), vec![0x11]),
                (shape2(RegHL, Const16), vec![0x21]),
                (shape2(RegSP, Const16), vec![0x31]),
                (shape2(IndBC, RegA), vec![0x02]),
                (shape2(IndDE, RegA), vec![0x12]),
                (shape2(Ind16, RegHL), vec![0x22]),
                (shape2(Ind16, RegA), vec![0x32]),
                (shape2(RegB, Const8), vec![0x06]),
                (shape2(RegD, Const8), vec![0x16]),
                (shape2(RegH, Const8), vec![0x26]),
                (shape2(IndHL, Const8), vec![0x36]),
                (shape2(RegA, IndBC), vec![0x0a]),
                (shape2(RegA, IndDE), vec![0x1a]),
                (shape2(RegHL, Ind16), vec![0x2a]),
                (shape2(RegA, Ind16), vec![0x3a]),
                (shape2(RegC, Const8), vec![0x0e]),
                (shape2(RegE, Const8), vec![0x1e]),
                (shape2(RegL, Const8), vec![0x2e]),
                (shape2(RegA, Const8), vec![0x3e]),
                (shape2(RegSP, RegHL), vec![0xf9]),
                (shape2(Ind16, RegBC), vec![0xed, 0x43]),
                (shape2(Ind16, RegDE), vec![0xed, 0x53]),
                (shape2(Ind16, RegSP), vec![0xed, 0x73]),
                (shape2(RegI, RegA), vec![0xed, 0x47]),
                (shape2(RegA, RegI), vec![0xed, 0x57]),
                (shape2(RegBC, Ind16), vec![0xed, 0x4b]),
                (shape2(RegDE, Ind16), vec![0xed, 0x5b]),
                (shape2(RegSP, Ind16), vec![0xed, 0x7b]),
                (shape2(RegR, RegA), vec![0xed, 0x4f]),
                (shape2(RegA, RegR), vec![0xed, 0x5f]),
            ]),
            std_opts(Some(RegB), 0x40, &[]),
            std_opts(Some(RegD), 0x50, &[]),
            std_opts(Some(RegH), 0x60, &[]),
            // ld (hl),(hl) does not exist; its slot is halt.
            rm_opt(std_opts(Some(IndHL), 0x70, &[]), shape2(IndHL, IndHL)),
            std_opts(Some(RegC), 0x48, &[]),
            std_opts(Some(RegE), 0x58, &[]),
            std_opts(Some(RegL), 0x68, &[]),
            std_opts(Some(RegA), 0x78, &[]),
        ]),
    );
    cmd(
        "ex",
        Variants::from([
            (shape2(RegAF, RegAF2), vec![0x08]),
            (shape2(IndSP, RegHL), vec![0xe3]),
            (shape2(RegDE, RegHL), vec![0xeb]),
        ]),
    );
    cmd(
        "push",
        Variants::from([
            (shape1(RegBC), vec![0xc5]),
            (shape1(RegDE), vec![0xd5]),
            (shape1(RegHL), vec![0xe5]),
            (shape1(RegAF), vec![0xf5]),
        ]),
    );
    cmd(
        "pop",
        Variants::from([
            (shape1(RegBC), vec![0xc1]),
            (shape1(RegDE), vec![0xd1]),
            (shape1(RegHL), vec![0xe1]),
            (shape1(RegAF), vec![0xf1]),
        ]),
    );
    cmd(
        "add",
        join_opts(vec![
            Variants::from([
                (shape2(RegHL, RegBC), vec![0x09]),
                (shape2(RegHL, RegDE), vec![0x19]),
                (shape2(RegHL, RegHL), vec![0x29]),
                (shape2(RegHL, RegSP), vec![0x39]),
                (shape2(RegA, Const8), vec![0xc6]),
            ]),
            std_opts(Some(RegA), 0x80, &[]),
        ]),
    );
    cmd(
        "adc",
        join_opts(vec![
            Variants::from([
                (shape2(RegA, Const8), vec![0xce]),
                (shape2(RegHL, RegBC), vec![0xed, 0x4a]),
                (shape2(RegHL, RegDE), vec![0xed, 0x5a]),
                (shape2(RegHL, RegHL), vec![0xed, 0x6a]),
                (shape2(RegHL, RegSP), vec![0xed, 0x7a]),
            ]),
            std_opts(Some(RegA), 0x88, &[]),
        ]),
    );
    cmd(
        "sbc",
        join_opts(vec![
            Variants::from([
                (shape2(RegA, Const8), vec![0xde]),
                (shape2(RegHL, RegBC), vec![0xed, 0x42]),
                (shape2(RegHL, RegDE), vec![0xed, 0x52]),
                (shape2(RegHL, RegHL), vec![0xed, 0x62]),
                (shape2(RegHL, RegSP), vec![0xed, 0x72]),
            ]),
            std_opts(Some(RegA), 0x98, &[]),
        ]),
    );
    cmd(
        "call",
        Variants::from([
            (shape2(CcNZ, Addr16), vec![0xc4]),
            (shape2(CcNC, Addr16), vec![0xd4]),
            (shape2(CcPO, Addr16), vec![0xe4]),
            (shape2(CcP, Addr16), vec![0xf4]),
            (shape2(CcZ, Addr16), vec![0xcc]),
            (shape2(CcC, Addr16), vec![0xdc]),
            (shape2(CcPE, Addr16), vec![0xec]),
            (shape2(CcM, Addr16), vec![0xfc]),
            (shape1(Addr16), vec![0xcd]),
        ]),
    );
    cmd(
        "jp",
        Variants::from([
            (shape2(CcNZ, Addr16), vec![0xc2]),
            (shape2(CcNC, Addr16), vec![0xd2]),
            (shape2(CcPO, Addr16), vec![0xe2]),
            (shape2(CcP, Addr16), vec![0xf2]),
            (shape1(Addr16), vec![0xc3]),
            (shape2(CcZ, Addr16), vec![0xca]),
            (shape2(CcC, Addr16), vec![0xda]),
            (shape2(CcPE, Addr16), vec![0xea]),
            (shape2(CcM, Addr16), vec![0xfa]),
            (shape1(IndHL), vec![0xe9]),
        ]),
    );
    cmd(
        "jr",
        Variants::from([
            (shape1(RelAddr8), vec![0x18]),
            (shape2(CcZ, RelAddr8), vec![0x28]),
            (shape2(CcC, RelAddr8), vec![0x38]),
            (shape2(CcNZ, RelAddr8), vec![0x20]),
            (shape2(CcNC, RelAddr8), vec![0x30]),
        ]),
    );
    cmd(
        "ret",
        Variants::from([
            (VOID_SHAPE, vec![0xc9]),
            (shape1(CcNZ), vec![0xc0]),
            (shape1(CcNC), vec![0xd0]),
            (shape1(CcPO), vec![0xe0]),
            (shape1(CcP), vec![0xf0]),
            (shape1(CcZ), vec![0xc8]),
            (shape1(CcC), vec![0xd8]),
            (shape1(CcPE), vec![0xe8]),
            (shape1(CcM), vec![0xf8]),
        ]),
    );
    cmd(
        "rst",
        Variants::from([
            (shape1(Val00), vec![0xc7]),
            (shape1(Val10), vec![0xd7]),
            (shape1(Val20), vec![0xe7]),
            (shape1(Val30), vec![0xf7]),
            (shape1(Val08), vec![0xcf]),
            (shape1(Val18), vec![0xdf]),
            (shape1(Val28), vec![0xef]),
            (shape1(Val38), vec![0xff]),
        ]),
    );
    cmd(
        "bit",
        join_opts(vec![
            std_opts(Some(Val00), 0x40, &[0xcb]),
            std_opts(Some(Val01), 0x48, &[0xcb]),
            std_opts(Some(Val02), 0x50, &[0xcb]),
            std_opts(Some(Val03), 0x58, &[0xcb]),
            std_opts(Some(Val04), 0x60, &[0xcb]),
            std_opts(Some(Val05), 0x68, &[0xcb]),
            std_opts(Some(Val06), 0x70, &[0xcb]),
            std_opts(Some(Val07), 0x78, &[0xcb]),
        ]),
    );
    cmd(
        "res",
        join_opts(vec![
            std_opts(Some(Val00), 0x80, &[0xcb]),
            std_opts(Some(Val01), 0x88, &[0xcb]),
            std_opts(Some(Val02), 0x90, &[0xcb]),
            std_opts(Some(Val03), 0x98, &[0xcb]),
            std_opts(Some(Val04), 0xa0, &[0xcb]),
            std_opts(Some(Val05), 0xa8, &[0xcb]),
            std_opts(Some(Val06), 0xb0, &[0xcb]),
            std_opts(Some(Val07), 0xb8, &[0xcb]),
        ]),
    );
    cmd(
        "set",
        join_opts(vec![
            std_opts(Some(Val00), 0xc0, &[0xcb]),
            std_opts(Some(Val01), 0xc8, &[0xcb]),
            std_opts(Some(Val02), 0xd0, &[0xcb]),
            std_opts(Some(Val03), 0xd8, &[0xcb]),
            std_opts(Some(Val04), 0xe0, &[0xcb]),
            std_opts(Some(Val05), 0xe8, &[0xcb]),
            std_opts(Some(Val06), 0xf0, &[0xcb]),
            std_opts(Some(Val07), 0xf8, &[0xcb]),
        ]),
    );
    cmd(
        "in",
        Variants::from([
            (shape2(RegA, Port8), vec![0xdb]),
            (shape2(RegB, PortC), vec![0xed, 0x40]),
            (shape2(RegD, PortC), vec![0xed, 0x50]),
            (shape2(RegH, PortC), vec![0xed, 0x60]),
            (shape2(RegC, PortC), vec![0xed, 0x48]),
            (shape2(RegE, PortC), vec![0xed, 0x58]),
            (shape2(RegL, PortC), vec![0xed, 0x68]),
            (shape2(RegA, PortC), vec![0xed, 0x78]),
        ]),
    );
    cmd(
        "out",
        Variants::from([
            (shape2(Port8, RegA), vec![0xd3]),
            (shape2(PortC, RegB), vec![0xed, 0x41]),
            (shape2(PortC, RegD), vec![0xed, 0x51]),
            (shape2(PortC, RegH), vec![0xed, 0x61]),
            (shape2(PortC, RegC), vec![0xed, 0x49]),
            (shape2(PortC, RegE), vec![0xed, 0x59]),
            (shape2(PortC, RegL), vec![0xed, 0x69]),
            (shape2(PortC, RegA), vec![0xed, 0x79]),
        ]),
    );
    cmd(
        "im",
        Variants::from([
            (shape1(Val00), vec![0xed, 0x46]),
            (shape1(Val01), vec![0xed, 0x56]),
            (shape1(Val02), vec![0xed, 0x5e]),
        ]),
    );

    m
}

/// Multi-operand Spectrum Next extensions (core level 1).
fn next_commands() -> HashMap<String, Variants> {
    use crate::z80::args::Arg::*;
    HashMap::from([
        (
            "mul".to_string(),
            Variants::from([(shape2(RegD, RegE), vec![0xed, 0x30])]),
        ),
        (
            "add".to_string(),
            Variants::from([
                (shape2(RegHL, RegA), vec![0xed, 0x31]),
                (shape2(RegDE, RegA), vec![0xed, 0x32]),
                (shape2(RegBC, RegA), vec![0xed, 0x33]),
                (shape2(RegHL, Const16), vec![0xed, 0x34]),
                (shape2(RegDE, Const16), vec![0xed, 0x35]),
                (shape2(RegBC, Const16), vec![0xed, 0x36]),
            ]),
        ),
        (
            "push".to_string(),
            Variants::from([(shape1(Const16Be), vec![0xed, 0x8a])]),
        ),
        (
            "nextreg".to_string(),
            Variants::from([
                (shape2(Const8, Const8), vec![0xed, 0x91]),
                (shape2(Const8, RegA), vec![0xed, 0x92]),
            ]),
        ),
        (
            "test".to_string(),
            Variants::from([(shape1(Const8), vec![0xed, 0x27])]),
        ),
        (
            "mirror".to_string(),
            Variants::from([(shape1(RegA), vec![0xed, 0x24])]),
        ),
    ])
}

/// Barrel shifts and `jp (c)` (core level 2).
fn next_core2_commands() -> HashMap<String, Variants> {
    use crate::z80::args::Arg::*;
    HashMap::from([
        (
            "bsla".to_string(),
            Variants::from([(shape2(RegDE, RegB), vec![0xed, 0x28])]),
        ),
        (
            "bsra".to_string(),
            Variants::from([(shape2(RegDE, RegB), vec![0xed, 0x29])]),
        ),
        (
            "bsrl".to_string(),
            Variants::from([(shape2(RegDE, RegB), vec![0xed, 0x2a])]),
        ),
        (
            "bsrf".to_string(),
            Variants::from([(shape2(RegDE, RegB), vec![0xed, 0x2b])]),
        ),
        (
            "brlc".to_string(),
            Variants::from([(shape2(RegDE, RegB), vec![0xed, 0x2c])]),
        ),
        (
            "jp".to_string(),
            Variants::from([(shape1(PortC), vec![0xed, 0x98])]),
        ),
    ])
}

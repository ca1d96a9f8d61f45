// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// End-to-end snippet tests against a virtual file system.

use super::{Assembler, Options};
use crate::core::source::Opener;
use crate::z80::table::CoreLevel;
use std::collections::HashMap;
use std::io::{Cursor, Read};

fn opener(files: &[(&str, &str)]) -> Opener {
    let map: HashMap<String, String> = files
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Box::new(move |name: &str| match map.get(name) {
        Some(text) => Ok(Box::new(Cursor::new(text.clone().into_bytes())) as Box<dyn Read>),
        None => Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{name}: not found"),
        )),
    })
}

fn try_assemble_files(core: CoreLevel, files: &[(&str, &str)]) -> Result<Assembler, String> {
    let mut asm = Assembler::new(Options { core });
    asm.set_opener(opener(files));
    match asm.assemble_file(files[0].0) {
        Ok(()) => Ok(asm),
        Err(err) => Err(err.message().to_string()),
    }
}

fn try_assemble(core: CoreLevel, src: &str) -> Result<Assembler, String> {
    try_assemble_files(core, &[("a.z80", src)])
}

fn assemble(src: &str) -> Assembler {
    try_assemble(CoreLevel::Standard, src)
        .unwrap_or_else(|err| panic!("{src:?}: assembly failed:\n{err}"))
}

fn assemble_err(src: &str) -> String {
    match try_assemble(CoreLevel::Standard, src) {
        Ok(_) => panic!("{src:?}: expected assembly error"),
        Err(err) => err,
    }
}

fn check_bytes(asm: &Assembler, addr: usize, want: &[u8], desc: &str) {
    let got = &asm.ram()[addr..addr + want.len()];
    assert_eq!(
        got, want,
        "{desc}: bytes at {addr:#06x}: got {got:02x?}, want {want:02x?}"
    );
}

#[test]
fn assembles_snippets() {
    // Each source assembles at 0x8000; everything outside the expected
    // window must still be zero.
    let cases: &[(&str, &[u8])] = &[
        ("xor a", &[0xaf]),
        ("ld bc, 42", &[0x01, 42, 0]),
        ("ld hl, 0x4243", &[0x21, 0x43, 0x42]),
        (
            "ld hl, 0x4243; ld bc, 0x1023",
            &[0x21, 0x43, 0x42, 0x01, 0x23, 0x10],
        ),
        (
            "ld a, 0; ld b, 3; ld h, a; ld l, -2",
            &[0x3e, 0, 0x06, 3, 0x67, 0x2e, 254],
        ),
        (".label ld hl, label", &[0x21, 0x00, 0x80]),
        (".label push bc; jr label", &[0xc5, 0x18, 0xfd]),
        ("rst 0x20", &[0xe7]),
        (
            "db 1, 2, 3, 'h', '\\n', '\\t', 42",
            &[1, 2, 3, b'h', b'\n', b'\t', 42],
        ),
        ("rrca ; ret ; di", &[0x0f, 0xc9, 0xf3]),
        ("ld a, (hl)", &[0x7e]),
        ("ld a, (data); .data db 1, 2", &[0x3a, 0x03, 0x80, 1, 2]),
        (
            "out (42), a; out (c), h; in a, (10); in b, (c)",
            &[0xd3, 42, 0xed, 0x61, 0xdb, 10, 0xed, 0x40],
        ),
        (".loop jr nz, loop", &[0x20, 0xfe]),
        ("halt", &[0x76]),
        ("sll b", &[0xcb, 0x30]),
        ("ex af, af'; exx; ex de, hl", &[0x08, 0xd9, 0xeb]),
        ("im 2; im 0", &[0xed, 0x5e, 0xed, 0x46]),
        ("jp (hl); jp (ix); jp (iy)", &[0xe9, 0xdd, 0xe9, 0xfd, 0xe9]),
        ("ld sp, ix", &[0xdd, 0xf9]),
        ("ld (ix+3), 7", &[0xdd, 0x36, 0x03, 0x07]),
        ("adc hl, de; sbc hl, bc", &[0xed, 0x5a, 0xed, 0x42]),
    ];
    for (src, want) in cases {
        let asm = assemble(src);
        check_bytes(&asm, 0x8000, want, src);
        for (i, &b) in asm.ram().iter().enumerate() {
            if (0x8000..0x8000 + want.len()).contains(&i) {
                continue;
            }
            assert_eq!(b, 0, "{src:?}: byte {i:#06x} = {b:#04x}, want 0");
        }
    }
}

#[test]
fn assembles_index_register_forms() {
    let asm = assemble("add ix, bc; ld ix, (1049); ld h, (ix+5); ld h, (ix-1)");
    check_bytes(
        &asm,
        0x8000,
        &[
            0xdd, 0x09, 0xdd, 0x2a, 0x19, 0x04, 0xdd, 0x66, 0x05, 0xdd, 0x66, 0xff,
        ],
        "index forms",
    );
}

#[test]
fn interleaves_displacement_in_bit_ops() {
    let asm = assemble("bit 4, (ix+10); set 0, (ix-9); res 1, (ix+0)");
    check_bytes(
        &asm,
        0x8000,
        &[
            0xdd, 0xcb, 0x0a, 0x66, 0xdd, 0xcb, 0xf7, 0xc6, 0xdd, 0xcb, 0x00, 0x8e,
        ],
        "ddcb",
    );
}

#[test]
fn bare_index_bracket_means_zero_displacement() {
    let a = assemble("ld h, (ix)");
    let b = assemble("ld h, (ix+0)");
    check_bytes(&a, 0x8000, &[0xdd, 0x66, 0x00], "(ix)");
    check_bytes(&b, 0x8000, &[0xdd, 0x66, 0x00], "(ix+0)");
}

#[test]
fn org_with_separate_target() {
    let asm = assemble("org 0x1000, 0x8000; db 0xFF; .label; dw label");
    check_bytes(&asm, 0x8000, &[0xff, 0x01, 0x10], "paged org");
}

#[test]
fn const_expressions() {
    let asm = assemble("const x = 0xABCD; dw x & 0xF7F");
    check_bytes(&asm, 0x8000, &[0x4d, 0x0b], "const and");
    assert_eq!(asm.get_const("x").unwrap(), Some(0xabcd));
    assert_eq!(asm.get_const("unrelated").unwrap(), None);
}

#[test]
fn const_used_before_definition_errs() {
    let err = assemble_err("ld a, x; const x = 42");
    assert!(
        err.contains("use of const \"x\" before def"),
        "got: {err}"
    );
}

#[test]
fn const_may_depend_on_forward_label() {
    let asm = assemble("const x = later + 1; ld hl, x; .later");
    check_bytes(&asm, 0x8000, &[0x21, 0x04, 0x80], "forward const");
    assert_eq!(asm.get_const("x").unwrap(), Some(0x8004));
}

#[test]
fn forward_reference_matches_backward_reference() {
    let fwd = assemble("jp end; nop; .end");
    check_bytes(&fwd, 0x8000, &[0xc3, 0x04, 0x80, 0x00], "forward");
    let back = assemble(".start nop; jp start");
    check_bytes(&back, 0x8001, &[0xc3, 0x00, 0x80], "backward");
}

#[test]
fn relative_jump_to_self() {
    let asm = assemble(".x jr x");
    check_bytes(&asm, 0x8000, &[0x18, 0xfe], "jr self");
}

#[test]
fn relative_jump_out_of_range() {
    let err = assemble_err("jr far\nds \"x\"\norg 0x9000\n.far");
    assert!(err.contains("out of range"), "got: {err}");
}

#[test]
fn mnemonics_are_case_insensitive() {
    for src in ["xor a", "XOR A", "Xor a", "xOr A"] {
        let asm = assemble(src);
        check_bytes(&asm, 0x8000, &[0xaf], src);
    }
}

#[test]
fn major_and_minor_labels() {
    let asm = assemble("main: nop\n.loop inc a\njr loop\nother: nop\n.loop dec a\njr loop");
    assert_eq!(asm.get_label("", "main"), Some(0x8000));
    assert_eq!(asm.get_label("main", "loop"), Some(0x8001));
    assert_eq!(asm.get_label("other", "loop"), Some(0x8005));
    // Each jr binds to its own major's loop.
    check_bytes(&asm, 0x8002, &[0x18, 0xfd], "first jr");
    check_bytes(&asm, 0x8006, &[0x18, 0xfd], "second jr");
}

#[test]
fn label_values_match_emission_points() {
    let asm = assemble("nop\n.here\nnop");
    assert_eq!(asm.get_label("", "here"), Some(0x8001));
}

#[test]
fn redefined_label_errs() {
    let err = assemble_err(".x nop\n.x");
    assert!(err.contains("redefined"), "got: {err}");
    assert!(err.contains("First defined at"), "got: {err}");
}

#[test]
fn unknown_label_errs_with_location() {
    let err = assemble_err("jp nowhere");
    assert!(err.contains("unknown label \"nowhere\""), "got: {err}");
    assert!(err.contains("a.z80:1."), "got: {err}");
}

#[test]
fn every_error_line_carries_the_filename() {
    let err = assemble_err("qqq\nwww\nld a,\n");
    for line in err.lines() {
        assert!(line.contains("a.z80:"), "line without location: {line}");
    }
}

#[test]
fn errors_cap_at_twenty() {
    let src = "qqq\n".repeat(30);
    let err = assemble_err(&src);
    assert_eq!(err.lines().count(), 20, "got:\n{err}");
}

#[test]
fn no_suitable_form_error_names_the_args() {
    let err = assemble_err("ld (hl), (hl)");
    assert!(
        err.contains("no suitable form of ld found that matches ld (hl), (hl)"),
        "got: {err}"
    );
}

#[test]
fn arithmetic_errors() {
    assert!(assemble_err("db 1/0").contains("divide by zero"));
    assert!(assemble_err("db 1%0").contains("non-zero"));
    assert!(assemble_err("db 1<<-1").contains("shift must be positive"));
}

#[test]
fn org_bounds() {
    assert!(assemble_err("org 0x10000").contains("out of range"));
    assert!(assemble_err("org 100, 0x200001").contains("out of range"));
    let asm = assemble("org 0\ndb 1");
    check_bytes(&asm, 0, &[1], "org 0");
}

#[test]
fn ds_emits_string_bytes() {
    let asm = assemble("ds \"hi\\0\"");
    check_bytes(&asm, 0x8000, b"hi\0", "ds");
    let asm = assemble("ds `raw`");
    check_bytes(&asm, 0x8000, b"raw", "ds raw");
    assert!(assemble_err("ds 42").contains("bad data value"));
}

#[test]
fn db_rejects_strings_and_registers() {
    assert!(assemble_err("db \"x\"").contains("bad data value"));
    assert!(assemble_err("db hl").contains("bad data value"));
}

#[test]
fn trailing_commas() {
    let asm = assemble("db 1, 2,");
    check_bytes(&asm, 0x8000, &[1, 2], "db trailing");
    assert!(assemble_err("ld a, 1,").contains("trailing"));
}

#[test]
fn include_splices_files() {
    let asm = try_assemble_files(
        CoreLevel::Standard,
        &[
            ("main.z80", "include \"lib.z80\"\nld hl, msg\n"),
            ("lib.z80", ".msg db 1\n"),
        ],
    )
    .unwrap();
    check_bytes(&asm, 0x8000, &[0x01, 0x21, 0x00, 0x80], "include");
}

#[test]
fn recursive_include_errs() {
    let err = try_assemble_files(
        CoreLevel::Standard,
        &[("main.z80", "include \"main.z80\"")],
    )
    .unwrap_err();
    assert!(err.contains("recursive include"), "got: {err}");
}

#[test]
fn missing_include_errs() {
    let err =
        try_assemble_files(CoreLevel::Standard, &[("main.z80", "include \"nope.z80\"")])
            .unwrap_err();
    assert!(err.contains("failed to include"), "got: {err}");
}

#[test]
fn comments_are_skipped() {
    let asm = assemble("nop // trailing\n/* block\nspanning */ di");
    check_bytes(&asm, 0x8000, &[0x00, 0xf3], "comments");
}

#[test]
fn emission_grows_past_64k() {
    let asm = assemble("org 0xffff, 0xffff\ndb 1, 2");
    assert!(asm.ram().len() > 0x10000);
    assert_eq!(asm.ram()[0xffff], 1);
    assert_eq!(asm.ram()[0x10000], 2);
    assert_eq!(asm.written_range(), Some((0xffff, 0x10000)));
}

#[test]
fn next_core_gating() {
    assert!(assemble_err("swapnib").contains("unknown command"));
    assert!(try_assemble(CoreLevel::Standard, "mul d, e").is_err());

    let asm = try_assemble(CoreLevel::Next1, "swapnib; mul d, e; add hl, a").unwrap();
    check_bytes(
        &asm,
        0x8000,
        &[0xed, 0x23, 0xed, 0x30, 0xed, 0x31],
        "next1",
    );

    // push nn is big-endian on the Next.
    let asm = try_assemble(CoreLevel::Next1, "push 0x1234").unwrap();
    check_bytes(&asm, 0x8000, &[0xed, 0x8a, 0x12, 0x34], "push nn");

    let asm = try_assemble(CoreLevel::Next1, "nextreg 0x15, 3; nextreg 0x15, a").unwrap();
    check_bytes(
        &asm,
        0x8000,
        &[0xed, 0x91, 0x15, 0x03, 0xed, 0x92, 0x15],
        "nextreg",
    );

    // Barrel shifts and jp (c) need core level 2.
    assert!(try_assemble(CoreLevel::Next1, "bsla de, b").is_err());
    assert!(try_assemble(CoreLevel::Next1, "jp (c)").is_err());
    let asm = try_assemble(CoreLevel::Next2, "bsla de, b; jp (c)").unwrap();
    check_bytes(&asm, 0x8000, &[0xed, 0x28, 0xed, 0x98], "next2");
}

#[test]
fn next_add_immediate_is_little_endian() {
    let asm = try_assemble(CoreLevel::Next1, "add bc, 0x1234").unwrap();
    check_bytes(&asm, 0x8000, &[0xed, 0x36, 0x34, 0x12], "add bc,nn");
}

#[test]
fn excluded_index_forms_do_not_assemble() {
    assert!(assemble_err("ex de, ix").contains("no suitable form"));
    assert!(assemble_err("sll (ix+1)").contains("no suitable form"));
}

#[test]
fn determinism() {
    let src = "main: ld hl, data\njr main\n.data db 1, 2, 3";
    let a = assemble(src);
    let b = assemble(src);
    assert_eq!(a.ram(), b.ram());
}

#[test]
fn repeated_assembly_starts_at_same_origin() {
    let mut asm = Assembler::new(Options::default());
    asm.set_opener(opener(&[("a.z80", "nop")]));
    asm.assemble_file("a.z80").unwrap();
    asm.assemble_file("a.z80").unwrap();
    check_bytes(&asm, 0x8000, &[0x00], "re-assembled");
}

// Integer-expression regression set: each expression assembles as
// `org 0x6000; .label ld hl, <expr>` and must produce 21 lo hi.
#[test]
fn integer_expression_regressions() {
    let cases: &[(&str, u16)] = &[
        ("2+3*4", 14),
        ("(2+3)*4", 20),
        ("10/3", 3),
        ("10%3", 1),
        ("1<<8", 0x0100),
        ("0x1234>>4", 0x0123),
        ("0xff&0x0f", 0x0f),
        ("0xf0|0x0f", 0xff),
        ("0xff^0x0f", 0xf0),
        ("0xff&^0x0f", 0xf0),
        ("1==1", 1),
        ("1!=1", 0),
        ("2<3", 1),
        ("3<=3", 1),
        ("4>5", 0),
        ("5>=5", 1),
        ("1&&2", 2),
        ("0&&9", 0),
        ("0||5", 5),
        ("3||9", 3),
        ("!0", 1),
        ("!5", 0),
        ("-5+6", 1),
        ("^0 & 0xffff", 0xffff),
        ("'A'", 65),
        ("'A'+1", 66),
        ("label", 0x6000),
        ("label+2*3", 0x6006),
        ("017", 15),
        ("1 << 4 + 1", 17),
        ("2*3==6 && 1+1==2", 1),
    ];
    for (expr, want) in cases {
        let src = format!("org 0x6000; .label ld hl, {expr}");
        let asm = try_assemble(CoreLevel::Standard, &src)
            .unwrap_or_else(|err| panic!("{expr:?}: {err}"));
        let want_bytes = [0x21, (*want & 0xff) as u8, (*want >> 8) as u8];
        check_bytes(&asm, 0x6000, &want_bytes, expr);
    }
}

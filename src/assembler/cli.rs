// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command-line interface parsing and argument validation.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::assembler::{AsmError, Assembler, Options};
use crate::z80::table::CoreLevel;

pub const VERSION: &str = "0.9";

const LONG_ABOUT: &str = "Two-pass Z80 assembler for the ZX Spectrum Next.

Assembles the input and writes the raw memory image for the emitted range
(or an explicit -r range) to a .bin file. Core levels gate the Z80N extended
instruction set: standard is plain Z80, next1 adds the Next extensions, and
next2 additionally enables the barrel shifts and jp (c).";

#[derive(Parser, Debug)]
#[command(
    name = "zforge",
    version = VERSION,
    about = "Two-pass Z80/Z80N assembler for the ZX Spectrum Next",
    long_about = LONG_ABOUT
)]
pub struct Cli {
    /// Input assembly file
    pub input: PathBuf,
    #[arg(
        short = 'o',
        long = "out",
        value_name = "FILE",
        long_help = "Output binary filename. Defaults to the input base with a .bin extension."
    )]
    pub outfile: Option<PathBuf>,
    #[arg(
        short = 'r',
        long = "range",
        value_name = "ssss:eeee",
        long_help = "Memory range to write (4 hex digits each, inclusive). Defaults to the range actually emitted to."
    )]
    pub range: Option<String>,
    #[arg(
        long = "core",
        value_enum,
        default_value_t = CoreChoice::Standard,
        long_help = "Instruction set: standard Z80, or the Spectrum Next extended cores."
    )]
    pub core: CoreChoice,
    #[arg(
        long = "syms",
        action = ArgAction::SetTrue,
        long_help = "Dump the label table to stdout after assembly."
    )]
    pub syms: bool,
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        long_help = "Raise log verbosity (repeatable): info, debug, trace."
    )]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CoreChoice {
    Standard,
    Next1,
    Next2,
}

impl From<CoreChoice> for CoreLevel {
    fn from(choice: CoreChoice) -> Self {
        match choice {
            CoreChoice::Standard => CoreLevel::Standard,
            CoreChoice::Next1 => CoreLevel::Next1,
            CoreChoice::Next2 => CoreLevel::Next2,
        }
    }
}

pub fn is_valid_hex_4(s: &str) -> bool {
    s.len() == 4 && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse an `ssss:eeee` range argument.
pub fn parse_range(s: &str) -> Option<(u16, u16)> {
    let (start, end) = s.split_once(':')?;
    if !is_valid_hex_4(start) || !is_valid_hex_4(end) {
        return None;
    }
    let start = u16::from_str_radix(start, 16).ok()?;
    let end = u16::from_str_radix(end, 16).ok()?;
    Some((start, end))
}

pub fn resolve_output_path(input: &PathBuf, outfile: Option<PathBuf>) -> PathBuf {
    match outfile {
        Some(path) => path,
        None => input.with_extension("bin"),
    }
}

/// Run the assembler with command-line arguments.
pub fn run() -> Result<(), AsmError> {
    let cli = Cli::parse();
    run_with(cli)
}

fn run_with(cli: Cli) -> Result<(), AsmError> {
    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();

    let range = match cli.range.as_deref() {
        Some(arg) => Some(
            parse_range(arg)
                .ok_or_else(|| AsmError::new("invalid -r/--range; must be ssss:eeee (hex)"))?,
        ),
        None => None,
    };

    let mut asm = Assembler::new(Options {
        core: cli.core.into(),
    });
    let input = cli.input.to_string_lossy().to_string();
    asm.assemble_file(&input)?;

    if cli.syms {
        let mut labels: Vec<(&str, u16)> = asm.labels().collect();
        labels.sort();
        for (name, val) in labels {
            println!("{name:<16}: {val:04x} ({val})");
        }
    }

    let span = match range {
        Some((start, end)) => Some((start as usize, end as usize)),
        None => asm.written_range(),
    };
    let Some((start, end)) = span else {
        tracing::info!("nothing emitted; no output written");
        return Ok(());
    };
    if end < start {
        return Err(AsmError::new("empty -r/--range"));
    }
    let ram = asm.ram();
    let end = end.min(ram.len() - 1);
    let out_path = resolve_output_path(&cli.input, cli.outfile);
    std::fs::write(&out_path, &ram[start..=end]).map_err(|err| {
        AsmError::new(format!("failed to write {}: {err}", out_path.display()))
    })?;
    tracing::info!(
        file = %out_path.display(),
        "wrote image for {start:#06x}..{end:#06x}"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn cli_parses_inputs_and_outputs() {
        let cli = Cli::parse_from([
            "zforge", "prog.z80", "-o", "out.bin", "-r", "8000:80ff", "--core", "next2", "--syms",
            "-vv",
        ]);
        assert_eq!(cli.input, PathBuf::from("prog.z80"));
        assert_eq!(cli.outfile, Some(PathBuf::from("out.bin")));
        assert_eq!(cli.range.as_deref(), Some("8000:80ff"));
        assert_eq!(cli.core, CoreChoice::Next2);
        assert!(cli.syms);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["zforge", "prog.z80"]);
        assert_eq!(cli.core, CoreChoice::Standard);
        assert!(cli.outfile.is_none());
        assert!(!cli.syms);
    }

    #[test]
    fn parses_ranges() {
        assert_eq!(parse_range("8000:80ff"), Some((0x8000, 0x80ff)));
        assert_eq!(parse_range("0000:ffff"), Some((0, 0xffff)));
        assert_eq!(parse_range("8000"), None);
        assert_eq!(parse_range("800:80ff"), None);
        assert_eq!(parse_range("8000:80fg"), None);
    }

    #[test]
    fn output_path_defaults_to_input_base() {
        assert_eq!(
            resolve_output_path(&PathBuf::from("game.z80"), None),
            PathBuf::from("game.bin")
        );
        assert_eq!(
            resolve_output_path(&PathBuf::from("game.z80"), Some(PathBuf::from("x.bin"))),
            PathBuf::from("x.bin")
        );
    }
}

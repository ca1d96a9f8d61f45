// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Emission state: logical program counter and output image.
//!
//! The program counter is the 16-bit address instructions see; the target is
//! the byte offset actually written, so a paged `org n, t` can emit code for
//! one address at another offset. The image starts at 64 KiB and grows in
//! 16 KiB steps up to a 2 MiB ceiling.

pub const MIN_RAM: usize = 64 * 1024;
pub const GROW_STEP: usize = 16 * 1024;
pub const TARGET_LIMIT: usize = 2 * 1024 * 1024;

#[derive(Debug)]
pub struct Image {
    pc: u16,
    target: usize,
    ram: Vec<u8>,
    written: Option<(usize, usize)>,
}

impl Image {
    #[must_use]
    pub fn new(pc: u16, target: usize) -> Self {
        Self {
            pc,
            target,
            ram: vec![0; MIN_RAM],
            written: None,
        }
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    /// Lowest and highest written offsets, if anything was emitted.
    pub fn written_range(&self) -> Option<(usize, usize)> {
        self.written
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    pub fn set_target(&mut self, target: usize) {
        self.target = target;
    }

    /// Rewind to the given origin at the start of a pass. Contents stay: the
    /// second pass overwrites the same offsets.
    pub fn reset(&mut self, pc: u16, target: usize) {
        self.pc = pc;
        self.target = target;
    }

    pub fn write_byte(&mut self, b: u8) -> Result<(), String> {
        if self.target >= TARGET_LIMIT {
            return Err(format!("byte write out of range: {}", self.target));
        }
        while self.target >= self.ram.len() {
            let grown = (self.ram.len() + GROW_STEP).min(TARGET_LIMIT);
            self.ram.resize(grown, 0);
        }
        self.ram[self.target] = b;
        self.written = Some(match self.written {
            None => (self.target, self.target),
            Some((lo, hi)) => (lo.min(self.target), hi.max(self.target)),
        });
        self.target += 1;
        self.pc = self.pc.wrapping_add(1);
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), String> {
        for &b in bytes {
            self.write_byte(b)?;
        }
        Ok(())
    }
}

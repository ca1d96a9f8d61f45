// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Labels, constants, and definition locations.
//!
//! Labels are qualified: a minor label `.loop` under major label `draw` is
//! stored as `draw.loop`, and a bare lookup tries the current major prefix
//! before the bare name. Constants carry a defined-in-this-pass flag so that
//! a pass-1 use before the `const` statement is reported as such, and an
//! optional value: a constant whose expression needed a forward label in
//! pass 0 stays unmaterialized until pass 1 recomputes it.
//!
//! Definition locations (`file:line.col`) are recorded in pass 0; pass 1
//! revisits every definition at the same location, so a location mismatch is
//! a redefinition.

use std::collections::{HashMap, HashSet};

/// State of a name in the constant map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstState {
    NotConst,
    /// Known const name, but its `const` statement has not been reached in
    /// the current pass.
    NotYetDefined,
    /// Defined this pass but the value needed a forward label (pass 0).
    Unmaterialized,
    Value(i64),
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    labels: HashMap<String, u16>,
    consts: HashMap<String, Option<i64>>,
    consts_defined: HashSet<String>,
    assign_locs: HashMap<String, String>,
    current_major: String,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-pass state. Labels and recorded locations persist.
    pub fn begin_pass(&mut self) {
        self.consts_defined.clear();
        self.current_major.clear();
    }

    pub fn current_major(&self) -> &str {
        &self.current_major
    }

    pub fn set_major(&mut self, name: &str) {
        self.current_major = name.to_string();
    }

    #[must_use]
    pub fn qualify_minor(&self, name: &str) -> String {
        format!("{}.{}", self.current_major, name)
    }

    /// Bare-name lookup: current major prefix first, then the bare name.
    #[must_use]
    pub fn lookup_label(&self, name: &str) -> Option<u16> {
        self.labels
            .get(&format!("{}.{}", self.current_major, name))
            .or_else(|| self.labels.get(name))
            .copied()
    }

    /// The public major/minor lookup: `major.name`, falling back to `name`.
    #[must_use]
    pub fn get_label(&self, major: &str, name: &str) -> Option<u16> {
        self.labels
            .get(&format!("{major}.{name}"))
            .or_else(|| self.labels.get(name))
            .copied()
    }

    pub fn labels(&self) -> impl Iterator<Item = (&str, u16)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn define_label(
        &mut self,
        name: &str,
        value: u16,
        loc: &str,
        pass: u8,
    ) -> Result<(), String> {
        if pass == 1 {
            // Pass 1 revisits every definition; a different location means
            // the name was defined twice.
            let first = self.assign_locs.get(name).map(String::as_str).unwrap_or("");
            if first != loc {
                return Err(redefined(name, first));
            }
            return Ok(());
        }
        self.labels.insert(name.to_string(), value);
        match self.assign_locs.get(name) {
            None => {
                self.assign_locs.insert(name.to_string(), loc.to_string());
                Ok(())
            }
            Some(first) if first != loc => Err(redefined(name, first)),
            Some(_) => Ok(()),
        }
    }

    pub fn define_const(
        &mut self,
        name: &str,
        value: Option<i64>,
        loc: &str,
        pass: u8,
    ) -> Result<(), String> {
        if pass == 1 {
            let first = self.assign_locs.get(name).map(String::as_str).unwrap_or("");
            if first != loc {
                return Err(redefined(name, first));
            }
            self.consts.insert(name.to_string(), value);
            self.consts_defined.insert(name.to_string());
            return Ok(());
        }
        if let Some(first) = self.assign_locs.get(name) {
            if first != loc {
                return Err(redefined(name, first));
            }
        } else {
            self.assign_locs.insert(name.to_string(), loc.to_string());
        }
        self.consts.insert(name.to_string(), value);
        self.consts_defined.insert(name.to_string());
        Ok(())
    }

    #[must_use]
    pub fn const_state(&self, name: &str) -> ConstState {
        match self.consts.get(name) {
            None => ConstState::NotConst,
            Some(_) if !self.consts_defined.contains(name) => ConstState::NotYetDefined,
            Some(None) => ConstState::Unmaterialized,
            Some(Some(v)) => ConstState::Value(*v),
        }
    }
}

fn redefined(name: &str, first: &str) -> String {
    format!("label {name:?} redefined. First defined at {first}")
}

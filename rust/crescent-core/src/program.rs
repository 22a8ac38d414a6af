//! Program loader: turns script text into an ordered list of journeys.
//!
//! Only lines of the form `Take <line> Line to <station>` (optionally
//! followed by a `#` comment) are instructions. Everything else is dropped
//! without complaint. Names are not checked here; a journey to a station
//! that doesn't exist fails when it is executed, so the error carries the
//! index of the step that actually took it.

use crate::topology::{LocationId, RouteId};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static INSTRUCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Take (.*) Line to (.*?)\s*(?:#.*)?$").expect("instruction grammar is valid")
});

/// A single journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub route: RouteId,
    pub destination: LocationId,
    /// The script line this was parsed from, without the line terminator.
    pub source: String,
    /// 1-based line number in the script.
    pub line: usize,
}

impl Instruction {
    /// Parse one script line. Returns `None` for anything that isn't a
    /// journey (blank lines, comments, prose).
    pub fn parse(text: &str, line: usize) -> Option<Self> {
        let caps = INSTRUCTION.captures(text)?;
        Some(Self {
            route: RouteId::from(&caps[1]),
            destination: LocationId::from(&caps[2]),
            source: text.to_string(),
            line,
        })
    }
}

/// An immutable, loaded program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn load(text: &str) -> Self {
        let instructions = text
            .lines()
            .enumerate()
            .filter_map(|(idx, line)| Instruction::parse(line, idx + 1))
            .collect();
        Self { instructions }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, ip: usize) -> Option<&Instruction> {
        self.instructions.get(ip)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }
}

impl From<Vec<Instruction>> for Program {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

/// Shorthand for [`Program::load`].
pub fn load(text: &str) -> Program {
    Program::load(text)
}

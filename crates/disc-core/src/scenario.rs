use std::collections::VecDeque;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DiscError;
use crate::instruction::Instruction;

/// Two-character prefix marking a directive line (`##name=...`, `##key=...`).
pub const DIRECTIVE_PREFIX: &str = "##";
/// One-character prefix marking a comment line.
pub const COMMENT_PREFIX: &str = "#";

const NAME_DIRECTIVE: &str = "##name=";

/// An ordered script of [`Instruction`]s plus a name and side arguments,
/// parsed from a scenario text block. Directive and comment lines never
/// become instructions; unparseable lines do, as inert entries, so that
/// instruction indices stay stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    name: Option<String>,
    side_args: Vec<String>,
    instructions: Vec<Instruction>,
}

impl Scenario {
    /// Parses a full scenario text block. Never fails; malformed instruction
    /// lines are kept as inert entries.
    pub fn parse(text: &str) -> Self {
        Self::from_lines(text.lines())
    }

    /// Parses a scenario from an already-split sequence of lines.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut scenario = Self::default();
        for line in lines {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix(DIRECTIVE_PREFIX) {
                if let Some(name) = line.strip_prefix(NAME_DIRECTIVE) {
                    scenario.name = Some(name.to_string());
                } else {
                    let value = rest.split_once('=').map(|(_, value)| value).unwrap_or(rest);
                    scenario.side_args.push(value.to_string());
                }
            } else if line.starts_with(COMMENT_PREFIX) || line.is_empty() {
                continue;
            } else {
                scenario.instructions.push(Instruction::parse(line));
            }
        }
        scenario
    }

    /// Reads and parses a scenario file. Missing source data is a hard
    /// failure at construction time, not a swallowed fault.
    pub fn from_file(path: &Path) -> Result<Self, DiscError> {
        let text = fs::read_to_string(path).map_err(|error| {
            DiscError::new(
                "SCENARIO_FILE_READ",
                format!("Cannot read scenario file {}: {}", path.display(), error),
            )
        })?;
        Ok(Self::parse(&text))
    }

    /// Direct construction; does not check for compliance.
    pub fn new(
        name: Option<String>,
        side_args: Vec<String>,
        instructions: Vec<Instruction>,
    ) -> Self {
        Self {
            name,
            side_args,
            instructions,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn side_args(&self) -> &[String] {
        &self.side_args
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// The instruction sequence as a queue, in file order, for the
    /// interpreter's scheduling loop.
    pub fn instruction_queue(&self) -> VecDeque<Instruction> {
        self.instructions.iter().cloned().collect()
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            writeln!(f, "{NAME_DIRECTIVE}{name}")?;
        }
        for (index, arg) in self.side_args.iter().enumerate() {
            writeln!(f, "{DIRECTIVE_PREFIX}arg{index}={arg}")?;
        }
        writeln!(f)?;
        for instruction in &self.instructions {
            if !instruction.is_inert() {
                writeln!(f, "{instruction}")?;
            }
        }
        Ok(())
    }
}

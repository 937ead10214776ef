use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel produced when re-serializing an instruction that carries no
/// recognized grammar (a malformed scenario line).
pub const NOT_A_VALUE: &str = "NaN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionKind {
    Command,
    Delimiter,
    ControlState,
}

/// One parsed scenario line. A `Command` addresses a registered capability
/// (`args[0]` is the operation name, the rest are call arguments), a
/// `Delimiter` is a `start`/`stop` marker with a label, and a `ControlState`
/// carries an ordered list of state tokens. A line with no `.` or `,`
/// separator yields an instruction with no kind at all; it is unusable but
/// still occupies its position in the scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    kind: Option<InstructionKind>,
    target: String,
    args: Vec<String>,
}

impl Instruction {
    /// Classifies a raw scenario line. Does not know to ignore comments or
    /// directives; the scenario parser strips those first.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let Some(split_at) = raw.find('.').or_else(|| raw.find(',')) else {
            return Self::default();
        };

        let head = &raw[..split_at];
        let remainder = &raw[split_at + 1..];
        match head {
            "start" | "stop" => Self {
                kind: Some(InstructionKind::Delimiter),
                target: String::new(),
                args: vec![head.to_string(), remainder.trim().to_string()],
            },
            "control" => Self {
                kind: Some(InstructionKind::ControlState),
                target: String::new(),
                args: split_segments(remainder),
            },
            _ => Self {
                kind: Some(InstructionKind::Command),
                target: head.to_string(),
                args: split_segments(remainder),
            },
        }
    }

    pub fn command(target: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            kind: Some(InstructionKind::Command),
            target: target.into(),
            args,
        }
    }

    pub fn delimiter(marker: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: Some(InstructionKind::Delimiter),
            target: String::new(),
            args: vec![marker.into(), label.into()],
        }
    }

    pub fn control(states: Vec<String>) -> Self {
        Self {
            kind: Some(InstructionKind::ControlState),
            target: String::new(),
            args: states,
        }
    }

    pub fn kind(&self) -> Option<InstructionKind> {
        self.kind
    }

    /// True for an instruction parsed from a malformed line; it carries no
    /// kind, target, or args and must never be dispatched.
    pub fn is_inert(&self) -> bool {
        self.kind.is_none()
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }
}

/// Comma-splits the remainder after the initial separator, trimming every
/// segment. An empty remainder still yields one empty argument.
fn split_segments(remainder: &str) -> Vec<String> {
    remainder
        .split(',')
        .map(|segment| segment.trim().to_string())
        .collect()
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Some(InstructionKind::Command) => {
                let mut args = self.args.iter();
                write!(
                    f,
                    "{}.{}",
                    self.target,
                    args.next().map(String::as_str).unwrap_or("")
                )?;
                for arg in args {
                    write!(f, ", {arg}")?;
                }
                Ok(())
            }
            Some(InstructionKind::ControlState) => {
                let mut args = self.args.iter();
                write!(
                    f,
                    "control.{}",
                    args.next().map(String::as_str).unwrap_or("")
                )?;
                for arg in args {
                    write!(f, ", {arg}")?;
                }
                Ok(())
            }
            Some(InstructionKind::Delimiter) => {
                let mut args = self.args.iter();
                if let Some(first) = args.next() {
                    write!(f, "{first}")?;
                }
                for arg in args {
                    write!(f, ", {arg}")?;
                }
                Ok(())
            }
            None => write!(f, "{NOT_A_VALUE}"),
        }
    }
}

#[cfg(test)]
mod instruction_tests {
    use super::*;

    #[test]
    fn parse_classifies_delimiters() {
        let start = Instruction::parse("start, s1");
        assert_eq!(start.kind(), Some(InstructionKind::Delimiter));
        assert_eq!(start.target(), "");
        assert_eq!(start.args(), ["start", "s1"]);

        let stop = Instruction::parse("stop, s1");
        assert_eq!(stop.kind(), Some(InstructionKind::Delimiter));
        assert_eq!(stop.args(), ["stop", "s1"]);
    }

    #[test]
    fn parse_keeps_delimiter_remainder_as_one_label() {
        let inst = Instruction::parse("start, first leg, with commas");
        assert_eq!(inst.kind(), Some(InstructionKind::Delimiter));
        assert_eq!(inst.args(), ["start", "first leg, with commas"]);
    }

    #[test]
    fn parse_classifies_control_states() {
        let inst = Instruction::parse("control.manual, slow");
        assert_eq!(inst.kind(), Some(InstructionKind::ControlState));
        assert_eq!(inst.target(), "");
        assert_eq!(inst.args(), ["manual", "slow"]);
    }

    #[test]
    fn parse_classifies_commands() {
        let inst = Instruction::parse("drive.forward, 5, fast");
        assert_eq!(inst.kind(), Some(InstructionKind::Command));
        assert_eq!(inst.target(), "drive");
        assert_eq!(inst.args(), ["forward", "5", "fast"]);
    }

    #[test]
    fn parse_prefers_dot_over_earlier_comma() {
        let inst = Instruction::parse("a,b.c");
        assert_eq!(inst.kind(), Some(InstructionKind::Command));
        assert_eq!(inst.target(), "a,b");
        assert_eq!(inst.args(), ["c"]);
    }

    #[test]
    fn parse_trims_every_segment() {
        let inst = Instruction::parse("  drive.forward ,  5 ,  fast  ");
        assert_eq!(inst.target(), "drive");
        assert_eq!(inst.args(), ["forward", "5", "fast"]);
    }

    #[test]
    fn parse_empty_remainder_yields_one_empty_argument() {
        let inst = Instruction::parse("drive.");
        assert_eq!(inst.kind(), Some(InstructionKind::Command));
        assert_eq!(inst.args(), [""]);
        assert_eq!(inst.arg_count(), 1);
    }

    #[test]
    fn parse_without_separator_is_inert() {
        let inst = Instruction::parse("no separator here");
        assert!(inst.is_inert());
        assert_eq!(inst.kind(), None);
        assert_eq!(inst.target(), "");
        assert!(inst.args().is_empty());
        assert_eq!(inst.to_string(), NOT_A_VALUE);
    }

    #[test]
    fn display_reproduces_canonical_forms() {
        assert_eq!(
            Instruction::parse("drive.forward, 5").to_string(),
            "drive.forward, 5"
        );
        assert_eq!(
            Instruction::parse("control.manual, slow").to_string(),
            "control.manual, slow"
        );
        assert_eq!(Instruction::parse("start, s1").to_string(), "start, s1");
    }

    #[test]
    fn round_trip_reparses_to_equal_instruction() {
        for line in [
            "drive.forward, 5",
            "drive.getDistance, return dist",
            "control.manual",
            "start, s1",
            "stop, s1",
            "log.print, dist",
        ] {
            let parsed = Instruction::parse(line);
            let reparsed = Instruction::parse(&parsed.to_string());
            assert_eq!(parsed, reparsed, "round trip failed for {line}");
        }
    }

    #[test]
    fn manual_constructors_match_parsed_forms() {
        assert_eq!(
            Instruction::command("drive", vec!["forward".to_string(), "5".to_string()]),
            Instruction::parse("drive.forward, 5")
        );
        assert_eq!(
            Instruction::delimiter("start", "s1"),
            Instruction::parse("start, s1")
        );
        assert_eq!(
            Instruction::control(vec!["manual".to_string()]),
            Instruction::parse("control.manual")
        );
    }

    #[test]
    fn serde_round_trips_an_instruction() {
        let inst = Instruction::parse("drive.forward, 5");
        let json = serde_json::to_string(&inst).expect("serialize should pass");
        let back: Instruction = serde_json::from_str(&json).expect("deserialize should pass");
        assert_eq!(inst, back);
    }
}

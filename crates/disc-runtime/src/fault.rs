use std::fmt;
use std::sync::{Mutex, PoisonError};

use disc_core::DiscError;

/// The four ways one instruction can fail without halting the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// The scenario line matched no recognized grammar; the entry is inert.
    Parse,
    /// Target name or operation name unresolved in the directory.
    Lookup,
    /// An argument could not be converted to its declared parameter type.
    Coercion,
    /// The resolved operation itself failed during execution.
    Invocation,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => write!(f, "parse"),
            Self::Lookup => write!(f, "lookup"),
            Self::Coercion => write!(f, "coercion"),
            Self::Invocation => write!(f, "invocation"),
        }
    }
}

/// A localized per-instruction failure, scoped to one position in the
/// scenario's instruction sequence.
#[derive(Debug, Clone)]
pub struct Fault {
    pub kind: FaultKind,
    /// Position of the instruction in the scenario's sequence.
    pub index: usize,
    /// Canonical rendering of the instruction that faulted.
    pub instruction: String,
    pub error: DiscError,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} fault at #{} ({}): {}",
            self.kind, self.index, self.instruction, self.error
        )
    }
}

/// Where per-instruction faults go. The host chooses whether to log, count,
/// or inspect them after the run; the scheduling loop itself never stops on
/// a fault.
pub trait FaultSink: Send + Sync {
    fn report(&self, fault: Fault);
}

/// Accumulates faults for later inspection. The default sink in tests.
#[derive(Debug, Default)]
pub struct CollectingSink {
    faults: Mutex<Vec<Fault>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains and returns everything reported so far.
    pub fn take(&self) -> Vec<Fault> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Fault>> {
        self.faults.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FaultSink for CollectingSink {
    fn report(&self, fault: Fault) {
        self.lock().push(fault);
    }
}

/// Prints each fault to stderr. The default sink for the CLI.
#[derive(Debug, Default)]
pub struct StderrSink;

impl FaultSink for StderrSink {
    fn report(&self, fault: Fault) {
        eprintln!("[fault] {fault}");
    }
}

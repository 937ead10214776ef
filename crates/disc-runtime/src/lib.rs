pub mod directory;
pub mod dispatch;
pub mod fault;
pub mod heap;
pub mod interpreter;

pub use directory::{Capability, Directory, OperationSpec};
pub use dispatch::{dispatch, RETURN_TOKEN};
pub use fault::{CollectingSink, Fault, FaultKind, FaultSink, StderrSink};
pub use heap::Heap;
pub use interpreter::{Interpreter, InterpreterHandle, RunState, RunSummary, StopTrigger};

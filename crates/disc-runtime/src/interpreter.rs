use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use crossbeam_channel::{bounded, select, Receiver, Sender};
use disc_core::{DiscError, Instruction, InstructionKind, Scenario};

use crate::directory::Directory;
use crate::dispatch::dispatch;
use crate::fault::{Fault, FaultKind, FaultSink, StderrSink};
use crate::heap::Heap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No run started yet; the heap is empty.
    Idle,
    /// The scheduling loop is issuing instructions.
    Running,
    /// The queue is exhausted or stopped; the in-flight dispatch may still
    /// be finishing.
    Draining,
    Terminated,
}

/// What one run did, instruction by instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Command instructions dispatched successfully.
    pub executed: usize,
    /// Command instructions that faulted in the dispatcher.
    pub faulted: usize,
    /// Delimiter, control-state, and inert entries the loop passed over.
    pub skipped: usize,
    /// Queued instructions discarded by a stop request.
    pub discarded: usize,
}

/// Requests that a running interpreter discard its remaining queue. The
/// in-flight dispatch is never cancelled; it runs to completion.
#[derive(Debug, Clone)]
pub struct StopTrigger {
    tx: Sender<()>,
}

impl StopTrigger {
    pub fn stop(&self) {
        let _ = self.tx.try_send(());
    }
}

/// Drives a [`Scenario`] against a [`Directory`], one instruction at a
/// time, in file order.
///
/// Two threads of control: the scheduling loop and a single dispatch
/// worker, joined by a capacity-0 rendezvous channel. A send completes only
/// when the worker picks the instruction up, so at most one dispatch is
/// ever in flight and the heap writes of instruction *n* are visible to
/// instruction *n+1*. Dispatch faults go to the fault sink and never halt
/// the loop.
pub struct Interpreter {
    directory: Arc<Mutex<Directory>>,
    heap: Arc<Mutex<Heap>>,
    sink: Arc<dyn FaultSink>,
    scenario: Scenario,
    state: Arc<Mutex<RunState>>,
    stop_tx: Sender<()>,
    stop_rx: Receiver<()>,
}

impl Interpreter {
    pub fn new(directory: Directory, scenario: Scenario) -> Self {
        Self::with_sink(directory, scenario, Arc::new(StderrSink))
    }

    pub fn with_sink(directory: Directory, scenario: Scenario, sink: Arc<dyn FaultSink>) -> Self {
        let (stop_tx, stop_rx) = bounded(1);
        Self {
            directory: Arc::new(Mutex::new(directory)),
            heap: Arc::new(Mutex::new(Heap::new())),
            sink,
            scenario,
            state: Arc::new(Mutex::new(RunState::Idle)),
            stop_tx,
            stop_rx,
        }
    }

    pub fn state(&self) -> RunState {
        *lock(&self.state)
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// A handle that can discard the remaining queue from another thread.
    pub fn stop_trigger(&self) -> StopTrigger {
        StopTrigger {
            tx: self.stop_tx.clone(),
        }
    }

    /// A copy of the heap as of now. With a dispatch in flight the snapshot
    /// reflects whichever instructions have completed.
    pub fn heap_snapshot(&self) -> Heap {
        lock(&self.heap).clone()
    }

    /// Runs the whole scenario on the calling thread, returning once every
    /// instruction has executed, faulted, or been discarded by a stop.
    pub fn run(&mut self) -> Result<RunSummary, DiscError> {
        let mut queue: VecDeque<(usize, Instruction)> = self
            .scenario
            .instructions()
            .iter()
            .cloned()
            .enumerate()
            .collect();
        let mut summary = RunSummary::default();
        *lock(&self.state) = RunState::Running;

        let stop_rx = self.stop_rx.clone();
        let (task_tx, task_rx) = bounded::<(usize, Instruction)>(0);
        let directory = Arc::clone(&self.directory);
        let heap = Arc::clone(&self.heap);
        let worker_sink = Arc::clone(&self.sink);
        let worker = thread::Builder::new()
            .name("disc-dispatch".to_string())
            .spawn(move || {
                let mut executed = 0usize;
                let mut faulted = 0usize;
                for (index, instruction) in task_rx.iter() {
                    let mut directory = lock(&directory);
                    let mut heap = lock(&heap);
                    match dispatch(
                        &instruction,
                        index,
                        &mut directory,
                        &mut heap,
                        worker_sink.as_ref(),
                    ) {
                        Ok(_) => executed += 1,
                        Err(fault) => {
                            faulted += 1;
                            worker_sink.report(fault);
                        }
                    }
                }
                (executed, faulted)
            })
            .map_err(|error| DiscError::new("INTERPRETER_SPAWN", error.to_string()))?;

        while let Some((index, instruction)) = queue.pop_front() {
            // A stop request beats the next submission; racing stops may
            // still let the submission through, which is acceptable.
            if stop_rx.try_recv().is_ok() {
                summary.discarded = queue.len() + 1;
                queue.clear();
                break;
            }

            match instruction.kind() {
                None => {
                    summary.skipped += 1;
                    self.sink.report(Fault {
                        kind: FaultKind::Parse,
                        index,
                        instruction: instruction.to_string(),
                        error: DiscError::new(
                            "PARSE_UNRECOGNIZED_LINE",
                            "Line matched no instruction grammar.",
                        ),
                    });
                    continue;
                }
                Some(InstructionKind::Delimiter) | Some(InstructionKind::ControlState) => {
                    // Acting on these belongs to a scenario-chaining driver
                    // outside this loop; they never reach the dispatcher.
                    summary.skipped += 1;
                    continue;
                }
                Some(InstructionKind::Command) => {}
            }

            let mut stopped = false;
            select! {
                send(task_tx, (index, instruction.clone())) -> sent => {
                    if sent.is_err() {
                        // Worker gone; nothing left to submit to.
                        summary.discarded = queue.len() + 1;
                        queue.clear();
                        stopped = true;
                    }
                },
                recv(stop_rx) -> _ => {
                    summary.discarded = queue.len() + 1;
                    queue.clear();
                    stopped = true;
                },
            }
            if stopped {
                break;
            }
        }

        *lock(&self.state) = RunState::Draining;
        drop(task_tx);
        let (executed, faulted) = worker.join().map_err(|_| {
            DiscError::new(
                "INTERPRETER_WORKER_PANICKED",
                "Dispatch worker thread panicked.",
            )
        })?;
        summary.executed = executed;
        summary.faulted = faulted;
        *lock(&self.state) = RunState::Terminated;
        Ok(summary)
    }

    /// Runs the scenario on a background thread, the way a host keeps its
    /// own control loop responsive while a scenario plays out.
    pub fn start(mut self) -> Result<InterpreterHandle, DiscError> {
        let trigger = self.stop_trigger();
        let state = Arc::clone(&self.state);
        let heap = Arc::clone(&self.heap);
        let thread = thread::Builder::new()
            .name("disc-interpreter".to_string())
            .spawn(move || self.run())
            .map_err(|error| DiscError::new("INTERPRETER_SPAWN", error.to_string()))?;
        Ok(InterpreterHandle {
            trigger,
            state,
            heap,
            thread,
        })
    }
}

/// Handle to an interpreter running on its own thread.
pub struct InterpreterHandle {
    trigger: StopTrigger,
    state: Arc<Mutex<RunState>>,
    heap: Arc<Mutex<Heap>>,
    thread: thread::JoinHandle<Result<RunSummary, DiscError>>,
}

impl InterpreterHandle {
    pub fn stop(&self) {
        self.trigger.stop();
    }

    pub fn state(&self) -> RunState {
        *lock(&self.state)
    }

    pub fn heap_snapshot(&self) -> Heap {
        lock(&self.heap).clone()
    }

    pub fn join(self) -> Result<RunSummary, DiscError> {
        self.thread.join().map_err(|_| {
            DiscError::new(
                "INTERPRETER_WORKER_PANICKED",
                "Interpreter thread panicked.",
            )
        })?
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

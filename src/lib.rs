//! This crate provides the core logic for a single-tape Turing Machine emulator.
//! It includes modules for compiling transition-table programs, executing them against
//! an unbounded tape, driving execution over time, and loading program sources.

pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod render;
pub mod runner;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the program loading types from the loader module.
pub use loader::{initial_tape_directive, ProgramLoader, ProgramSource};
/// Re-exports the `TuringMachine` struct from the machine module.
pub use machine::TuringMachine;
/// Re-exports the `compile` function from the parser module.
pub use parser::compile;
/// Re-exports `ProgramManager` and `PROGRAMS` from the programs module.
pub use programs::{ProgramManager, PROGRAMS};
/// Re-exports the display sink interface from the render module.
pub use render::{Renderer, Snapshot};
/// Re-exports the run control types from the runner module.
pub use runner::{CancellationToken, Controls, RunConfig, RunOutcome, Runner, Speed, Tick};
/// Re-exports the `Tape` struct from the tape module.
pub use tape::Tape;
/// Re-exports various types related to program definition and execution from the types module.
pub use types::{Diagnostic, Direction, Halt, Program, Step, Transition, TuringMachineError};

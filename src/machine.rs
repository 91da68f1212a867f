//! This module defines the `TuringMachine` struct, the single owned session that holds a
//! compiled program together with the machine state: tape, head position, current state,
//! step counter and the latest status message.

use crate::parser::compile;
use crate::tape::Tape;
use crate::types::{
    Diagnostic, Halt, Program, Step, Transition, TuringMachineError, HALT_STATE, INITIAL_STATE,
    WILDCARD, WILDCARD_STATE,
};
use tracing::{debug, trace, warn};

/// Status shown after a reset.
pub const STATUS_RESET: &str = "Machine reset.";
/// Status shown once the machine is in the `halt` state.
pub const STATUS_HALTED: &str = "Halted.";

/// Represents a single-tape Turing Machine session.
///
/// The session owns the program source it was built from. Resetting always
/// recompiles that source, so edits made with [`TuringMachine::load`] take
/// effect on the next reset at the latest.
#[derive(Debug, Clone)]
pub struct TuringMachine {
    source: String,
    program: Program,
    tape: Tape,
    head: i64,
    state: String,
    step_count: usize,
    status: String,
}

impl TuringMachine {
    /// Creates a machine from program source and an initial tape, ready to run.
    pub fn new(source: impl Into<String>, initial_tape: &str) -> Self {
        let source = source.into();
        let mut machine = Self {
            program: Program::default(),
            source,
            tape: Tape::default(),
            head: 0,
            state: INITIAL_STATE.to_string(),
            step_count: 0,
            status: String::new(),
        };
        machine.reset(initial_tape);
        machine
    }

    /// Executes a single step of the machine.
    ///
    /// Reads the symbol under the head, resolves the rule for the current
    /// state and symbol, writes, moves and changes state. When no rule applies
    /// the machine writes the symbol back, stays put and halts.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if the machine can take another step.
    /// * `Step::Halt(Halt::Ok)` if a rule moved the machine into `halt`.
    /// * `Step::Halt(Halt::Err(UndefinedTransition))` if no rule matched.
    /// * `Step::Halt(Halt::Err(AlreadyHalted))` if the machine was already halted.
    ///   Nothing changes in that case.
    pub fn step(&mut self) -> Step {
        if self.is_halted() {
            warn!("step requested while in halt state");
            self.status = STATUS_HALTED.to_string();
            return Step::Halt(Halt::Err(TuringMachineError::AlreadyHalted));
        }

        let symbol = self.symbol();
        let (transition, outcome) = match self.program.resolve(&self.state, symbol) {
            Some(transition) => (transition.clone(), Halt::Ok),
            None => {
                let error = TuringMachineError::UndefinedTransition(self.state.clone(), symbol);
                warn!("{error}; halting");
                (
                    Transition::implicit_halt(&self.state, symbol),
                    Halt::Err(error),
                )
            }
        };

        let next_state = if transition.next_state == WILDCARD_STATE {
            self.state.clone()
        } else {
            transition.next_state.clone()
        };
        let write = if transition.write == WILDCARD {
            symbol
        } else {
            transition.write
        };

        self.tape.write(self.head, write);
        self.state = next_state;
        self.head += transition.direction.offset();
        self.step_count += 1;

        trace!(
            step = self.step_count,
            line = transition.line,
            state = %self.state,
            head = self.head,
            tape = %self.tape,
            "step finished"
        );

        if !self.is_halted() {
            return Step::Continue;
        }

        self.status = match &outcome {
            Halt::Err(error) => format!("{error}. Halted."),
            Halt::Ok => STATUS_HALTED.to_string(),
        };
        Step::Halt(outcome)
    }

    /// Resets the machine with a new initial tape.
    ///
    /// The state returns to `"0"`, the head to position 0 and the step counter
    /// to 0. The program is recompiled from the current source; if compiling
    /// reports a redefinition, that warning becomes the status message.
    pub fn reset(&mut self, initial_tape: &str) {
        self.tape = Tape::new(initial_tape);
        self.head = 0;
        self.state = INITIAL_STATE.to_string();
        self.step_count = 0;
        self.status = STATUS_RESET.to_string();

        self.compile();
        debug!(tape = %self.tape, "machine reset");
    }

    /// Replaces the program source and compiles it, leaving the tape, head,
    /// state and step counter untouched.
    pub fn load(&mut self, source: impl Into<String>) {
        self.source = source.into();
        self.compile();
    }

    fn compile(&mut self) {
        self.program = compile(&self.source);

        let redefinition = self
            .program
            .diagnostics()
            .iter()
            .rev()
            .find(|d| matches!(d, Diagnostic::Redefinition { .. }));
        if let Some(diagnostic) = redefinition {
            self.status = diagnostic.to_string();
        }
    }

    /// Returns the symbol under the head.
    pub fn symbol(&self) -> char {
        self.tape.read(self.head)
    }

    /// Returns the current state of the machine.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the logical position of the head.
    pub fn head(&self) -> i64 {
        self.head
    }

    /// Returns the total number of steps executed since the last reset.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the latest human-readable status message.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Replaces the status message. Used by controllers for pause/run notices.
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Checks if the machine is in the `halt` state.
    pub fn is_halted(&self) -> bool {
        self.state == HALT_STATE
    }
}

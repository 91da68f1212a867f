//! This module defines the core data structures and types used throughout the Turing Machine
//! emulator, including transitions, step outcomes, compile diagnostics, and error types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The symbol occupying every tape cell that has never been written.
pub const BLANK_SYMBOL: char = '_';
/// The wildcard marker. As a rule key it matches any value not matched more
/// specifically; as a rule output it means "leave unchanged".
pub const WILDCARD: char = '*';
/// The wildcard marker as it appears in state positions.
pub const WILDCARD_STATE: &str = "*";
/// The state every machine starts in after a reset.
pub const INITIAL_STATE: &str = "0";
/// The distinguished terminal state.
pub const HALT_STATE: &str = "halt";

/// Normalizes a raw tape character: a literal space is stored as the blank symbol.
pub fn normalize_symbol(symbol: char) -> char {
    if symbol == ' ' {
        BLANK_SYMBOL
    } else {
        symbol
    }
}

/// A compiled transition table.
///
/// Rules are indexed first by state, then by symbol. The wildcard is stored
/// under its literal key (`"*"` / `'*'`) and only consulted by [`Program::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// state -> symbol -> rule.
    pub rules: HashMap<String, HashMap<char, Transition>>,
    /// Problems found while compiling, in source order.
    pub diagnostics: Vec<Diagnostic>,
}

impl Program {
    /// Inserts a rule under its (state, symbol) key, returning the rule it replaced.
    pub fn insert(&mut self, transition: Transition) -> Option<Transition> {
        self.rules
            .entry(transition.state.clone())
            .or_default()
            .insert(transition.symbol, transition)
    }

    /// Returns the rule stored under exactly this key, without wildcard fallback.
    pub fn rule(&self, state: &str, symbol: char) -> Option<&Transition> {
        self.rules.get(state).and_then(|symbols| symbols.get(&symbol))
    }

    /// Finds the rule that applies to `state` reading `symbol`.
    ///
    /// The most specific rule wins, in this order:
    ///
    /// 1. exact state, exact symbol
    /// 2. exact state, wildcard symbol
    /// 3. wildcard state, exact symbol
    /// 4. wildcard state, wildcard symbol
    pub fn resolve(&self, state: &str, symbol: char) -> Option<&Transition> {
        self.rule(state, symbol)
            .or_else(|| self.rule(state, WILDCARD))
            .or_else(|| self.rule(WILDCARD_STATE, symbol))
            .or_else(|| self.rule(WILDCARD_STATE, WILDCARD))
    }

    /// Returns the names of all states that have at least one rule, sorted.
    pub fn states(&self) -> Vec<&str> {
        let mut states: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        states.sort_unstable();
        states
    }

    /// The number of rules in the program.
    pub fn len(&self) -> usize {
        self.rules.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Represents a single transition rule of the program.
///
/// `state` and `symbol` form the lookup key and may be the wildcard. `write`
/// and `next_state` may also be the wildcard, meaning "keep what is there".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The state this rule applies to.
    pub state: String,
    /// The symbol under the head this rule applies to.
    pub symbol: char,
    /// The symbol to write.
    pub write: char,
    /// The direction to move the head after writing.
    pub direction: Direction,
    /// The state to enter.
    pub next_state: String,
    /// 1-based source line the rule was compiled from. Zero for synthesized rules.
    pub line: usize,
}

impl Transition {
    /// The rule used when nothing in the program matches: write the symbol
    /// back, stay put and halt.
    pub fn implicit_halt(state: &str, symbol: char) -> Self {
        Self {
            state: state.to_string(),
            symbol,
            write: symbol,
            direction: Direction::Stay,
            next_state: HALT_STATE.to_string(),
            line: 0,
        }
    }
}

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// Maps an action character to a direction, case-insensitively.
    /// `r`/`>` move right, `l`/`<` move left, anything else stays.
    pub fn from_action(action: char) -> Self {
        match action.to_ascii_lowercase() {
            'r' | '>' => Direction::Right,
            'l' | '<' => Direction::Left,
            _ => Direction::Stay,
        }
    }

    /// The change in head position.
    pub fn offset(self) -> i64 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Stay => 0,
        }
    }
}

/// Represents the outcome of a single execution step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The machine performed a step and may continue.
    Continue,
    /// The machine is in the `halt` state and cannot continue.
    Halt(Halt),
}

impl Step {
    /// `true` when the machine can take another step.
    pub fn is_continue(&self) -> bool {
        matches!(self, Step::Continue)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Halt {
    /// Halted by a rule that entered `halt`.
    Ok,

    /// Halted by the implicit rule, or the step was requested while already halted.
    Err(TuringMachineError),
}

/// A non-fatal problem found while compiling program source.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Diagnostic {
    /// A line that does not contain the five fields of a rule.
    #[error("Syntax error on line {line}: '{text}'")]
    Syntax { line: usize, text: String },
    /// A rule whose (state, symbol) key was already defined. The later rule wins.
    #[error("Warning: multiple definitions for state '{state}' symbol '{symbol}' on lines {first_line} and {second_line}")]
    Redefinition {
        state: String,
        symbol: char,
        first_line: usize,
        second_line: usize,
    },
}

/// Represents various errors that can occur during Turing Machine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TuringMachineError {
    /// No rule matched the current state and symbol; the machine was forced into `halt`.
    #[error("No rule found for state '{0}', symbol '{1}'")]
    UndefinedTransition(String, char),
    /// A step was requested after the machine had already halted.
    #[error("Step requested while in halt state")]
    AlreadyHalted,
    /// Indicates a lookup or input that does not refer to anything valid.
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to reading program files.
    #[error("File error: {0}")]
    FileError(String),
}

//! This module defines the interface between the machine and whatever displays it. A
//! `Renderer` receives a `Snapshot` of the visible machine state each time it changes.

use crate::machine::TuringMachine;
use crate::types::BLANK_SYMBOL;
use serde::{Deserialize, Serialize};

/// A display sink for machine state.
pub trait Renderer {
    /// Shows the current tape, head, state, step count and status message.
    fn render(&mut self, snapshot: &Snapshot);
}

/// Discards every snapshot.
impl Renderer for () {
    fn render(&mut self, _snapshot: &Snapshot) {}
}

/// Collects every snapshot in order.
impl Renderer for Vec<Snapshot> {
    fn render(&mut self, snapshot: &Snapshot) {
        self.push(snapshot.clone());
    }
}

/// Keeps only the latest snapshot.
impl Renderer for Snapshot {
    fn render(&mut self, snapshot: &Snapshot) {
        self.clone_from(snapshot);
    }
}

/// The visible state of a machine at one point in time.
///
/// The tape is split around the head. `left` starts at the leftmost non-blank
/// cell (or at the head, if the head is further left) and `right` ends at the
/// rightmost non-blank cell (or at the head).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Tape cells to the left of the head.
    pub left: String,
    /// The symbol under the head.
    pub head_symbol: char,
    /// Tape cells to the right of the head.
    pub right: String,
    /// The logical head position.
    pub head: i64,
    pub state: String,
    pub step_count: usize,
    pub status: String,
}

impl Snapshot {
    /// Captures the visible state of `machine`.
    pub fn capture(machine: &TuringMachine) -> Self {
        let tape = machine.tape();
        let head = machine.head();
        let (start, end) = match tape.extent() {
            Some(extent) => ((*extent.start()).min(head), (*extent.end()).max(head)),
            None => (head, head),
        };

        Self {
            left: tape.window(start..=head - 1),
            head_symbol: machine.symbol(),
            right: tape.window(head + 1..=end),
            head,
            state: machine.state().to_string(),
            step_count: machine.step_count(),
            status: machine.status().to_string(),
        }
    }

    /// Renders the tape on one line with blanks shown as spaces and the head
    /// symbol in brackets.
    pub fn tape_line(&self) -> String {
        let show = |text: &str| text.replace(BLANK_SYMBOL, " ");
        let head = if self.head_symbol == BLANK_SYMBOL {
            ' '
        } else {
            self.head_symbol
        };

        format!("{}[{}]{}", show(&self.left), head, show(&self.right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_head_inside_tape() {
        let mut machine = TuringMachine::new("0 * * r 0", "abcd");
        machine.step();
        machine.step();

        let snapshot = Snapshot::capture(&machine);

        assert_eq!(snapshot.left, "ab");
        assert_eq!(snapshot.head_symbol, 'c');
        assert_eq!(snapshot.right, "d");
        assert_eq!(snapshot.head, 2);
        assert_eq!(snapshot.state, "0");
        assert_eq!(snapshot.step_count, 2);
    }

    #[test]
    fn test_capture_head_right_of_tape() {
        let mut machine = TuringMachine::new("0 * * r 0", "ab");
        for _ in 0..4 {
            machine.step();
        }

        let snapshot = Snapshot::capture(&machine);

        assert_eq!(snapshot.left, "ab__");
        assert_eq!(snapshot.head_symbol, '_');
        assert_eq!(snapshot.right, "");
        assert_eq!(snapshot.tape_line(), "ab  [ ]");
    }

    #[test]
    fn test_capture_head_left_of_tape() {
        let mut machine = TuringMachine::new("0 * * l 0", "ab");
        machine.step();
        machine.step();

        let snapshot = Snapshot::capture(&machine);

        assert_eq!(snapshot.head, -2);
        assert_eq!(snapshot.left, "");
        assert_eq!(snapshot.head_symbol, '_');
        assert_eq!(snapshot.right, "_ab");
    }

    #[test]
    fn test_capture_blank_tape() {
        let machine = TuringMachine::new("", "");

        let snapshot = Snapshot::capture(&machine);

        assert_eq!(snapshot.left, "");
        assert_eq!(snapshot.right, "");
        assert_eq!(snapshot.tape_line(), "[ ]");
    }

    #[test]
    fn test_snapshot_json() {
        let machine = TuringMachine::new("", "1_1");
        let json = serde_json::to_value(Snapshot::capture(&machine)).unwrap();

        assert_eq!(json["head_symbol"], "1");
        assert_eq!(json["right"], "_1");
        assert_eq!(json["state"], "0");
        assert_eq!(json["step_count"], 0);
    }

    #[test]
    fn test_snapshot_renderer_keeps_latest() {
        let mut machine = TuringMachine::new("0 * * r 0", "ab");
        let mut latest = Snapshot::capture(&machine);

        machine.step();
        latest.render(&Snapshot::capture(&machine));

        assert_eq!(latest.step_count, 1);
        assert_eq!(latest.left, "a");
    }

    #[test]
    fn test_vec_renderer_collects() {
        let machine = TuringMachine::new("", "1");
        let mut sink: Vec<Snapshot> = Vec::new();

        sink.render(&Snapshot::capture(&machine));
        sink.render(&Snapshot::capture(&machine));

        assert_eq!(sink.len(), 2);
    }
}

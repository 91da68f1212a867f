//! This module defines the `Tape`, a two-way infinite sequence of symbols backed by a
//! bounded buffer. Only the span between the leftmost and rightmost non-blank cells is
//! stored; every other cell reads as the blank symbol.

use crate::types::{normalize_symbol, BLANK_SYMBOL};
use std::collections::VecDeque;
use std::fmt;
use std::ops::RangeInclusive;

/// A tape addressed by signed logical positions.
///
/// ```text
///           offset
///             v
///   ... _  _  1  0  _  1  _  _ ...   logical content
///            -1  0  1  2             logical position
///            [0][1][2][3]            buffer index
/// ```
///
/// The buffer never begins or ends with a blank, so an all-blank tape has an
/// empty buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tape {
    cells: VecDeque<char>,
    offset: i64,
}

impl Tape {
    /// Creates a tape holding `content` with its first character at position 0.
    ///
    /// Spaces are stored as blanks. Leading and trailing blanks are not kept in
    /// the buffer, which doesn't change the logical content.
    pub fn new(content: &str) -> Self {
        let mut tape = Self {
            cells: content.chars().map(normalize_symbol).collect(),
            offset: 0,
        };
        tape.trim();
        tape
    }

    /// Returns the symbol at `position`; blank outside the stored span.
    pub fn read(&self, position: i64) -> char {
        self.index(position)
            .map(|index| self.cells[index])
            .unwrap_or(BLANK_SYMBOL)
    }

    /// Writes `symbol` at `position`.
    ///
    /// Inside the stored span the cell is overwritten in place. Outside it the
    /// buffer grows to reach `position`, unless `symbol` is blank, in which case
    /// nothing needs to change.
    pub fn write(&mut self, position: i64, symbol: char) {
        let symbol = normalize_symbol(symbol);

        if let Some(index) = self.index(position) {
            self.cells[index] = symbol;
            if symbol == BLANK_SYMBOL {
                self.trim();
            }
            return;
        }

        if symbol == BLANK_SYMBOL {
            return;
        }

        if self.cells.is_empty() {
            self.cells.push_back(symbol);
            self.offset = position;
        } else if position < self.offset {
            for _ in position + 1..self.offset {
                self.cells.push_front(BLANK_SYMBOL);
            }
            self.cells.push_front(symbol);
            self.offset = position;
        } else {
            let end = self.offset + self.cells.len() as i64;
            for _ in end..position {
                self.cells.push_back(BLANK_SYMBOL);
            }
            self.cells.push_back(symbol);
        }
    }

    /// Returns the positions of the leftmost and rightmost non-blank cells, or
    /// `None` for an all-blank tape.
    pub fn extent(&self) -> Option<RangeInclusive<i64>> {
        if self.cells.is_empty() {
            None
        } else {
            Some(self.offset..=self.offset + self.cells.len() as i64 - 1)
        }
    }

    /// Returns the symbols in `range`, blanks included.
    pub fn window(&self, range: RangeInclusive<i64>) -> String {
        range.map(|position| self.read(position)).collect()
    }

    /// Returns the symbols from the leftmost to the rightmost non-blank cell.
    pub fn contents(&self) -> String {
        self.cells.iter().collect()
    }

    /// `true` when every cell is blank.
    pub fn is_blank(&self) -> bool {
        self.cells.is_empty()
    }

    fn index(&self, position: i64) -> Option<usize> {
        let index = position.checked_sub(self.offset)?;
        if index >= 0 && (index as usize) < self.cells.len() {
            Some(index as usize)
        } else {
            None
        }
    }

    fn trim(&mut self) {
        while self.cells.front() == Some(&BLANK_SYMBOL) {
            self.cells.pop_front();
            self.offset += 1;
        }
        while self.cells.back() == Some(&BLANK_SYMBOL) {
            self.cells.pop_back();
        }
        if self.cells.is_empty() {
            self.offset = 0;
        }
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.cells {
            write!(f, "{symbol}")?;
        }
        Ok(())
    }
}

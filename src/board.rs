//! The 3x3 board value type and its win/draw evaluator.

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// The 8 winning triples: 3 rows, 3 columns, 2 diagonals.
const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Outcome of evaluating the board after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The mover completed a winning line.
    Win,
    /// The board is full with no winning line.
    Draw,
    /// The game continues.
    Continue,
}

/// 3x3 tic-tac-toe board.
///
/// Cells are indexed 0-8 in row-major order (`index = row * 3 + col`), each
/// holding the occupying player's id or `None` when empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [Option<i32>; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self { cells: [None; 9] }
    }

    /// Reconstructs a board from its stored cells.
    pub fn from_cells(cells: [Option<i32>; 9]) -> Self {
        Self { cells }
    }

    /// Returns all cells in row-major order.
    pub fn cells(&self) -> &[Option<i32>; 9] {
        &self.cells
    }

    /// Returns the player occupying the given cell, if any.
    pub fn cell(&self, index: usize) -> Option<i32> {
        self.cells.get(index).copied().flatten()
    }

    /// Checks if the given cell is unoccupied.
    pub fn is_empty(&self, index: usize) -> bool {
        matches!(self.cells.get(index), Some(None))
    }

    /// Returns the number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Places the player's mark in the given cell.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] if the index is out of 0-8 and
    /// [`GameError::InvalidOperation`] if the cell is already occupied.
    pub fn place(&mut self, index: usize, player_id: i32) -> Result<(), GameError> {
        if index >= 9 {
            return Err(GameError::invalid_argument(format!(
                "cell index {index} out of bounds (must be 0-8)"
            )));
        }
        if self.cells[index].is_some() {
            return Err(GameError::invalid_operation("cell is already occupied"));
        }
        self.cells[index] = Some(player_id);
        Ok(())
    }

    /// Evaluates the board for the player who just moved.
    ///
    /// Only the mover's lines are checked: prior state had no winner and
    /// turns alternate, so the opponent cannot have completed a line on
    /// someone else's move.
    pub fn evaluate(&self, player_id: i32, move_count: i32) -> MoveOutcome {
        for [a, b, c] in WIN_LINES {
            if self.cells[a] == Some(player_id)
                && self.cells[b] == Some(player_id)
                && self.cells[c] == Some(player_id)
            {
                return MoveOutcome::Win;
            }
        }
        if move_count == 9 {
            return MoveOutcome::Draw;
        }
        MoveOutcome::Continue
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

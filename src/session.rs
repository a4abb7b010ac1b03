//! Game session lifecycle and turn enforcement.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::board::{Board, MoveOutcome};
use crate::error::GameError;

/// Lifecycle status of a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created by player 1, waiting for an opponent to join.
    WaitingForPlayer,
    /// Both players present, moves being played.
    InProgress,
    /// Terminal: won or drawn. Never mutated again.
    Finished,
}

/// One tic-tac-toe match between two players.
///
/// Holds player *ids*, never live user records; resolving a player is an
/// explicit fallible lookup through the repository. All mutating operations
/// validate every precondition before touching any field, so a failed call
/// leaves the session exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Session ID, assigned at creation.
    pub id: Uuid,
    /// Player 1 (the creator; always moves first).
    pub player1_id: i32,
    /// Player 2, absent until joined.
    pub player2_id: Option<i32>,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// Winner, present only for a decisive finish.
    pub winner_id: Option<i32>,
    /// The board.
    pub board: Board,
    /// Whose turn it is, present only while in progress.
    pub current_turn_player_id: Option<i32>,
    /// Number of occupied cells (0-9).
    pub move_count: i32,
}

impl Session {
    /// Creates a new session in `WaitingForPlayer` with an empty board.
    #[instrument]
    pub fn new(player1_id: i32) -> Self {
        let id = Uuid::new_v4();
        info!(session_id = %id, player1_id, "Creating new game session");
        Self {
            id,
            player1_id,
            player2_id: None,
            status: SessionStatus::WaitingForPlayer,
            winner_id: None,
            board: Board::new(),
            current_turn_player_id: None,
            move_count: 0,
        }
    }

    /// Checks whether the given player is one of the two participants.
    pub fn is_participant(&self, player_id: i32) -> bool {
        self.player1_id == player_id || self.player2_id == Some(player_id)
    }

    /// Joins player 2, starting the game with player 1 to move.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] unless the session is waiting for
    /// a player, and [`GameError::InvalidOperation`] on self-play.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn join(&mut self, player2_id: i32) -> Result<(), GameError> {
        if self.status != SessionStatus::WaitingForPlayer {
            return Err(GameError::invalid_state("game is not waiting for a player"));
        }
        if self.player1_id == player2_id {
            return Err(GameError::invalid_operation("cannot play against yourself"));
        }

        self.player2_id = Some(player2_id);
        self.status = SessionStatus::InProgress;
        // Player 1 always starts.
        self.current_turn_player_id = Some(self.player1_id);

        info!(player2_id, "Player 2 joined, game in progress");
        Ok(())
    }

    /// Applies a move by the given player at (row, col).
    ///
    /// Validation order follows the operation contract: status, turn,
    /// participation, coordinates, cell occupancy. On a terminal outcome the
    /// session transitions to `Finished` with the winner set (or absent for
    /// a draw) and the turn pointer cleared; otherwise the turn flips.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`], [`GameError::InvalidOperation`],
    /// or [`GameError::InvalidArgument`] per the contract above.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn apply_move(
        &mut self,
        player_id: i32,
        row: i32,
        col: i32,
    ) -> Result<MoveOutcome, GameError> {
        if self.status != SessionStatus::InProgress {
            return Err(GameError::invalid_state("game is not in progress"));
        }
        if self.current_turn_player_id != Some(player_id) {
            return Err(GameError::invalid_operation("not your turn"));
        }
        if !self.is_participant(player_id) {
            return Err(GameError::invalid_operation(
                "player is not part of this game",
            ));
        }
        if !(0..=2).contains(&row) || !(0..=2).contains(&col) {
            return Err(GameError::invalid_argument("invalid cell coordinates"));
        }

        let index = (row * 3 + col) as usize;
        self.board.place(index, player_id)?;
        self.move_count += 1;

        let outcome = self.board.evaluate(player_id, self.move_count);
        match outcome {
            MoveOutcome::Win => {
                self.status = SessionStatus::Finished;
                self.winner_id = Some(player_id);
                self.current_turn_player_id = None;
                info!(player_id, move_count = self.move_count, "Game won");
            }
            MoveOutcome::Draw => {
                self.status = SessionStatus::Finished;
                self.winner_id = None;
                self.current_turn_player_id = None;
                info!(move_count = self.move_count, "Game drawn");
            }
            MoveOutcome::Continue => {
                self.current_turn_player_id = Some(self.other_player(player_id));
                debug!(
                    player_id,
                    next_turn = ?self.current_turn_player_id,
                    "Move applied, turn passes"
                );
            }
        }

        Ok(outcome)
    }

    /// Returns the opponent of the given participant.
    fn other_player(&self, player_id: i32) -> i32 {
        if player_id == self.player1_id {
            // In progress implies player 2 is present.
            self.player2_id.unwrap_or(self.player1_id)
        } else {
            self.player1_id
        }
    }
}

//! Stats aggregation for finished games and derived per-user views.

use serde::Serialize;
use tracing::instrument;

use crate::db::User;
use crate::session::{Session, SessionStatus};

/// Counter deltas to apply to both participants of a just-finished game.
///
/// Computed once per terminal transition and applied inside the finishing
/// transaction, before the session gate is released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsUpdate {
    /// Player 1 of the finished session.
    pub player1_id: i32,
    /// Player 2 of the finished session.
    pub player2_id: i32,
    /// Winner credit, absent for a draw.
    pub winner: Option<WinnerCredit>,
}

/// The winner's share of a decisive finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinnerCredit {
    /// The winning player.
    pub player_id: i32,
    /// The winner's own move count: player 1 moves on odd move numbers, so
    /// this is `ceil(N/2)` when player 1 wins and `floor(N/2)` when player 2
    /// wins, for a game of `N` total moves.
    pub winning_moves: i32,
}

impl StatsUpdate {
    /// Computes the update for a finished session.
    ///
    /// Returns `None` unless the session is `Finished` with both players
    /// present; both participants gain one played game, and a decisive
    /// winner additionally gains one win plus their own move count.
    #[instrument(skip(session), fields(session_id = %session.id))]
    pub fn from_finished(session: &Session) -> Option<Self> {
        if session.status != SessionStatus::Finished {
            return None;
        }
        let player2_id = session.player2_id?;

        let winner = session.winner_id.map(|winner_id| {
            let winning_moves = if winner_id == session.player1_id {
                (session.move_count + 1) / 2
            } else {
                session.move_count / 2
            };
            WinnerCredit {
                player_id: winner_id,
                winning_moves,
            }
        });

        Some(Self {
            player1_id: session.player1_id,
            player2_id,
            winner,
        })
    }
}

/// Derived per-user statistics view, as exposed over the API.
#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    /// User id.
    pub id: i32,
    /// Username.
    pub username: String,
    /// Cumulative wins.
    pub total_wins: i32,
    /// Cumulative games played.
    pub total_games_played: i32,
    /// Wins over games played, 0 when no games yet.
    pub win_ratio: f64,
    /// Average number of the player's own moves per win (lower is more
    /// efficient); absent with zero wins.
    pub efficiency: Option<f64>,
}

impl UserStats {
    /// Derives the stats view from a stored user record.
    pub fn from_user(user: &User) -> Self {
        let win_ratio = if *user.total_games_played() > 0 {
            f64::from(*user.total_wins()) / f64::from(*user.total_games_played())
        } else {
            0.0
        };
        let efficiency = if *user.total_wins() > 0 {
            Some(f64::from(*user.total_moves_made_in_wins()) / f64::from(*user.total_wins()))
        } else {
            None
        };
        Self {
            id: *user.id(),
            username: user.username().clone(),
            total_wins: *user.total_wins(),
            total_games_played: *user.total_games_played(),
            win_ratio,
            efficiency,
        }
    }
}

//! Game service: the concurrency gate wrapped around persistence and the
//! session state machine.

use std::str::FromStr;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::db::{GameRepository, User};
use crate::error::GameError;
use crate::gate::SessionGate;
use crate::session::Session;
use crate::stats::{StatsUpdate, UserStats};

/// Leaderboard size.
const PODIUM: i64 = 3;

/// Leaderboard ranking key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    /// Rank descending by cumulative wins.
    Wins,
    /// Rank ascending by moves-per-win (fewer ranks first), over users with
    /// at least one win.
    Efficiency,
}

impl FromStr for RankBy {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wins" => Ok(Self::Wins),
            "efficiency" => Ok(Self::Efficiency),
            _ => Err(GameError::invalid_argument(format!(
                "invalid ranking key '{s}' (use 'wins' or 'efficiency')"
            ))),
        }
    }
}

/// Service layer for match and user operations.
///
/// `join_game` and `make_move` run their whole read-validate-write sequence
/// under the per-session [`SessionGate`], so no two mutations of the same
/// session ever interleave; `create_game` and `get_game` bypass the gate.
#[derive(Debug, Clone)]
pub struct GameService {
    repository: GameRepository,
    gate: SessionGate,
}

impl GameService {
    /// Creates a new service backed by the given repository.
    #[instrument(skip(repository))]
    pub fn new(repository: GameRepository) -> Self {
        info!("Creating GameService");
        Self {
            repository,
            gate: SessionGate::new(),
        }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &GameRepository {
        &self.repository
    }

    /// Creates a new user with zeroed stats.
    #[instrument(skip(self))]
    pub fn create_user(&self, username: String) -> Result<User, GameError> {
        debug!(username = %username, "Creating user");
        Ok(self.repository.create_user(username)?)
    }

    /// Creates a new session with the given user as player 1.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotFound`] if player 1 does not exist.
    #[instrument(skip(self))]
    pub fn create_game(&self, player1_id: i32) -> Result<Session, GameError> {
        self.repository
            .find_user(player1_id)?
            .ok_or_else(|| GameError::not_found("player 1 not found"))?;

        let session = Session::new(player1_id);
        self.repository.insert_session(&session)?;

        info!(session_id = %session.id, player1_id, "Game created");
        Ok(session)
    }

    /// Joins player 2 to a waiting session, starting the game.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotFound`] if the session or player 2 is absent,
    /// [`GameError::InvalidState`] if the session is not waiting, and
    /// [`GameError::InvalidOperation`] on self-play.
    #[instrument(skip(self))]
    pub async fn join_game(&self, game_id: Uuid, player2_id: i32) -> Result<Session, GameError> {
        // Released on every exit path by drop.
        let _guard = self.gate.acquire(game_id).await;

        let mut session = self
            .repository
            .find_session(game_id)?
            .ok_or_else(|| GameError::not_found("game not found"))?;

        self.repository
            .find_user(player2_id)?
            .ok_or_else(|| GameError::not_found("player 2 not found"))?;

        session.join(player2_id)?;
        self.repository.save_session(&session)?;

        info!(session_id = %session.id, player2_id, "Player joined game");
        Ok(session)
    }

    /// Applies a move, persisting the updated session and — on a terminal
    /// transition — both players' stat increments in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotFound`] if the session is absent, and the
    /// state machine's validation errors otherwise; any failure leaves the
    /// persisted session exactly as before the call.
    #[instrument(skip(self))]
    pub async fn make_move(
        &self,
        game_id: Uuid,
        player_id: i32,
        row: i32,
        col: i32,
    ) -> Result<Session, GameError> {
        let guard = self.gate.acquire(game_id).await;

        let mut session = self
            .repository
            .find_session(game_id)?
            .ok_or_else(|| GameError::not_found("game not found"))?;

        let outcome = session.apply_move(player_id, row, col)?;

        // A terminal outcome yields a stats update; commit it with the
        // session as one unit, then drop the finished session's gate entry.
        // Otherwise a plain save suffices.
        match StatsUpdate::from_finished(&session) {
            Some(update) => {
                self.repository.finish_session(&session, &update)?;
                drop(guard);
                self.gate.release(game_id);
            }
            None => self.repository.save_session(&session)?,
        }

        info!(
            session_id = %session.id,
            player_id,
            row,
            col,
            ?outcome,
            "Move persisted"
        );
        Ok(session)
    }

    /// Read-only session fetch; may be stale with respect to an in-flight
    /// mutation but never observes a half-applied one.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotFound`] if the session is absent.
    #[instrument(skip(self))]
    pub fn get_game(&self, game_id: Uuid) -> Result<Session, GameError> {
        self.repository
            .find_session(game_id)?
            .ok_or_else(|| GameError::not_found("game not found"))
    }

    /// Returns the derived stats view for a user.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotFound`] if the user is absent.
    #[instrument(skip(self))]
    pub fn user_stats(&self, user_id: i32) -> Result<UserStats, GameError> {
        let user = self
            .repository
            .find_user(user_id)?
            .ok_or_else(|| GameError::not_found("user not found"))?;
        Ok(UserStats::from_user(&user))
    }

    /// Returns the top three users under the given ranking.
    #[instrument(skip(self))]
    pub fn leaderboard(&self, rank_by: RankBy) -> Result<Vec<UserStats>, GameError> {
        match rank_by {
            RankBy::Wins => {
                let users = self.repository.list_top_by_wins(PODIUM)?;
                Ok(users.iter().map(UserStats::from_user).collect())
            }
            RankBy::Efficiency => {
                let mut stats: Vec<UserStats> = self
                    .repository
                    .list_winners()?
                    .iter()
                    .map(UserStats::from_user)
                    .collect();
                // Winners always carry an efficiency; absent sorts last.
                stats.sort_by(|a, b| {
                    a.efficiency
                        .unwrap_or(f64::MAX)
                        .total_cmp(&b.efficiency.unwrap_or(f64::MAX))
                });
                stats.truncate(PODIUM as usize);
                Ok(stats)
            }
        }
    }
}

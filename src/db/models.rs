//! Database models and row/domain conversions.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use uuid::Uuid;

use crate::board::Board;
use crate::db::{DbError, schema};
use crate::session::{Session, SessionStatus};

/// User database model: identity plus cumulative counters.
///
/// The counters are monotonically non-decreasing and only ever mutated by
/// the stats increments of a terminal move transition.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::users)]
pub struct User {
    id: i32,
    username: String,
    total_wins: i32,
    total_games_played: i32,
    total_moves_made_in_wins: i32,
    created_at: NaiveDateTime,
}

/// Insertable user model; counters start at their column defaults of zero.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::users)]
pub struct NewUser {
    username: String,
}

/// Game session row as stored.
///
/// The board is persisted as nine typed nullable cells rather than a text
/// blob, so a load can never fail on malformed board data.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::game_sessions)]
pub struct SessionRow {
    id: String,
    player1_id: i32,
    player2_id: Option<i32>,
    status: String,
    winner_id: Option<i32>,
    current_turn_player_id: Option<i32>,
    move_count: i32,
    cell0: Option<i32>,
    cell1: Option<i32>,
    cell2: Option<i32>,
    cell3: Option<i32>,
    cell4: Option<i32>,
    cell5: Option<i32>,
    cell6: Option<i32>,
    cell7: Option<i32>,
    cell8: Option<i32>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl SessionRow {
    /// Converts the stored row into the domain session.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the stored id or status is malformed.
    pub fn to_session(&self) -> Result<Session, DbError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| DbError::new(format!("Invalid session id '{}': {}", self.id, e)))?;
        Ok(Session {
            id,
            player1_id: self.player1_id,
            player2_id: self.player2_id,
            status: SessionStatus::from_db_string(&self.status)?,
            winner_id: self.winner_id,
            board: Board::from_cells([
                self.cell0, self.cell1, self.cell2, self.cell3, self.cell4, self.cell5,
                self.cell6, self.cell7, self.cell8,
            ]),
            current_turn_player_id: self.current_turn_player_id,
            move_count: self.move_count,
        })
    }
}

/// Writable session columns, used for both inserts and updates.
///
/// `treat_none_as_null` makes updates write NULL for cleared fields (the
/// turn pointer on a finish) instead of skipping them.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = schema::game_sessions)]
#[diesel(treat_none_as_null = true)]
pub struct SessionChangeset {
    id: String,
    player1_id: i32,
    player2_id: Option<i32>,
    status: String,
    winner_id: Option<i32>,
    current_turn_player_id: Option<i32>,
    move_count: i32,
    cell0: Option<i32>,
    cell1: Option<i32>,
    cell2: Option<i32>,
    cell3: Option<i32>,
    cell4: Option<i32>,
    cell5: Option<i32>,
    cell6: Option<i32>,
    cell7: Option<i32>,
    cell8: Option<i32>,
    updated_at: NaiveDateTime,
}

impl SessionChangeset {
    /// Builds the writable columns from a domain session.
    pub fn from_session(session: &Session) -> Self {
        let cells = session.board.cells();
        Self {
            id: session.id.to_string(),
            player1_id: session.player1_id,
            player2_id: session.player2_id,
            status: session.status.to_db_string().to_string(),
            winner_id: session.winner_id,
            current_turn_player_id: session.current_turn_player_id,
            move_count: session.move_count,
            cell0: cells[0],
            cell1: cells[1],
            cell2: cells[2],
            cell3: cells[3],
            cell4: cells[4],
            cell5: cells[5],
            cell6: cells[6],
            cell7: cells[7],
            cell8: cells[8],
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

impl SessionStatus {
    /// Converts the status to the string stored in the database.
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::WaitingForPlayer => "waiting_for_player",
            Self::InProgress => "in_progress",
            Self::Finished => "finished",
        }
    }

    /// Parses the status from the string stored in the database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the string is not a valid status value.
    pub fn from_db_string(s: &str) -> Result<Self, DbError> {
        match s {
            "waiting_for_player" => Ok(Self::WaitingForPlayer),
            "in_progress" => Ok(Self::InProgress),
            "finished" => Ok(Self::Finished),
            _ => Err(DbError::new(format!("Invalid session status: '{}'", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_db_strings() {
        for status in [
            SessionStatus::WaitingForPlayer,
            SessionStatus::InProgress,
            SessionStatus::Finished,
        ] {
            let parsed = SessionStatus::from_db_string(status.to_db_string()).unwrap();
            assert_eq!(status, parsed);
        }
    }

    #[test]
    fn invalid_status_string_is_rejected() {
        assert!(SessionStatus::from_db_string("paused").is_err());
    }
}

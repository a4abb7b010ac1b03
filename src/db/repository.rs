//! Database repository for users and game sessions.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::db::{DbError, NewUser, SessionChangeset, SessionRow, User, schema};
use crate::session::Session;
use crate::stats::StatsUpdate;

/// Embedded schema migrations, applied at startup and in tests.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database repository for user and session operations.
///
/// Holds the database path and establishes a connection per call. The
/// per-session serialization of mutating operations is the service layer's
/// concern (the [`crate::gate::SessionGate`]); the repository's contract is
/// that [`GameRepository::finish_session`] commits the session update and
/// both players' stat increments atomically.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

impl GameRepository {
    /// Creates a new repository connected to the database at the given path.
    ///
    /// Use `":memory:"` for an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is invalid.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        info!(path = %db_path, "Creating GameRepository");
        Ok(Self { db_path })
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))?;
        // Writers on other connections (a finish in another session) should
        // wait rather than fail with SQLITE_BUSY.
        diesel::sql_query("PRAGMA busy_timeout = 5000;").execute(&mut conn)?;
        Ok(conn)
    }

    /// Applies any pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migration failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Creates a new user with zeroed stats.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn create_user(&self, username: String) -> Result<User, DbError> {
        debug!(username = %username, "Creating user");
        let mut conn = self.connection()?;

        let new_user = NewUser::new(username);

        let user = diesel::insert_into(schema::users::table)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result(&mut conn)?;

        info!(user_id = user.id(), username = %user.username(), "User created");
        Ok(user)
    }

    /// Gets a user by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_user(&self, user_id: i32) -> Result<Option<User>, DbError> {
        debug!(user_id, "Looking up user");
        let mut conn = self.connection()?;

        let user = schema::users::table
            .find(user_id)
            .first::<User>(&mut conn)
            .optional()?;

        if user.is_none() {
            debug!(user_id, "User not found");
        }

        Ok(user)
    }

    /// Lists the top users by cumulative wins, descending.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_top_by_wins(&self, limit: i64) -> Result<Vec<User>, DbError> {
        debug!(limit, "Loading top users by wins");
        let mut conn = self.connection()?;

        let users = schema::users::table
            .order(schema::users::total_wins.desc())
            .limit(limit)
            .load::<User>(&mut conn)?;

        info!(count = users.len(), "Top users loaded");
        Ok(users)
    }

    /// Lists every user with at least one win, for efficiency ranking.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_winners(&self) -> Result<Vec<User>, DbError> {
        debug!("Loading users with wins");
        let mut conn = self.connection()?;

        let users = schema::users::table
            .filter(schema::users::total_wins.gt(0))
            .load::<User>(&mut conn)?;

        info!(count = users.len(), "Winners loaded");
        Ok(users)
    }

    /// Inserts a newly created session.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, session), fields(session_id = %session.id))]
    pub fn insert_session(&self, session: &Session) -> Result<(), DbError> {
        debug!("Inserting session");
        let mut conn = self.connection()?;

        diesel::insert_into(schema::game_sessions::table)
            .values(SessionChangeset::from_session(session))
            .execute(&mut conn)?;

        info!(session_id = %session.id, "Session inserted");
        Ok(())
    }

    /// Gets a session by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs or the stored row is
    /// malformed.
    #[instrument(skip(self))]
    pub fn find_session(&self, session_id: Uuid) -> Result<Option<Session>, DbError> {
        debug!(session_id = %session_id, "Looking up session");
        let mut conn = self.connection()?;

        let row = schema::game_sessions::table
            .find(session_id.to_string())
            .first::<SessionRow>(&mut conn)
            .optional()?;

        match row {
            Some(row) => Ok(Some(row.to_session()?)),
            None => {
                debug!(session_id = %session_id, "Session not found");
                Ok(None)
            }
        }
    }

    /// Persists a non-terminal session update (join or continuing move).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, session), fields(session_id = %session.id))]
    pub fn save_session(&self, session: &Session) -> Result<(), DbError> {
        debug!("Saving session");
        let mut conn = self.connection()?;

        diesel::update(schema::game_sessions::table.find(session.id.to_string()))
            .set(SessionChangeset::from_session(session))
            .execute(&mut conn)?;

        info!(session_id = %session.id, status = session.status.to_db_string(), "Session saved");
        Ok(())
    }

    /// Commits a terminal transition: the finished session plus both
    /// players' stat increments, all-or-nothing.
    ///
    /// Increments are expressed as `SET col = col + delta`, so a concurrent
    /// finish of a *different* session involving the same player cannot lose
    /// an update.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs; a failure rolls the
    /// whole transaction back, leaving the session and both users unchanged.
    #[instrument(skip(self, session, update), fields(session_id = %session.id))]
    pub fn finish_session(&self, session: &Session, update: &StatsUpdate) -> Result<(), DbError> {
        debug!("Committing terminal transition");
        let mut conn = self.connection()?;

        conn.transaction::<_, DbError, _>(|conn| {
            diesel::update(schema::game_sessions::table.find(session.id.to_string()))
                .set(SessionChangeset::from_session(session))
                .execute(conn)?;

            for player_id in [update.player1_id, update.player2_id] {
                diesel::update(schema::users::table.find(player_id))
                    .set(
                        schema::users::total_games_played
                            .eq(schema::users::total_games_played + 1),
                    )
                    .execute(conn)?;
            }

            if let Some(credit) = update.winner {
                diesel::update(schema::users::table.find(credit.player_id))
                    .set((
                        schema::users::total_wins.eq(schema::users::total_wins + 1),
                        schema::users::total_moves_made_in_wins
                            .eq(schema::users::total_moves_made_in_wins + credit.winning_moves),
                    ))
                    .execute(conn)?;
            }

            Ok(())
        })?;

        info!(
            session_id = %session.id,
            winner = ?update.winner.map(|c| c.player_id),
            "Terminal transition committed"
        );
        Ok(())
    }
}

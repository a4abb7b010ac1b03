//! Gridmatch - turn-based tic-tac-toe match service
//!
//! Two remote clients play tic-tac-toe sessions against each other through
//! independent, possibly concurrent HTTP requests, while a SQLite layer
//! tracks per-player win and efficiency statistics.
//!
//! # Architecture
//!
//! - **Board**: pure value type with the win/draw evaluator
//! - **Session**: the match state machine (waiting → in progress → finished)
//! - **Gate**: per-session mutual exclusion for `join` and `move`
//! - **Stats**: counter deltas applied on the terminal transition
//! - **Service**: orchestration of gate, state machine, and repository
//! - **Http**: thin axum mapping of the service operations
//!
//! # Example
//!
//! ```no_run
//! use gridmatch::{GameRepository, GameService};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let repository = GameRepository::new("gridmatch.db".to_string())?;
//! repository.run_migrations()?;
//! let service = GameService::new(repository);
//!
//! let alice = service.create_user("alice".to_string())?;
//! let bob = service.create_user("bob".to_string())?;
//! let game = service.create_game(*alice.id())?;
//! service.join_game(game.id, *bob.id()).await?;
//! service.make_move(game.id, *alice.id(), 0, 0).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod board;
mod db;
mod error;
mod gate;
mod http;
mod service;
mod session;
mod stats;

// Public module declarations
pub mod cli;

// Crate-level exports - Board
pub use board::{Board, MoveOutcome};

// Crate-level exports - Persistence
pub use db::{DbError, GameRepository, MIGRATIONS, NewUser, User};

// Crate-level exports - Errors
pub use error::GameError;

// Crate-level exports - Concurrency gate
pub use gate::SessionGate;

// Crate-level exports - HTTP transport
pub use http::{
    CreateGameRequest, CreateUserRequest, GameDto, JoinGameRequest, LeaderboardQuery,
    MoveRequest, UserDto, router,
};

// Crate-level exports - Service
pub use service::{GameService, RankBy};

// Crate-level exports - Session state machine
pub use session::{Session, SessionStatus};

// Crate-level exports - Stats
pub use stats::{StatsUpdate, UserStats, WinnerCredit};

//! Database persistence layer for users and game sessions.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::DbError;
pub use models::{NewUser, SessionChangeset, SessionRow, User};
pub use repository::{GameRepository, MIGRATIONS};

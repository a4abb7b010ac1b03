//! HTTP transport: a thin axum mapping of the service operations.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument, warn};
use uuid::Uuid;

use crate::db::User;
use crate::error::GameError;
use crate::service::{GameService, RankBy};
use crate::session::{Session, SessionStatus};
use crate::stats::UserStats;

/// Request body for creating a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    /// Desired username.
    pub username: String,
}

/// Request body for creating a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGameRequest {
    /// Player 1 (the creator).
    pub player1_id: i32,
}

/// Request body for joining a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinGameRequest {
    /// Session to join.
    pub game_id: Uuid,
    /// Joining player.
    pub player2_id: i32,
}

/// Request body for making a move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Session to move in.
    pub game_id: Uuid,
    /// Moving player.
    pub player_id: i32,
    /// Row (0-2).
    pub row: i32,
    /// Column (0-2).
    pub col: i32,
}

/// Leaderboard query string.
#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardQuery {
    /// Ranking key, `wins` (default) or `efficiency`.
    pub by: Option<String>,
}

/// User record as returned on creation.
#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    /// User id.
    pub id: i32,
    /// Username.
    pub username: String,
    /// Cumulative wins.
    pub total_wins: i32,
    /// Cumulative games played.
    pub total_games_played: i32,
    /// Sum of the user's own move counts across won games.
    pub total_moves_made_in_wins: i32,
}

impl UserDto {
    fn from_user(user: &User) -> Self {
        Self {
            id: *user.id(),
            username: user.username().clone(),
            total_wins: *user.total_wins(),
            total_games_played: *user.total_games_played(),
            total_moves_made_in_wins: *user.total_moves_made_in_wins(),
        }
    }
}

/// Session snapshot as exchanged over the wire.
///
/// The board travels as an ordered array of 9 nullable player ids.
#[derive(Debug, Clone, Serialize)]
pub struct GameDto {
    /// Session id.
    pub id: Uuid,
    /// Player 1.
    pub player1_id: i32,
    /// Player 2, null until joined.
    pub player2_id: Option<i32>,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// Winner, null unless decisively finished.
    pub winner_id: Option<i32>,
    /// Board cells in row-major order.
    pub grid: Vec<Option<i32>>,
    /// Whose turn it is, null unless in progress.
    pub current_turn_player_id: Option<i32>,
    /// Number of occupied cells.
    pub move_count: i32,
}

impl GameDto {
    fn from_session(session: &Session) -> Self {
        Self {
            id: session.id,
            player1_id: session.player1_id,
            player2_id: session.player2_id,
            status: session.status,
            winner_id: session.winner_id,
            grid: session.board.cells().to_vec(),
            current_turn_player_id: session.current_turn_player_id,
            move_count: session.move_count,
        }
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = match &self {
            GameError::NotFound(_) => StatusCode::NOT_FOUND,
            GameError::InvalidState(_)
            | GameError::InvalidOperation(_)
            | GameError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            GameError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(error = %self, "Request rejected");
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Builds the API router over the given service.
pub fn router(service: GameService) -> Router {
    Router::new()
        .route("/api/users", post(create_user))
        .route("/api/users/{id}/stats", get(user_stats))
        .route("/api/leaderboard", get(leaderboard))
        .route("/api/game/create", post(create_game))
        .route("/api/game/join", post(join_game))
        .route("/api/game/move", post(make_move))
        .route("/api/game/{id}", get(get_game))
        .with_state(service)
}

#[instrument(skip(service, req), fields(username = %req.username))]
async fn create_user(
    State(service): State<GameService>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserDto>), GameError> {
    let user = service.create_user(req.username)?;
    Ok((StatusCode::CREATED, Json(UserDto::from_user(&user))))
}

#[instrument(skip(service))]
async fn user_stats(
    State(service): State<GameService>,
    Path(id): Path<i32>,
) -> Result<Json<UserStats>, GameError> {
    Ok(Json(service.user_stats(id)?))
}

#[instrument(skip(service))]
async fn leaderboard(
    State(service): State<GameService>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<UserStats>>, GameError> {
    let rank_by = query.by.as_deref().unwrap_or("wins").parse::<RankBy>()?;
    Ok(Json(service.leaderboard(rank_by)?))
}

#[instrument(skip(service, req), fields(player1_id = req.player1_id))]
async fn create_game(
    State(service): State<GameService>,
    Json(req): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameDto>), GameError> {
    let session = service.create_game(req.player1_id)?;
    Ok((StatusCode::CREATED, Json(GameDto::from_session(&session))))
}

#[instrument(skip(service, req), fields(game_id = %req.game_id, player2_id = req.player2_id))]
async fn join_game(
    State(service): State<GameService>,
    Json(req): Json<JoinGameRequest>,
) -> Result<Json<GameDto>, GameError> {
    let session = service.join_game(req.game_id, req.player2_id).await?;
    Ok(Json(GameDto::from_session(&session)))
}

#[instrument(skip(service, req), fields(game_id = %req.game_id, player_id = req.player_id))]
async fn make_move(
    State(service): State<GameService>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<GameDto>, GameError> {
    let session = service
        .make_move(req.game_id, req.player_id, req.row, req.col)
        .await?;
    Ok(Json(GameDto::from_session(&session)))
}

#[instrument(skip(service))]
async fn get_game(
    State(service): State<GameService>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameDto>, GameError> {
    Ok(Json(GameDto::from_session(&service.get_game(id)?)))
}

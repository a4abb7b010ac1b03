//! Tests for database repository operations.

use tempfile::NamedTempFile;

use gridmatch::{GameRepository, Session, SessionStatus, StatsUpdate};

/// Creates a temporary database file with schema applied, returns the file
/// handle (must stay in scope to keep the file alive) and a ready repository.
fn setup_test_db() -> (NamedTempFile, GameRepository) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    let repo = GameRepository::new(db_path).expect("Failed to create repository");
    repo.run_migrations().expect("Migrations failed");
    (db_file, repo)
}

#[test]
fn test_create_user_starts_with_zeroed_stats() {
    let (_db, repo) = setup_test_db();
    let user = repo
        .create_user("alice".to_string())
        .expect("Create failed");
    assert_eq!(user.username(), "alice");
    assert!(*user.id() > 0);
    assert_eq!(*user.total_wins(), 0);
    assert_eq!(*user.total_games_played(), 0);
    assert_eq!(*user.total_moves_made_in_wins(), 0);
}

#[test]
fn test_find_user_found_and_not_found() {
    let (_db, repo) = setup_test_db();
    let user = repo.create_user("bob".to_string()).expect("Create failed");

    let found = repo.find_user(*user.id()).expect("Query failed");
    assert_eq!(found.expect("User missing").username(), "bob");

    let missing = repo.find_user(9999).expect("Query failed");
    assert!(missing.is_none());
}

#[test]
fn test_session_round_trip_preserves_board() {
    let (_db, repo) = setup_test_db();
    let alice = repo.create_user("alice".to_string()).expect("Create failed");
    let bob = repo.create_user("bob".to_string()).expect("Create failed");

    let mut session = Session::new(*alice.id());
    repo.insert_session(&session).expect("Insert failed");

    session.join(*bob.id()).expect("Join failed");
    session
        .apply_move(*alice.id(), 0, 0)
        .expect("Move failed");
    session.apply_move(*bob.id(), 2, 2).expect("Move failed");
    repo.save_session(&session).expect("Save failed");

    let loaded = repo
        .find_session(session.id)
        .expect("Query failed")
        .expect("Session missing");
    assert_eq!(loaded, session);
    assert_eq!(loaded.board.cell(0), Some(*alice.id()));
    assert_eq!(loaded.board.cell(8), Some(*bob.id()));
    assert_eq!(loaded.move_count, 2);
    assert_eq!(loaded.status, SessionStatus::InProgress);
}

#[test]
fn test_find_session_not_found() {
    let (_db, repo) = setup_test_db();
    let missing = repo
        .find_session(uuid::Uuid::new_v4())
        .expect("Query failed");
    assert!(missing.is_none());
}

#[test]
fn test_save_clears_turn_pointer_on_finish() {
    let (_db, repo) = setup_test_db();
    let alice = repo.create_user("alice".to_string()).expect("Create failed");
    let bob = repo.create_user("bob".to_string()).expect("Create failed");

    let mut session = Session::new(*alice.id());
    repo.insert_session(&session).expect("Insert failed");
    session.join(*bob.id()).expect("Join failed");
    repo.save_session(&session).expect("Save failed");

    // Turn pointer is set after join, then cleared by the finish; the
    // update must write the NULL rather than skip the column.
    for (player, row, col) in [
        (*alice.id(), 0, 0),
        (*bob.id(), 1, 0),
        (*alice.id(), 0, 1),
        (*bob.id(), 1, 1),
        (*alice.id(), 0, 2),
    ] {
        session.apply_move(player, row, col).expect("Move failed");
    }
    repo.save_session(&session).expect("Save failed");

    let loaded = repo
        .find_session(session.id)
        .expect("Query failed")
        .expect("Session missing");
    assert_eq!(loaded.status, SessionStatus::Finished);
    assert_eq!(loaded.winner_id, Some(*alice.id()));
    assert_eq!(loaded.current_turn_player_id, None);
}

/// Plays a five-move player-1 win and returns the finished session.
fn finished_win(repo: &GameRepository, p1: i32, p2: i32) -> Session {
    let mut session = Session::new(p1);
    repo.insert_session(&session).expect("Insert failed");
    session.join(p2).expect("Join failed");
    for (player, row, col) in [(p1, 0, 0), (p2, 1, 0), (p1, 0, 1), (p2, 1, 1), (p1, 0, 2)] {
        session.apply_move(player, row, col).expect("Move failed");
    }
    session
}

#[test]
fn test_finish_session_credits_winner_and_both_players() {
    let (_db, repo) = setup_test_db();
    let alice = repo.create_user("alice".to_string()).expect("Create failed");
    let bob = repo.create_user("bob".to_string()).expect("Create failed");

    let session = finished_win(&repo, *alice.id(), *bob.id());
    let update = StatsUpdate::from_finished(&session).expect("No update");
    repo.finish_session(&session, &update).expect("Finish failed");

    let alice = repo
        .find_user(*alice.id())
        .expect("Query failed")
        .expect("User missing");
    let bob = repo
        .find_user(*bob.id())
        .expect("Query failed")
        .expect("User missing");

    // Five total moves: the winner (player 1) made three of them.
    assert_eq!(*alice.total_games_played(), 1);
    assert_eq!(*alice.total_wins(), 1);
    assert_eq!(*alice.total_moves_made_in_wins(), 3);
    assert_eq!(*bob.total_games_played(), 1);
    assert_eq!(*bob.total_wins(), 0);
    assert_eq!(*bob.total_moves_made_in_wins(), 0);
}

#[test]
fn test_finish_session_draw_increments_games_only() {
    let (_db, repo) = setup_test_db();
    let alice = repo.create_user("alice".to_string()).expect("Create failed");
    let bob = repo.create_user("bob".to_string()).expect("Create failed");
    let (a, b) = (*alice.id(), *bob.id());

    let mut session = Session::new(a);
    repo.insert_session(&session).expect("Insert failed");
    session.join(b).expect("Join failed");
    for (player, row, col) in [
        (a, 0, 0),
        (b, 0, 1),
        (a, 0, 2),
        (b, 1, 1),
        (a, 1, 0),
        (b, 1, 2),
        (a, 2, 1),
        (b, 2, 0),
        (a, 2, 2),
    ] {
        session.apply_move(player, row, col).expect("Move failed");
    }
    assert_eq!(session.winner_id, None);

    let update = StatsUpdate::from_finished(&session).expect("No update");
    repo.finish_session(&session, &update).expect("Finish failed");

    for id in [a, b] {
        let user = repo
            .find_user(id)
            .expect("Query failed")
            .expect("User missing");
        assert_eq!(*user.total_games_played(), 1);
        assert_eq!(*user.total_wins(), 0);
    }
}

#[test]
fn test_stat_increments_accumulate_across_games() {
    let (_db, repo) = setup_test_db();
    let alice = repo.create_user("alice".to_string()).expect("Create failed");
    let bob = repo.create_user("bob".to_string()).expect("Create failed");

    for _ in 0..2 {
        let session = finished_win(&repo, *alice.id(), *bob.id());
        let update = StatsUpdate::from_finished(&session).expect("No update");
        repo.finish_session(&session, &update).expect("Finish failed");
    }

    let alice = repo
        .find_user(*alice.id())
        .expect("Query failed")
        .expect("User missing");
    assert_eq!(*alice.total_games_played(), 2);
    assert_eq!(*alice.total_wins(), 2);
    assert_eq!(*alice.total_moves_made_in_wins(), 6);
}

#[test]
fn test_list_top_by_wins_orders_and_limits() {
    let (_db, repo) = setup_test_db();
    let alice = repo.create_user("alice".to_string()).expect("Create failed");
    let bob = repo.create_user("bob".to_string()).expect("Create failed");
    let carol = repo.create_user("carol".to_string()).expect("Create failed");
    let dave = repo.create_user("dave".to_string()).expect("Create failed");

    // alice beats bob twice, carol beats dave once.
    for _ in 0..2 {
        let session = finished_win(&repo, *alice.id(), *bob.id());
        let update = StatsUpdate::from_finished(&session).expect("No update");
        repo.finish_session(&session, &update).expect("Finish failed");
    }
    let session = finished_win(&repo, *carol.id(), *dave.id());
    let update = StatsUpdate::from_finished(&session).expect("No update");
    repo.finish_session(&session, &update).expect("Finish failed");

    let top = repo.list_top_by_wins(3).expect("Query failed");
    assert_eq!(top.len(), 3);
    assert_eq!(top[0].username(), "alice");
    assert_eq!(top[1].username(), "carol");

    let top_one = repo.list_top_by_wins(1).expect("Query failed");
    assert_eq!(top_one.len(), 1);
}

#[test]
fn test_list_winners_excludes_winless_users() {
    let (_db, repo) = setup_test_db();
    let alice = repo.create_user("alice".to_string()).expect("Create failed");
    let bob = repo.create_user("bob".to_string()).expect("Create failed");
    repo.create_user("idle".to_string()).expect("Create failed");

    let session = finished_win(&repo, *alice.id(), *bob.id());
    let update = StatsUpdate::from_finished(&session).expect("No update");
    repo.finish_session(&session, &update).expect("Finish failed");

    let winners = repo.list_winners().expect("Query failed");
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].username(), "alice");
}

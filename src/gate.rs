//! Per-session mutual exclusion for mutating operations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Keyed lock table granting at-most-one in-flight mutation per session id.
///
/// `join` and `move` must read, validate, and write a session as one unit;
/// the gate serializes those read-modify-write sequences per session while
/// mutations against different sessions proceed fully in parallel. Waiter
/// ordering for the same id is unspecified, but every waiter eventually runs.
///
/// Reads (`get`) and session creation never pass through the gate.
#[derive(Debug, Clone, Default)]
pub struct SessionGate {
    locks: Arc<Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>>,
}

impl SessionGate {
    /// Creates an empty gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for the given session id, blocking until any
    /// previous holder releases.
    ///
    /// The returned guard releases on drop, so every exit path of the
    /// caller — validation failures included — releases the gate.
    #[instrument(skip(self))]
    pub async fn acquire(&self, session_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap();
            locks
                .entry(session_id)
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        debug!(session_id = %session_id, "Waiting on session gate");
        let guard = lock.lock_owned().await;
        debug!(session_id = %session_id, "Session gate acquired");
        guard
    }

    /// Prunes the lock entry for a session, unless another task still holds
    /// or awaits it.
    ///
    /// Called after a terminal transition so finished sessions do not pin
    /// table entries forever; a straggler arriving later simply re-creates
    /// the entry and fails validation as usual.
    #[instrument(skip(self))]
    pub fn release(&self, session_id: Uuid) {
        let mut locks = self.locks.lock().unwrap();
        if locks
            .get(&session_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&session_id);
            debug!(session_id = %session_id, "Session gate entry pruned");
        }
    }

    /// Number of session ids currently tracked by the lock table.
    pub fn tracked_sessions(&self) -> usize {
        self.locks.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_session_is_mutually_exclusive() {
        let gate = SessionGate::new();
        let id = Uuid::new_v4();

        let guard = gate.acquire(id).await;
        let second = tokio::time::timeout(Duration::from_millis(50), gate.acquire(id)).await;
        assert!(second.is_err(), "second acquire should block while held");

        drop(guard);
        let second = tokio::time::timeout(Duration::from_millis(50), gate.acquire(id)).await;
        assert!(second.is_ok(), "gate should admit after release");
    }

    #[tokio::test]
    async fn different_sessions_do_not_block_each_other() {
        let gate = SessionGate::new();
        let _first = gate.acquire(Uuid::new_v4()).await;
        let second =
            tokio::time::timeout(Duration::from_millis(50), gate.acquire(Uuid::new_v4())).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn release_prunes_idle_entry_but_not_held_one() {
        let gate = SessionGate::new();
        let id = Uuid::new_v4();

        let guard = gate.acquire(id).await;
        gate.release(id);
        assert_eq!(gate.tracked_sessions(), 1, "held entry must survive");

        drop(guard);
        gate.release(id);
        assert_eq!(gate.tracked_sessions(), 0);

        // A late arrival after pruning still serializes normally.
        let _guard = gate.acquire(id).await;
        assert_eq!(gate.tracked_sessions(), 1);
    }

    #[tokio::test]
    async fn every_waiter_eventually_runs() {
        let gate = SessionGate::new();
        let id = Uuid::new_v4();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let gate = gate.clone();
            handles.push(tokio::spawn(async move {
                let _guard = gate.acquire(id).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }
}

//! Per-conversation state: the last answer and the suggested-actions checklist.

use crate::error::{GenanimlError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Follow-up actions suggested after every answer.
pub const SUGGESTED_ACTIONS: [&str; 7] = [
    "Verify the location of the conflict",
    "Identify the wildlife species involved",
    "Check local wildlife protection laws",
    "Consult with forest officials",
    "Report the incident through proper channels",
    "Explore mitigation strategies",
    "Educate the local community about wildlife safety",
];

/// Tick state of the suggested actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskChecklist {
    done: [bool; SUGGESTED_ACTIONS.len()],
}

/// Result of trying to finish the checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Completion {
    Done,
    Incomplete { remaining: Vec<String> },
}

impl TaskChecklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick or untick the task at `index` (0-based).
    pub fn set(&mut self, index: usize, done: bool) -> Result<()> {
        let slot = self.done.get_mut(index).ok_or_else(|| {
            GenanimlError::InvalidInput(format!(
                "Task {} does not exist (there are {})",
                index + 1,
                SUGGESTED_ACTIONS.len()
            ))
        })?;
        *slot = done;
        Ok(())
    }

    pub fn is_done(&self, index: usize) -> bool {
        self.done.get(index).copied().unwrap_or(false)
    }

    pub fn all_done(&self) -> bool {
        self.done.iter().all(|d| *d)
    }

    pub fn reset(&mut self) {
        self.done = Default::default();
    }

    /// Tasks with their tick state, in display order.
    pub fn items(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        SUGGESTED_ACTIONS.iter().copied().zip(self.done.iter().copied())
    }

    /// Check whether every task is ticked.
    pub fn finish(&self) -> Completion {
        if self.all_done() {
            Completion::Done
        } else {
            Completion::Incomplete {
                remaining: self
                    .items()
                    .filter(|(_, done)| !done)
                    .map(|(task, _)| task.to_string())
                    .collect(),
            }
        }
    }
}

/// One user's conversation.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub last_response: Option<String>,
    /// Checklist is shown once an answer has been given.
    pub show_tasks: bool,
    pub checklist: TaskChecklist,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            last_response: None,
            show_tasks: false,
            checklist: TaskChecklist::new(),
            created_at: now,
            last_active: now,
        }
    }

    /// Store an answer and reveal the checklist.
    pub fn record(&mut self, answer: impl Into<String>) {
        self.last_response = Some(answer.into());
        self.show_tasks = true;
    }

    /// Start over: clear the answer, hide and reset the checklist.
    pub fn new_chat(&mut self) {
        self.last_response = None;
        self.show_tasks = false;
        self.checklist.reset();
    }

    pub fn finish(&self) -> Completion {
        self.checklist.finish()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory sessions keyed by ID, shared by the HTTP handlers.
///
/// With a maximum age set, sessions not touched within it are evicted
/// whenever a new session is created.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    max_age: Option<Duration>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_age(max_age: std::time::Duration) -> Self {
        Self {
            sessions: RwLock::default(),
            max_age: Duration::from_std(max_age).ok(),
        }
    }

    /// Create and register a new session.
    pub async fn create(&self) -> Session {
        let session = Session::new();
        let mut sessions = self.sessions.write().await;
        if let Some(max_age) = self.max_age {
            let cutoff = Utc::now() - max_age;
            let before = sessions.len();
            sessions.retain(|_, s| s.last_active >= cutoff);
            if sessions.len() < before {
                debug!("Evicted {} idle sessions", before - sessions.len());
            }
        }
        sessions.insert(session.id, session.clone());
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<Session> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Apply `f` to a session and return the updated copy.
    pub async fn update<F>(&self, id: Uuid, f: F) -> Result<Session>
    where
        F: FnOnce(&mut Session) -> Result<()>,
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| GenanimlError::InvalidInput(format!("Unknown session {}", id)))?;
        f(session)?;
        session.last_active = Utc::now();
        Ok(session.clone())
    }

    pub async fn remove(&self, id: Uuid) -> Option<Session> {
        self.sessions.write().await.remove(&id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checklist_completion() {
        let mut checklist = TaskChecklist::new();
        assert!(!checklist.all_done());

        for i in 0..SUGGESTED_ACTIONS.len() - 1 {
            checklist.set(i, true).unwrap();
        }
        match checklist.finish() {
            Completion::Incomplete { remaining } => {
                assert_eq!(remaining, vec!["Educate the local community about wildlife safety"]);
            }
            Completion::Done => panic!("checklist should be incomplete"),
        }

        checklist.set(6, true).unwrap();
        assert_eq!(checklist.finish(), Completion::Done);

        checklist.set(0, false).unwrap();
        assert!(!checklist.is_done(0));
        assert!(!checklist.all_done());
    }

    #[test]
    fn test_checklist_rejects_out_of_range() {
        let mut checklist = TaskChecklist::new();
        assert!(matches!(checklist.set(7, true), Err(GenanimlError::InvalidInput(_))));
        assert!(!checklist.is_done(7));
    }

    #[test]
    fn test_record_and_new_chat() {
        let mut session = Session::new();
        assert!(!session.show_tasks);

        session.record("File a claim within 7 days.");
        session.checklist.set(2, true).unwrap();
        assert!(session.show_tasks);
        assert_eq!(session.last_response.as_deref(), Some("File a claim within 7 days."));

        session.new_chat();
        assert!(session.last_response.is_none());
        assert!(!session.show_tasks);
        assert!(session.checklist.items().all(|(_, done)| !done));
    }

    #[tokio::test]
    async fn test_store_update() {
        let store = SessionStore::new();
        let session = store.create().await;
        assert_eq!(store.len().await, 1);

        let updated = store
            .update(session.id, |s| s.checklist.set(1, true))
            .await
            .unwrap();
        assert!(updated.checklist.is_done(1));
        assert!(store.get(session.id).await.unwrap().checklist.is_done(1));

        let err = store.update(Uuid::new_v4(), |_| Ok(())).await.unwrap_err();
        assert!(matches!(err, GenanimlError::InvalidInput(_)));

        assert!(store.remove(session.id).await.is_some());
        assert!(store.get(session.id).await.is_none());
    }

    #[tokio::test]
    async fn test_store_evicts_idle_sessions() {
        let store = SessionStore::with_max_age(std::time::Duration::from_secs(60));
        let stale = store.create().await;
        let fresh = store.create().await;

        {
            let mut sessions = store.sessions.write().await;
            if let Some(s) = sessions.get_mut(&stale.id) {
                s.last_active = Utc::now() - Duration::minutes(5);
            }
        }

        let newest = store.create().await;
        assert!(store.get(stale.id).await.is_none());
        assert!(store.get(fresh.id).await.is_some());
        assert!(store.get(newest.id).await.is_some());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_store_without_max_age_keeps_sessions() {
        let store = SessionStore::new();
        let old = store.create().await;
        store.sessions.write().await.get_mut(&old.id).unwrap().last_active =
            Utc::now() - Duration::days(30);

        store.create().await;
        assert!(store.get(old.id).await.is_some());
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::users::repo_types::User;

/// Server-side state attached to a logged-in client.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub created_at: OffsetDateTime,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self {
            user,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Keeps sessions by token. Swap the in-memory map for a shared store when
/// running more than one instance.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: Session) -> Uuid;
    async fn get(&self, token: Uuid) -> Option<Session>;
    async fn remove(&self, token: Uuid) -> bool;
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: Session) -> Uuid {
        let token = Uuid::new_v4();
        self.sessions.write().await.insert(token, session);
        token
    }

    async fn get(&self, token: Uuid) -> Option<Session> {
        self.sessions.read().await.get(&token).cloned()
    }

    async fn remove(&self, token: Uuid) -> bool {
        self.sessions.write().await.remove(&token).is_some()
    }
}

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::{Connection, ConnectionProvider, ObjectId, ReviewFilter};
use crate::{
    errors::RepoError,
    reviews::repo_types::{NewReview, Review, ReviewChanges},
    users::repo_types::User,
};

#[derive(Debug, Default)]
struct Documents {
    users: Vec<User>,
    reviews: Vec<Review>,
}

/// In-process store double. Collections keep insertion order.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    docs: Arc<RwLock<Documents>>,
    open: Arc<AtomicUsize>,
    unreachable: Arc<AtomicBool>,
    connect_budget: Arc<Mutex<Option<usize>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, username: &str, password: &str, extra: Value) -> User {
        let extra = match extra {
            Value::Object(m) => m,
            _ => Map::new(),
        };
        let user = User::new(ObjectId::new(), username.into(), password.into(), extra);
        self.docs.write().await.users.push(user.clone());
        user
    }

    pub async fn review(&self, id: ObjectId) -> Option<Review> {
        self.docs
            .read()
            .await
            .reviews
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Subsequent `connect` calls fail.
    pub fn set_unreachable(&self, on: bool) {
        self.unreachable.store(on, Ordering::SeqCst);
    }

    /// Only the next `n` `connect` calls succeed; later ones fail as unreachable.
    pub fn allow_connects(&self, n: usize) {
        *self.connect_budget.lock().unwrap() = Some(n);
    }

    /// Subsequent reads and writes on opened connections fail.
    pub fn set_failing(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }

    pub fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionProvider for MemoryConnector {
    async fn connect(&self) -> Result<Box<dyn Connection>, RepoError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(RepoError::connection("memory store marked unreachable"));
        }
        if let Some(left) = self.connect_budget.lock().unwrap().as_mut() {
            if *left == 0 {
                return Err(RepoError::connection("memory store connect budget spent"));
            }
            *left -= 1;
        }
        self.open.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryDocuments {
            docs: Arc::clone(&self.docs),
            open: Arc::clone(&self.open),
            failing: Arc::clone(&self.failing),
        }))
    }
}

struct MemoryDocuments {
    docs: Arc<RwLock<Documents>>,
    open: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl MemoryDocuments {
    fn check(&self) -> Result<(), RepoError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::store("memory store marked failing"));
        }
        Ok(())
    }
}

impl Drop for MemoryDocuments {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connection for MemoryDocuments {
    async fn find_user_by_credentials(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, RepoError> {
        self.check()?;
        let docs = self.docs.read().await;
        Ok(docs
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .cloned())
    }

    async fn find_users_by_username(&mut self, username: &str) -> Result<Vec<User>, RepoError> {
        self.check()?;
        let docs = self.docs.read().await;
        Ok(docs
            .users
            .iter()
            .filter(|u| u.username == username)
            .cloned()
            .collect())
    }

    async fn find_user_by_id(&mut self, id: ObjectId) -> Result<Option<User>, RepoError> {
        self.check()?;
        let docs = self.docs.read().await;
        Ok(docs.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_reviews(&mut self, filter: ReviewFilter) -> Result<Vec<Review>, RepoError> {
        self.check()?;
        let docs = self.docs.read().await;
        Ok(docs
            .reviews
            .iter()
            .filter(|r| match filter {
                ReviewFilter::All => true,
                ReviewFilter::ByUser(user_id) => r.user_id == user_id,
            })
            .cloned()
            .collect())
    }

    async fn insert_review(&mut self, review: NewReview) -> Result<ObjectId, RepoError> {
        self.check()?;
        let id = ObjectId::new();
        self.docs.write().await.reviews.push(review.into_review(id));
        Ok(id)
    }

    async fn update_review(
        &mut self,
        id: ObjectId,
        changes: ReviewChanges,
    ) -> Result<u64, RepoError> {
        self.check()?;
        let mut docs = self.docs.write().await;
        let Some(r) = docs.reviews.iter_mut().find(|r| r.id == id) else {
            return Ok(0);
        };
        if r.review == changes.review && r.rating == changes.rating && r.favorite == changes.favorite {
            return Ok(0);
        }
        r.review = changes.review;
        r.rating = changes.rating;
        r.favorite = changes.favorite;
        Ok(1)
    }

    async fn delete_review(&mut self, id: ObjectId) -> Result<u64, RepoError> {
        self.check()?;
        let mut docs = self.docs.write().await;
        let before = docs.reviews.len();
        docs.reviews.retain(|r| r.id != id);
        Ok((before - docs.reviews.len()) as u64)
    }

    async fn close(self: Box<Self>) {}
}

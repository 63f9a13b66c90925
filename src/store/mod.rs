//! Connection provider for the document store.
//!
//! Every data operation acquires its own [`Connection`], runs one logical
//! operation on it and releases it before returning. Nothing is pooled.

#[cfg(test)]
pub mod memory;
mod object_id;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    errors::RepoError,
    reviews::repo_types::{NewReview, Review, ReviewChanges},
    users::repo_types::User,
};

pub use object_id::{InvalidObjectId, ObjectId};

/// Which reviews to read, in store order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewFilter {
    All,
    ByUser(ObjectId),
}

/// Opens store connections on demand.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn Connection>, RepoError>;
}

/// One open connection over the `users` and `reviews` collections.
#[async_trait]
pub trait Connection: Send {
    /// First user whose username and password both match exactly.
    async fn find_user_by_credentials(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, RepoError>;

    /// Every user with this username, in store order.
    async fn find_users_by_username(&mut self, username: &str) -> Result<Vec<User>, RepoError>;

    async fn find_user_by_id(&mut self, id: ObjectId) -> Result<Option<User>, RepoError>;

    async fn find_reviews(&mut self, filter: ReviewFilter) -> Result<Vec<Review>, RepoError>;

    async fn insert_review(&mut self, review: NewReview) -> Result<ObjectId, RepoError>;

    /// Number of documents modified (0 or 1). Writing identical values counts as 0.
    async fn update_review(&mut self, id: ObjectId, changes: ReviewChanges)
        -> Result<u64, RepoError>;

    async fn delete_review(&mut self, id: ObjectId) -> Result<u64, RepoError>;

    async fn close(self: Box<Self>);
}

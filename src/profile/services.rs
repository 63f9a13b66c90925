use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    errors::RepoError,
    reviews::repo_types::Review,
    store::{ConnectionProvider, ObjectId, ReviewFilter},
    users::repo_types::User,
};

/// A user joined with every review they own. Built per request, never stored.
///
/// Serializes as the user's fields at the top level plus a `reviews` array.
/// A missing user yields an object holding only `reviews`.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user: Option<User>,
    pub reviews: Vec<Review>,
}

impl Profile {
    /// Shallow merge: user fields first, then `reviews`, which wins on collision.
    pub fn to_document(&self) -> Result<Map<String, Value>, serde_json::Error> {
        let mut doc = match &self.user {
            Some(user) => match serde_json::to_value(user)? {
                Value::Object(fields) => fields,
                _ => Map::new(),
            },
            None => Map::new(),
        };
        doc.insert("reviews".into(), serde_json::to_value(&self.reviews)?);
        Ok(doc)
    }
}

impl Serialize for Profile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

/// Read a user and their reviews over one connection, one read after the other.
pub async fn get_profile(
    store: &dyn ConnectionProvider,
    user_id: &str,
) -> Result<Profile, RepoError> {
    let user_id: ObjectId = user_id.parse()?;

    let mut conn = store.connect().await?;
    let user = conn.find_user_by_id(user_id).await;
    let reviews = match user {
        Ok(_) => conn.find_reviews(ReviewFilter::ByUser(user_id)).await,
        Err(_) => Ok(Vec::new()),
    };
    conn.close().await;

    let profile = Profile {
        user: user?,
        reviews: reviews?,
    };
    debug!(%user_id, found = profile.user.is_some(), reviews = profile.reviews.len(), "profile assembled");
    Ok(profile)
}

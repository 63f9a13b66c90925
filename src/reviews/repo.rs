use time::OffsetDateTime;
use tracing::debug;

use crate::{
    errors::RepoError,
    reviews::repo_types::{NewReview, ReviewChanges, ReviewSummary},
    store::{ConnectionProvider, ObjectId, ReviewFilter},
};

/// All reviews in store order, projected to their summary.
pub async fn list(store: &dyn ConnectionProvider) -> Result<Vec<ReviewSummary>, RepoError> {
    let mut conn = store.connect().await?;
    let found = conn.find_reviews(ReviewFilter::All).await;
    conn.close().await;

    Ok(found?.into_iter().map(ReviewSummary::from).collect())
}

/// Insert a review for `user_id` and return its new identifier.
///
/// The owner is only checked for shape; a review may point at a user that
/// does not exist.
pub async fn create(
    store: &dyn ConnectionProvider,
    user_id: &str,
    movie_id: &str,
    review: &str,
    rating: f64,
    favorite: bool,
) -> Result<ObjectId, RepoError> {
    let user_id: ObjectId = user_id.parse()?;
    let new = NewReview {
        user_id,
        movie_id: movie_id.to_string(),
        review: review.to_string(),
        rating,
        favorite,
        date: OffsetDateTime::now_utc(),
    };

    let mut conn = store.connect().await?;
    let inserted = conn.insert_review(new).await;
    conn.close().await;

    let id = inserted?;
    debug!(review_id = %id, %user_id, "review created");
    Ok(id)
}

/// Replace the mutable fields of a review. Returns the number of modified documents.
pub async fn update(
    store: &dyn ConnectionProvider,
    id: &str,
    review: &str,
    rating: f64,
    favorite: bool,
) -> Result<u64, RepoError> {
    let id: ObjectId = id.parse()?;
    let changes = ReviewChanges {
        review: review.to_string(),
        rating,
        favorite,
    };

    let mut conn = store.connect().await?;
    let modified = conn.update_review(id, changes).await;
    conn.close().await;
    modified
}

pub async fn delete(store: &dyn ConnectionProvider, id: &str) -> Result<u64, RepoError> {
    let id: ObjectId = id.parse()?;

    let mut conn = store.connect().await?;
    let deleted = conn.delete_review(id).await;
    conn.close().await;
    deleted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryConnector;

    const OWNER: &str = "65a1f0c2e4b0a1b2c3d4e5f6";

    async fn seeded(store: &MemoryConnector) -> ObjectId {
        create(store, OWNER, "550", "Great fight scenes", 4.5, true)
            .await
            .expect("create review")
    }

    #[tokio::test]
    async fn created_review_shows_up_in_listing() {
        let store = MemoryConnector::new();
        let id = seeded(&store).await;

        let all = list(&store).await.unwrap();
        assert_eq!(
            all,
            vec![ReviewSummary {
                id,
                movie_id: "550".into(),
                review: "Great fight scenes".into(),
                rating: 4.5,
                favorite: true,
            }]
        );
        assert_eq!(store.open_connections(), 0);
    }

    #[tokio::test]
    async fn listing_keeps_insertion_order() {
        let store = MemoryConnector::new();
        let first = seeded(&store).await;
        let second = create(&store, OWNER, "680", "Too long", 2.0, false).await.unwrap();
        let third = create(&store, "65a1f0c2e4b0a1b2c3d4e5f7", "13", "Fine", 3.0, false)
            .await
            .unwrap();

        let ids: Vec<_> = list(&store).await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first, second, third]);
    }

    #[tokio::test]
    async fn create_stamps_date_and_keeps_owner() {
        let store = MemoryConnector::new();
        let before = OffsetDateTime::now_utc();
        let id = seeded(&store).await;

        let stored = store.review(id).await.unwrap();
        assert_eq!(stored.user_id.to_string(), OWNER);
        assert!(stored.date >= before);
        assert!(stored.date <= OffsetDateTime::now_utc());
    }

    #[tokio::test]
    async fn create_with_malformed_owner_writes_nothing() {
        let store = MemoryConnector::new();
        seeded(&store).await;
        let before = list(&store).await.unwrap();

        let err = create(&store, "not-an-id", "550", "x", 1.0, false)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(ref id) if id == "not-an-id"));
        assert_eq!(list(&store).await.unwrap(), before);
    }

    #[tokio::test]
    async fn update_replaces_only_mutable_fields() {
        let store = MemoryConnector::new();
        let id = seeded(&store).await;
        let original = store.review(id).await.unwrap();

        let modified = update(&store, &id.to_string(), "Rewatched, still good", 4.0, false)
            .await
            .unwrap();
        assert_eq!(modified, 1);

        let stored = store.review(id).await.unwrap();
        assert_eq!(stored.review, "Rewatched, still good");
        assert_eq!(stored.rating, 4.0);
        assert!(!stored.favorite);
        assert_eq!(stored.id, original.id);
        assert_eq!(stored.user_id, original.user_id);
        assert_eq!(stored.movie_id, original.movie_id);
        assert_eq!(stored.date, original.date);
    }

    #[tokio::test]
    async fn update_with_identical_values_reports_zero() {
        let store = MemoryConnector::new();
        let id = seeded(&store).await;

        let modified = update(&store, &id.to_string(), "Great fight scenes", 4.5, true)
            .await
            .unwrap();
        assert_eq!(modified, 0);
    }

    #[tokio::test]
    async fn update_and_delete_on_unknown_id_report_zero() {
        let store = MemoryConnector::new();
        seeded(&store).await;
        let missing = ObjectId::new().to_string();

        assert_eq!(update(&store, &missing, "x", 1.0, false).await.unwrap(), 0);
        assert_eq!(delete(&store, &missing).await.unwrap(), 0);
        assert_eq!(list(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_and_delete_reject_malformed_id() {
        let store = MemoryConnector::new();

        assert!(matches!(
            update(&store, "42", "x", 1.0, false).await,
            Err(RepoError::Validation(_))
        ));
        assert!(matches!(delete(&store, "42").await, Err(RepoError::Validation(_))));
    }

    #[tokio::test]
    async fn validation_happens_before_connecting() {
        let store = MemoryConnector::new();
        store.set_unreachable(true);

        let err = delete(&store, "nope").await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn deleting_twice_reports_one_then_zero() {
        let store = MemoryConnector::new();
        let id = seeded(&store).await.to_string();

        assert_eq!(delete(&store, &id).await.unwrap(), 1);
        assert_eq!(delete(&store, &id).await.unwrap(), 0);
        assert!(list(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_write_releases_connection() {
        let store = MemoryConnector::new();
        store.set_failing(true);

        let err = create(&store, OWNER, "550", "x", 1.0, false).await.unwrap_err();
        assert!(matches!(err, RepoError::Store(_)));
        assert_eq!(store.open_connections(), 0);
    }

    #[tokio::test]
    async fn unreachable_store_fails_listing() {
        let store = MemoryConnector::new();
        store.set_unreachable(true);

        assert!(matches!(list(&store).await, Err(RepoError::Connection(_))));
    }
}

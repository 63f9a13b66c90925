use anyhow::Context;
use async_trait::async_trait;
use sqlx::{Connection as _, PgConnection};
use tracing::{debug, warn};

use super::{Connection, ConnectionProvider, ObjectId, ReviewFilter};
use crate::{
    errors::RepoError,
    reviews::repo_types::{NewReview, Review, ReviewChanges, ReviewRow},
    users::repo_types::{User, UserRow},
};

/// Opens a dedicated Postgres connection for every operation.
#[derive(Debug, Clone)]
pub struct PgConnector {
    url: String,
}

impl PgConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Applies `./migrations` over a one-off connection.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        let mut conn = PgConnection::connect(&self.url)
            .await
            .context("connect to database")?;
        let applied = sqlx::migrate!("./migrations").run(&mut conn).await;
        if let Err(e) = conn.close().await {
            warn!(error = %e, "closing migration connection failed");
        }
        applied.context("run migrations")
    }
}

#[async_trait]
impl ConnectionProvider for PgConnector {
    async fn connect(&self) -> Result<Box<dyn Connection>, RepoError> {
        let conn = PgConnection::connect(&self.url)
            .await
            .map_err(RepoError::connection)?;
        debug!("store connection opened");
        Ok(Box::new(PgDocuments { conn }))
    }
}

pub struct PgDocuments {
    conn: PgConnection,
}

const USER_COLUMNS: &str = "id, username, password, profile";
const REVIEW_COLUMNS: &str = "id, user_id, movie_id, review, rating, favorite, date";

impl PgDocuments {
    async fn fetch_user(
        &mut self,
        clause: &str,
        binds: &[&str],
    ) -> Result<Option<User>, RepoError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {clause} ORDER BY seq LIMIT 1"
        );
        let mut query = sqlx::query_as::<_, UserRow>(&sql);
        for b in binds {
            query = query.bind(*b);
        }
        let row = query
            .fetch_optional(&mut self.conn)
            .await
            .map_err(RepoError::store)?;
        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl Connection for PgDocuments {
    async fn find_user_by_credentials(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, RepoError> {
        self.fetch_user("username = $1 AND password = $2", &[username, password])
            .await
    }

    async fn find_users_by_username(&mut self, username: &str) -> Result<Vec<User>, RepoError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 ORDER BY seq"
        ))
        .bind(username)
        .fetch_all(&mut self.conn)
        .await
        .map_err(RepoError::store)?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn find_user_by_id(&mut self, id: ObjectId) -> Result<Option<User>, RepoError> {
        let id = id.to_string();
        self.fetch_user("id = $1", &[id.as_str()]).await
    }

    async fn find_reviews(&mut self, filter: ReviewFilter) -> Result<Vec<Review>, RepoError> {
        let rows = match filter {
            ReviewFilter::All => {
                sqlx::query_as::<_, ReviewRow>(&format!(
                    "SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY seq"
                ))
                .fetch_all(&mut self.conn)
                .await
            }
            ReviewFilter::ByUser(user_id) => {
                sqlx::query_as::<_, ReviewRow>(&format!(
                    "SELECT {REVIEW_COLUMNS} FROM reviews WHERE user_id = $1 ORDER BY seq"
                ))
                .bind(user_id.to_string())
                .fetch_all(&mut self.conn)
                .await
            }
        }
        .map_err(RepoError::store)?;

        rows.into_iter().map(Review::try_from).collect()
    }

    async fn insert_review(&mut self, review: NewReview) -> Result<ObjectId, RepoError> {
        let review = review.into_review(ObjectId::new());
        sqlx::query(
            r#"
            INSERT INTO reviews (id, user_id, movie_id, review, rating, favorite, date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(review.id.to_string())
        .bind(review.user_id.to_string())
        .bind(review.movie_id)
        .bind(review.review)
        .bind(review.rating)
        .bind(review.favorite)
        .bind(review.date)
        .execute(&mut self.conn)
        .await
        .map_err(RepoError::store)?;
        Ok(review.id)
    }

    async fn update_review(
        &mut self,
        id: ObjectId,
        changes: ReviewChanges,
    ) -> Result<u64, RepoError> {
        let done = sqlx::query(
            r#"
            UPDATE reviews
               SET review = $2, rating = $3, favorite = $4
             WHERE id = $1
               AND (review, rating, favorite) IS DISTINCT FROM ($2::text, $3::float8, $4::boolean)
            "#,
        )
        .bind(id.to_string())
        .bind(changes.review)
        .bind(changes.rating)
        .bind(changes.favorite)
        .execute(&mut self.conn)
        .await
        .map_err(RepoError::store)?;
        Ok(done.rows_affected())
    }

    async fn delete_review(&mut self, id: ObjectId) -> Result<u64, RepoError> {
        let done = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id.to_string())
            .execute(&mut self.conn)
            .await
            .map_err(RepoError::store)?;
        Ok(done.rows_affected())
    }

    async fn close(self: Box<Self>) {
        if let Err(e) = self.conn.close().await {
            warn!(error = %e, "closing store connection failed");
        } else {
            debug!("store connection closed");
        }
    }
}

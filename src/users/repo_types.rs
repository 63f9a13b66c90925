use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{types::Json, FromRow};

use crate::{errors::RepoError, store::ObjectId};

/// Keys owned by the typed fields of [`User`]; never taken from `extra`.
const RESERVED_FIELDS: [&str; 3] = ["_id", "username", "password"];

/// User document. Fields beyond the credentials are kept as-is in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String, // plaintext or PHC string, never exposed in JSON
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Builds a user, dropping any opaque field that would shadow `_id`,
    /// `username` or `password` on the wire.
    pub fn new(
        id: ObjectId,
        username: String,
        password: String,
        mut extra: Map<String, Value>,
    ) -> Self {
        for key in RESERVED_FIELDS {
            extra.remove(key);
        }
        Self {
            id,
            username,
            password,
            extra,
        }
    }
}

/// Row of the `users` table.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub profile: Json<Map<String, Value>>,
}

impl TryFrom<UserRow> for User {
    type Error = RepoError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let id = r.id.parse().map_err(RepoError::store)?;
        Ok(Self::new(id, r.username, r.password, r.profile.0))
    }
}

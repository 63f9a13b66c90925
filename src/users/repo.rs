use tracing::warn;

use crate::{
    errors::RepoError,
    store::ConnectionProvider,
    users::{
        password::{verify_password, CredentialScheme},
        repo_types::User,
    },
};

impl User {
    /// Find the user owning this credential pair.
    ///
    /// With [`CredentialScheme::Plaintext`] both fields must match the stored
    /// document exactly. With [`CredentialScheme::Argon2`] every user with that
    /// username is tried in store order and the first whose stored hash
    /// verifies wins.
    pub async fn find(
        store: &dyn ConnectionProvider,
        scheme: CredentialScheme,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, RepoError> {
        let mut conn = store.connect().await?;
        let found = match scheme {
            CredentialScheme::Plaintext => conn.find_user_by_credentials(username, password).await,
            CredentialScheme::Argon2 => conn
                .find_users_by_username(username)
                .await
                .map(|candidates| first_verified(candidates, password)),
        };
        conn.close().await;
        found
    }
}

fn first_verified(candidates: Vec<User>, password: &str) -> Option<User> {
    candidates
        .into_iter()
        .find(|user| match verify_password(password, &user.password) {
            Ok(ok) => ok,
            Err(e) => {
                warn!(error = %e, user_id = %user.id, "stored password is not a valid hash");
                false
            }
        })
}

use serde::Deserialize;

use crate::users::password::CredentialScheme;

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub api_key: String,
    pub base_url: String,
    pub language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub password_scheme: CredentialScheme,
    pub catalog: CatalogConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let password_scheme = match std::env::var("PASSWORD_SCHEME") {
            Ok(v) => v.parse()?,
            Err(_) => CredentialScheme::default(),
        };
        let catalog = CatalogConfig {
            api_key: std::env::var("TMDB_API_KEY").unwrap_or_else(|_| {
                tracing::warn!("TMDB_API_KEY not set; catalog requests will be rejected upstream");
                String::new()
            }),
            base_url: std::env::var("TMDB_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.themoviedb.org/3".into()),
            language: std::env::var("TMDB_LANGUAGE").unwrap_or_else(|_| "en-US".into()),
        };
        Ok(Self {
            database_url,
            password_scheme,
            catalog,
        })
    }
}

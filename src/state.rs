use std::sync::Arc;

use crate::{
    catalog::CatalogClient,
    config::AppConfig,
    sessions::{MemorySessionStore, SessionStore},
    store::{postgres::PgConnector, ConnectionProvider},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ConnectionProvider>,
    pub sessions: Arc<dyn SessionStore>,
    pub catalog: Arc<CatalogClient>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let connector = PgConnector::new(&config.database_url);
        if let Err(e) = connector.migrate().await {
            tracing::warn!(error = ?e, "migrations failed; continuing");
        }

        let catalog = Arc::new(CatalogClient::new(&config.catalog)?);

        Ok(Self::from_parts(
            Arc::new(connector),
            Arc::new(MemorySessionStore::new()),
            catalog,
            config,
        ))
    }

    pub fn from_parts(
        store: Arc<dyn ConnectionProvider>,
        sessions: Arc<dyn SessionStore>,
        catalog: Arc<CatalogClient>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            store,
            sessions,
            catalog,
            config,
        }
    }

    #[cfg(test)]
    pub fn fake(store: crate::store::memory::MemoryConnector) -> Self {
        use crate::config::CatalogConfig;

        let config = Arc::new(AppConfig {
            database_url: "memory://".into(),
            password_scheme: Default::default(),
            catalog: CatalogConfig {
                api_key: "test".into(),
                base_url: "http://127.0.0.1:9/3".into(),
                language: "en-US".into(),
            },
        });
        let catalog = Arc::new(CatalogClient::new(&config.catalog).expect("catalog client"));

        Self::from_parts(
            Arc::new(store),
            Arc::new(MemorySessionStore::new()),
            catalog,
            config,
        )
    }
}

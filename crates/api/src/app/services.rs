//! Service wiring: verifier, revocation list, lookups, resolver.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use atrium_auth::{
    AccountDirectory, DelegationSessionStore, Hs256TokenVerifier, InMemoryAccountDirectory,
    InMemoryDelegationSessionStore, InMemoryRevocationStore, PrincipalResolver, RevocationStore,
    TokenExtractor,
};
use atrium_infra::{PgAccountDirectory, PgDelegationSessionStore};

use crate::app::AppState;
use crate::config::AppConfig;

const DB_MAX_CONNECTIONS: u32 = 10;

/// Build application state from configuration.
///
/// Postgres is used for lookups when `DATABASE_URL` is set, otherwise empty
/// in-memory stores (every token is then rejected as deactivated).
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppState> {
    let verifier = Arc::new(Hs256TokenVerifier::new(config.auth.signing_secret())?);
    let revocations = build_revocation_store(config)?;

    let (accounts, delegations): (Arc<dyn AccountDirectory>, Arc<dyn DelegationSessionStore>) =
        match &config.database_url {
            Some(url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(DB_MAX_CONNECTIONS)
                    .connect(url)
                    .await
                    .context("failed to connect to Postgres")?;
                info!("using Postgres account and delegation lookups");
                (
                    Arc::new(PgAccountDirectory::new(pool.clone())),
                    Arc::new(PgDelegationSessionStore::new(pool)),
                )
            }
            None => {
                warn!("DATABASE_URL not set; using empty in-memory account and delegation stores");
                (
                    Arc::new(InMemoryAccountDirectory::new()),
                    Arc::new(InMemoryDelegationSessionStore::new()),
                )
            }
        };

    let resolver = PrincipalResolver::new(verifier, revocations.clone(), accounts, delegations)
        .with_extractor(TokenExtractor::new(config.auth.cookie_name.clone()));

    Ok(AppState::new(resolver, revocations))
}

fn build_revocation_store(config: &AppConfig) -> anyhow::Result<Arc<dyn RevocationStore>> {
    match &config.redis_url {
        #[cfg(feature = "redis")]
        Some(url) => {
            let store = atrium_infra::RedisRevocationStore::new(url)
                .context("invalid REDIS_URL")?;
            info!("using Redis revocation list");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "redis"))]
        Some(_) => anyhow::bail!("REDIS_URL is set but this build has no redis support"),
        None => {
            info!("using in-process revocation list");
            Ok(Arc::new(InMemoryRevocationStore::new()))
        }
    }
}

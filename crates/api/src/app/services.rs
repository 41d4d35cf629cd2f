//! Infrastructure wiring: picks the product store and builds the lookup client.

use std::sync::Arc;

use anyhow::Context;

use catalog_infra::{
    AddressLookup, AppConfig, CatalogService, InMemoryProductStore, PostgresProductStore,
    ProductStore, ViaCepClient,
};

/// Build the catalog service described by `config`.
///
/// `DATABASE_URL` set selects Postgres (schema is created if missing);
/// otherwise products live in memory for the lifetime of the process.
pub async fn build_catalog(config: &AppConfig) -> anyhow::Result<CatalogService> {
    let store: Arc<dyn ProductStore> = match &config.database_url {
        Some(url) => {
            let store = PostgresProductStore::connect(url)
                .await
                .context("failed to connect to Postgres")?;
            store.migrate().await.context("failed to prepare schema")?;
            tracing::info!("using postgres product store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory product store");
            Arc::new(InMemoryProductStore::new())
        }
    };

    let lookup: Arc<dyn AddressLookup> = Arc::new(
        ViaCepClient::new(
            config.address_lookup_url.clone(),
            config.address_lookup_timeout,
        )
        .context("failed to build address lookup client")?,
    );

    Ok(CatalogService::new(store, lookup))
}

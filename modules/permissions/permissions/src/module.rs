use std::sync::Arc;

use anyhow::Context as _;
use permissions_sdk::PermissionsClient;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::api::bus::RequestRouter;
use crate::config::PermissionsConfig;
use crate::domain::{ActionCatalog, PermissionCache, PermissionsLocalClient, Service};
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{self, SeaOrmPermissionStore};

pub const MODULE_NAME: &str = "permissions";

/// Wired permissions module: store, cache, service and bus router.
pub struct PermissionsModule {
    db: DatabaseConnection,
    client: Arc<dyn PermissionsClient>,
}

impl PermissionsModule {
    /// Connect the store, apply migrations when enabled and assemble the
    /// service on top of `cache`.
    ///
    /// # Errors
    ///
    /// Fails if the database is unreachable or a migration fails.
    pub async fn init(
        cfg: &PermissionsConfig,
        cache: Arc<dyn PermissionCache>,
    ) -> anyhow::Result<Self> {
        info!(module = MODULE_NAME, "Initializing permissions module");

        let db = storage::connect(&cfg.database)
            .await
            .context("failed to connect to the permissions database")?;

        if cfg.database.run_migrations {
            info!("Applying permissions database migrations");
            Migrator::up(&db, None)
                .await
                .context("failed to apply permissions migrations")?;
        }

        let catalog = ActionCatalog::from_config(&cfg.actions);
        if catalog.is_unrestricted() {
            info!("No action catalog configured, accepting any module and action");
        }

        let store = Arc::new(SeaOrmPermissionStore::new(db.clone()));
        let service = Arc::new(Service::new(store, cache, catalog));
        let client: Arc<dyn PermissionsClient> = Arc::new(PermissionsLocalClient::new(service));

        info!(module = MODULE_NAME, "Permissions module initialized");
        Ok(Self { db, client })
    }

    /// In-process client, bypassing the bus.
    #[must_use]
    pub fn client(&self) -> Arc<dyn PermissionsClient> {
        self.client.clone()
    }

    #[must_use]
    pub fn router(&self) -> RequestRouter {
        RequestRouter::new(self.client.clone())
    }

    /// Close the connection pool.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the pool does not close cleanly.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.db
            .close()
            .await
            .context("failed to close the permissions database")?;
        info!(module = MODULE_NAME, "Permissions module stopped");
        Ok(())
    }
}

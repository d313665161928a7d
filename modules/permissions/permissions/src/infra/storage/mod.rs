//! Relational store: `SeaORM` entity, migrations and the
//! [`PermissionStore`](crate::domain::PermissionStore) adapter.

pub mod entity;
pub mod migrations;
pub mod sea_orm_repo;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use crate::config::DatabaseConfig;

pub use sea_orm_repo::SeaOrmPermissionStore;

/// Open the connection pool described by `cfg`.
///
/// # Errors
///
/// Returns the driver error if the database cannot be reached.
pub async fn connect(cfg: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.max_connections(cfg.max_conns)
        .min_connections(cfg.min_conns)
        .connect_timeout(cfg.connect_timeout())
        .idle_timeout(cfg.idle_timeout())
        .sqlx_logging(false);

    Database::connect(opts).await
}

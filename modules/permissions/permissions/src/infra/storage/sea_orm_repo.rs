use async_trait::async_trait;
use permissions_sdk::{Permission, PermissionSet};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder,
};

use crate::domain::model::Grant;
use crate::domain::repo::{PermissionStore, StoreError};

use super::entity::{self, Entity as PermissionsEntity};

/// [`PermissionStore`] over a `SeaORM` connection pool.
#[derive(Clone)]
pub struct SeaOrmPermissionStore {
    db: DatabaseConnection,
}

impl SeaOrmPermissionStore {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_err(e: DbErr) -> StoreError {
    StoreError::unavailable(e)
}

/// Rows holding exactly this `(api_key, module, action)` triple.
fn matching(grant: &Grant<'_>) -> Condition {
    Condition::all()
        .add(entity::Column::ApiKey.eq(grant.api_key))
        .add(entity::Column::Module.eq(grant.module))
        .add(entity::Column::Action.eq(grant.action))
}

#[async_trait]
impl PermissionStore for SeaOrmPermissionStore {
    async fn grant(&self, grant: &Grant<'_>) -> Result<(), StoreError> {
        let active_model = entity::ActiveModel {
            id: ActiveValue::NotSet,
            api_key: ActiveValue::Set(grant.api_key.to_owned()),
            module: ActiveValue::Set(grant.module.to_owned()),
            action: ActiveValue::Set(grant.action.to_owned()),
            created_at: ActiveValue::Set(chrono::Utc::now()),
        };

        // Existing grant: the unique index turns the insert into a no-op.
        PermissionsEntity::insert(active_model)
            .on_conflict(
                OnConflict::columns([
                    entity::Column::ApiKey,
                    entity::Column::Module,
                    entity::Column::Action,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;

        Ok(())
    }

    async fn revoke(&self, grant: &Grant<'_>) -> Result<(), StoreError> {
        let res = PermissionsEntity::delete_many()
            .filter(matching(grant))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if res.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list(&self, api_key: &str) -> Result<PermissionSet, StoreError> {
        let rows = PermissionsEntity::find()
            .filter(entity::Column::ApiKey.eq(api_key))
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|row| Permission::new(row.module, row.action))
            .collect())
    }

    async fn exists(&self, grant: &Grant<'_>) -> Result<bool, StoreError> {
        let row = PermissionsEntity::find()
            .filter(matching(grant))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(row.is_some())
    }
}

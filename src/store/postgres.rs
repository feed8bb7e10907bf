use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::{NumberStore, StoreError, StoreResult, UserStore};
use crate::entities::{admin_user_entity as admin_users, raffle_number_entity as numbers};
use crate::models::{AdminUser, NewNumberRecord, NumberRecord};

/// 基于 sea-orm 的号码存储。
/// 表上的 (event_id, number) 唯一索引使插入成为条件插入，重复时返回 `StoreError::Conflict`。
pub struct SeaOrmNumberStore {
    pool: DatabaseConnection,
}

impl SeaOrmNumberStore {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }
}

/// 将数据库行转换为领域模型；number / range 无法解析的脏数据返回 None
fn to_record(model: numbers::Model) -> Option<NumberRecord> {
    let number = match model.number.trim().parse::<u32>() {
        Ok(n) => n,
        Err(_) => {
            log::warn!(
                "Skipping raffle number row {} with unparsable number {:?}",
                model.id,
                model.number
            );
            return None;
        }
    };
    let range = u32::try_from(model.range).ok()?;
    Some(NumberRecord {
        id: model.id,
        event_id: model.event_id,
        number,
        range,
        timestamp: model.timestamp,
    })
}

#[async_trait]
impl NumberStore for SeaOrmNumberStore {
    async fn find_by_event(&self, event_id: &str) -> StoreResult<Vec<NumberRecord>> {
        let rows = numbers::Entity::find()
            .filter(numbers::Column::EventId.eq(event_id))
            .order_by_asc(numbers::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().filter_map(to_record).collect())
    }

    async fn find_by_event_and_number(
        &self,
        event_id: &str,
        number: u32,
    ) -> StoreResult<Vec<NumberRecord>> {
        let rows = numbers::Entity::find()
            .filter(numbers::Column::EventId.eq(event_id))
            .filter(numbers::Column::Number.eq(number.to_string()))
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().filter_map(to_record).collect())
    }

    async fn insert(&self, record: NewNumberRecord) -> StoreResult<NumberRecord> {
        let range = i32::try_from(record.range)
            .map_err(|_| StoreError::Unavailable(format!("range {} out of bounds", record.range)))?;
        let model = numbers::ActiveModel {
            event_id: Set(record.event_id.clone()),
            number: Set(record.number.to_string()),
            range: Set(range),
            timestamp: Set(record.timestamp),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(record.into_record(model.id))
    }

    async fn delete_by_event(&self, event_id: &str) -> StoreResult<u64> {
        let result = numbers::Entity::delete_many()
            .filter(numbers::Column::EventId.eq(event_id))
            .exec(&self.pool)
            .await?;
        Ok(result.rows_affected)
    }
}

pub struct SeaOrmUserStore {
    pool: DatabaseConnection,
}

impl SeaOrmUserStore {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }
}

impl From<admin_users::Model> for AdminUser {
    fn from(m: admin_users::Model) -> Self {
        AdminUser {
            id: m.id,
            email: m.email,
            password_hash: m.password_hash,
        }
    }
}

#[async_trait]
impl UserStore for SeaOrmUserStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<AdminUser>> {
        let user = admin_users::Entity::find()
            .filter(admin_users::Column::Email.eq(email))
            .one(&self.pool)
            .await?;
        Ok(user.map(Into::into))
    }

    async fn insert(&self, email: &str, password_hash: &str) -> StoreResult<AdminUser> {
        let model = admin_users::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(model.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

    fn row(id: i64, number: &str) -> numbers::Model {
        numbers::Model {
            id,
            event_id: "demo-ABC123".to_string(),
            number: number.to_string(),
            range: 3,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_find_by_event_skips_unparsable_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(1, "1"), row(2, "abc"), row(3, "3")]])
            .into_connection();
        let store = SeaOrmNumberStore::new(db);

        let records = store.find_by_event("demo-ABC123").await.unwrap();
        let found: Vec<u32> = records.iter().map(|r| r.number).collect();
        assert_eq!(found, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_insert_returns_stored_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(42, "2")]])
            .into_connection();
        let store = SeaOrmNumberStore::new(db);

        let stored = store
            .insert(NewNumberRecord::new("demo-ABC123", 2, 3))
            .await
            .unwrap();
        assert_eq!(stored.id, 42);
        assert_eq!(stored.number, 2);
    }

    #[tokio::test]
    async fn test_query_failure_maps_to_unavailable() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".to_string())])
            .into_connection();
        let store = SeaOrmNumberStore::new(db);

        let err = store.find_by_event("demo-ABC123").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}

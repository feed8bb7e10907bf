use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{NumberStore, StoreError, StoreResult, UserStore};
use crate::models::{AdminUser, NewNumberRecord, NumberRecord};

#[derive(Debug, Default)]
struct NumberTable {
    next_id: i64,
    rows: Vec<NumberRecord>,
}

/// 进程内号码存储。
///
/// 默认带 (event_id, number) 唯一索引，行为与数据库存储一致；
/// `without_unique_index()` 构造的实例只做普通追加，用来模拟没有条件插入的文档存储。
/// 每次调用前都会让出一次调度，使并发调用方的读写能够交错。
#[derive(Debug)]
pub struct MemoryNumberStore {
    table: Mutex<NumberTable>,
    unique_index: bool,
}

impl MemoryNumberStore {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(NumberTable::default()),
            unique_index: true,
        }
    }

    pub fn without_unique_index() -> Self {
        Self {
            table: Mutex::new(NumberTable::default()),
            unique_index: false,
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, NumberTable>> {
        self.table
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".to_string()))
    }
}

impl Default for MemoryNumberStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NumberStore for MemoryNumberStore {
    async fn find_by_event(&self, event_id: &str) -> StoreResult<Vec<NumberRecord>> {
        tokio::task::yield_now().await;
        let table = self.lock()?;
        Ok(table
            .rows
            .iter()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn find_by_event_and_number(
        &self,
        event_id: &str,
        number: u32,
    ) -> StoreResult<Vec<NumberRecord>> {
        tokio::task::yield_now().await;
        let table = self.lock()?;
        Ok(table
            .rows
            .iter()
            .filter(|r| r.event_id == event_id && r.number == number)
            .cloned()
            .collect())
    }

    async fn insert(&self, record: NewNumberRecord) -> StoreResult<NumberRecord> {
        tokio::task::yield_now().await;
        let mut table = self.lock()?;
        if self.unique_index
            && table
                .rows
                .iter()
                .any(|r| r.event_id == record.event_id && r.number == record.number)
        {
            return Err(StoreError::Conflict);
        }
        table.next_id += 1;
        let stored = record.into_record(table.next_id);
        table.rows.push(stored.clone());
        Ok(stored)
    }

    async fn delete_by_event(&self, event_id: &str) -> StoreResult<u64> {
        tokio::task::yield_now().await;
        let mut table = self.lock()?;
        let before = table.rows.len();
        table.rows.retain(|r| r.event_id != event_id);
        Ok((before - table.rows.len()) as u64)
    }
}

/// 进程内管理员账号存储（进程退出即丢失，仅用于演示与测试）
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, AdminUser>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<String, AdminUser>>> {
        self.users
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<AdminUser>> {
        Ok(self.lock()?.get(email).cloned())
    }

    async fn insert(&self, email: &str, password_hash: &str) -> StoreResult<AdminUser> {
        let mut users = self.lock()?;
        if users.contains_key(email) {
            return Err(StoreError::Conflict);
        }
        let user = AdminUser {
            id: users.len() as i64 + 1,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };
        users.insert(email.to_string(), user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unique_index_rejects_duplicate_number() {
        let store = MemoryNumberStore::new();
        store
            .insert(NewNumberRecord::new("demo", 1, 10))
            .await
            .unwrap();

        let err = store
            .insert(NewNumberRecord::new("demo", 1, 10))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Conflict);

        // 其它活动不受影响
        assert!(store.insert(NewNumberRecord::new("other", 1, 10)).await.is_ok());
    }

    #[tokio::test]
    async fn test_without_unique_index_accepts_duplicates() {
        let store = MemoryNumberStore::without_unique_index();
        store.insert(NewNumberRecord::new("demo", 1, 10)).await.unwrap();
        store.insert(NewNumberRecord::new("demo", 1, 10)).await.unwrap();

        let found = store.find_by_event_and_number("demo", 1).await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_by_event_is_scoped() {
        let store = MemoryNumberStore::new();
        for n in 1..=3 {
            store.insert(NewNumberRecord::new("a", n, 3)).await.unwrap();
        }
        store.insert(NewNumberRecord::new("b", 1, 3)).await.unwrap();

        assert_eq!(store.delete_by_event("a").await.unwrap(), 3);
        assert!(store.find_by_event("a").await.unwrap().is_empty());
        assert_eq!(store.find_by_event("b").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_user_store_rejects_duplicate_email() {
        let store = MemoryUserStore::new();
        store.insert("admin@raffle.com", "hash").await.unwrap();
        assert_eq!(
            store.insert("admin@raffle.com", "hash").await.unwrap_err(),
            StoreError::Conflict
        );
        assert!(store.find_by_email("admin@raffle.com").await.unwrap().is_some());
        assert!(store.find_by_email("nobody@raffle.com").await.unwrap().is_none());
    }
}

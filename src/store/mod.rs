//! 存储抽象：号码记录集合与管理员账号。
//!
//! 号码存储只暴露等值查询、单条插入与按活动批量删除，不假设多文档事务。
//! 若实现能保证 (event_id, number) 唯一（条件插入），重复插入返回
//! [`StoreError::Conflict`]，分配器据此把唯一性从"尽力而为"提升为严格保证。

mod memory;
mod postgres;

pub use memory::{MemoryNumberStore, MemoryUserStore};
pub use postgres::{SeaOrmNumberStore, SeaOrmUserStore};

use async_trait::async_trait;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::models::{AdminUser, NewNumberRecord, NumberRecord};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// 网络 / 权限 / 超时等存储调用失败
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// 条件插入失败：同一唯一键已存在
    #[error("record already exists")]
    Conflict,
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::Conflict,
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// 号码记录集合
#[async_trait]
pub trait NumberStore: Send + Sync {
    /// 读取某活动的全部记录
    async fn find_by_event(&self, event_id: &str) -> StoreResult<Vec<NumberRecord>>;

    /// 按 (event_id, number) 点查
    async fn find_by_event_and_number(
        &self,
        event_id: &str,
        number: u32,
    ) -> StoreResult<Vec<NumberRecord>>;

    /// 插入一条记录；支持唯一约束的实现遇到重复时返回 `StoreError::Conflict`
    async fn insert(&self, record: NewNumberRecord) -> StoreResult<NumberRecord>;

    /// 删除某活动的全部记录，返回删除条数
    async fn delete_by_event(&self, event_id: &str) -> StoreResult<u64>;
}

/// 管理员账号存储
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<AdminUser>>;

    /// 邮箱已存在时返回 `StoreError::Conflict`
    async fn insert(&self, email: &str, password_hash: &str) -> StoreResult<AdminUser>;
}

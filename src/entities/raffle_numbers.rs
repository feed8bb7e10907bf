use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 抽奖号码实体
/// 说明:
/// - 每成功分配一次号码产生一条记录，创建后不再修改
/// - number 以字符串保存，(event_id, number) 唯一
/// - range 冗余存储创建时生效的上限，仅用于审计
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "raffle_numbers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// 活动ID (缺省为 "default")
    pub event_id: String,
    /// 号码 (字符串编码的整数)
    pub number: String,
    /// 创建时的号码范围上限
    pub range: i32,
    /// 分配时间
    pub timestamp: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

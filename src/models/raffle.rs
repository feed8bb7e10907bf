use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use utoipa::{IntoParams, ToSchema};

/// 未指定活动时使用的活动ID
pub const DEFAULT_EVENT_ID: &str = "default";

/// 已分配的抽奖号码（领域模型）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NumberRecord {
    /// 记录ID
    pub id: i64,
    /// 活动ID
    pub event_id: String,
    /// 号码 (序列化为字符串)
    #[serde(serialize_with = "number_as_string")]
    #[schema(value_type = String, example = "7")]
    pub number: u32,
    /// 创建时的号码范围上限
    pub range: u32,
    /// 分配时间
    pub timestamp: DateTime<Utc>,
}

/// 待写入的号码记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNumberRecord {
    pub event_id: String,
    pub number: u32,
    pub range: u32,
    pub timestamp: DateTime<Utc>,
}

impl NewNumberRecord {
    pub fn new(event_id: &str, number: u32, range: u32) -> Self {
        Self {
            event_id: event_id.to_string(),
            number,
            range,
            timestamp: Utc::now(),
        }
    }

    pub fn into_record(self, id: i64) -> NumberRecord {
        NumberRecord {
            id,
            event_id: self.event_id,
            number: self.number,
            range: self.range,
            timestamp: self.timestamp,
        }
    }
}

fn number_as_string<S: Serializer>(number: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&number.to_string())
}

/// 访客领取号码的查询参数（range 保持原始字符串，解析失败时回退到默认值）
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VisitorQuery {
    /// 号码范围上限 (默认 100)
    pub range: Option<String>,
}

/// 访客领取号码响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssignmentResponse {
    /// 活动ID
    pub event_id: String,
    /// 号码
    #[serde(serialize_with = "number_as_string")]
    #[schema(value_type = String, example = "1")]
    pub number: u32,
    /// 号码范围上限
    pub range: u32,
    /// 是否来自客户端缓存（重复访问）
    pub reused: bool,
}

/// 创建活动请求
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    /// 活动/项目名称
    pub project_name: String,
    /// 号码范围上限 (默认 100)
    pub range: Option<u32>,
}

/// 活动配置：活动ID、号码范围与可分享的链接
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct EventConfigResponse {
    pub event_id: String,
    pub range: u32,
    /// `<base-url>/visitor/<eventId>?range=<range>`
    pub campaign_link: String,
}

/// 活动参与记录列表
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EntryListResponse {
    pub event_id: String,
    pub total: usize,
    pub entries: Vec<NumberRecord>,
}

/// 抽奖结果，没有参与记录时 winner 为 null
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DrawResponse {
    pub event_id: String,
    pub total_entries: usize,
    pub winner: Option<NumberRecord>,
}

/// 清空活动记录响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClearEntriesResponse {
    pub event_id: String,
    pub deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_serialized_as_string() {
        let record = NewNumberRecord::new("demo-ABC123", 7, 100).into_record(1);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["number"], "7");
        assert_eq!(value["range"], 100);
        assert_eq!(value["event_id"], "demo-ABC123");
    }
}

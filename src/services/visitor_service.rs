use std::sync::Arc;

use crate::error::AppResult;
use crate::services::{AssignmentCache, NumberAllocator};

/// 访客领取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub event_id: String,
    pub number: u32,
    pub range: u32,
    /// 号码来自客户端缓存（未调用分配器）
    pub reused: bool,
}

/// "领取我的号码"流程：先查客户端缓存，未命中再调用分配器并写回缓存
#[derive(Clone)]
pub struct VisitorService {
    allocator: Arc<NumberAllocator>,
}

impl VisitorService {
    pub fn new(allocator: Arc<NumberAllocator>) -> Self {
        Self { allocator }
    }

    pub async fn get_my_number<C>(
        &self,
        cache: &mut C,
        event_id: &str,
        range: u32,
    ) -> AppResult<Assignment>
    where
        C: AssignmentCache + ?Sized,
    {
        if let Some(number) = cache.get(event_id) {
            log::debug!("Visitor already holds number {number} for event {event_id}");
            return Ok(Assignment {
                event_id: event_id.to_string(),
                number,
                range,
                reused: true,
            });
        }

        let record = self.allocator.allocate(event_id, range).await?;
        cache.set(event_id, record.number);
        Ok(Assignment {
            event_id: record.event_id,
            number: record.number,
            range,
            reused: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RaffleConfig;
    use crate::error::AppError;
    use crate::services::MemoryAssignmentCache;
    use crate::store::{MemoryNumberStore, NumberStore};

    fn service(store: Arc<MemoryNumberStore>) -> VisitorService {
        VisitorService::new(Arc::new(NumberAllocator::new(
            store,
            &RaffleConfig::default(),
        )))
    }

    #[tokio::test]
    async fn test_second_visit_returns_same_number_without_allocating() {
        let store = Arc::new(MemoryNumberStore::new());
        let service = service(store.clone());
        let mut cache = MemoryAssignmentCache::new();

        let first = service.get_my_number(&mut cache, "demo-ABC123", 3).await.unwrap();
        let second = service.get_my_number(&mut cache, "demo-ABC123", 3).await.unwrap();

        assert_eq!(first.number, second.number);
        assert!(!first.reused);
        assert!(second.reused);
        assert_eq!(store.find_by_event("demo-ABC123").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_different_clients_get_different_numbers() {
        let service = service(Arc::new(MemoryNumberStore::new()));
        let mut alice = MemoryAssignmentCache::new();
        let mut bob = MemoryAssignmentCache::new();

        let a = service.get_my_number(&mut alice, "demo", 10).await.unwrap();
        let b = service.get_my_number(&mut bob, "demo", 10).await.unwrap();
        assert_ne!(a.number, b.number);
    }

    #[tokio::test]
    async fn test_cached_visitor_is_served_even_when_range_is_full() {
        let service = service(Arc::new(MemoryNumberStore::new()));
        let mut holder = MemoryAssignmentCache::new();
        let mut latecomer = MemoryAssignmentCache::new();

        let held = service.get_my_number(&mut holder, "tiny", 1).await.unwrap();
        let err = service
            .get_my_number(&mut latecomer, "tiny", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RangeExhausted { .. }));
        assert_eq!(latecomer.get("tiny"), None);

        let again = service.get_my_number(&mut holder, "tiny", 1).await.unwrap();
        assert_eq!(again.number, held.number);
    }
}

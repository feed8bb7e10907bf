use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;

use crate::config::{AllocationStrategy, RaffleConfig};
use crate::error::{AppError, AppResult};
use crate::models::{NewNumberRecord, NumberRecord};
use crate::store::{NumberStore, StoreError};

/// 号码分配器
///
/// 访客之间没有共享锁，唯一性完全依赖"查询 → 复核 → 插入"：
/// - 存储支持条件插入（唯一索引）时，重复插入返回 Conflict，唯一性是严格保证；
/// - 普通文档存储只能缩小竞争窗口，唯一性为尽力而为。
///
/// 两种策略都有明确的尝试上限，超过上限返回 `AllocationFailed`。
#[derive(Clone)]
pub struct NumberAllocator {
    store: Arc<dyn NumberStore>,
    strategy: AllocationStrategy,
    max_attempts: u32,
    max_range: u32,
}

impl NumberAllocator {
    pub fn new(store: Arc<dyn NumberStore>, config: &RaffleConfig) -> Self {
        Self {
            store,
            strategy: config.strategy,
            max_attempts: config.max_attempts.max(1),
            max_range: config.max_range,
        }
    }

    pub fn strategy(&self) -> AllocationStrategy {
        self.strategy
    }

    /// 为活动分配一个未被占用的号码并持久化
    ///
    /// 成功时恰好写入一条记录；失败时不写入任何记录。
    pub async fn allocate(&self, event_id: &str, range: u32) -> AppResult<NumberRecord> {
        if event_id.is_empty() {
            return Err(AppError::ValidationError("Event id must not be empty".into()));
        }
        if range == 0 || range > self.max_range {
            return Err(AppError::ValidationError(format!(
                "Range must be within 1..={}",
                self.max_range
            )));
        }

        let record = match self.strategy {
            AllocationStrategy::Sequential => self.allocate_sequential(event_id, range).await?,
            AllocationStrategy::RandomProbe => self.allocate_random_probe(event_id, range).await?,
        };
        log::info!(
            "Allocated number {} for event {} (range {})",
            record.number,
            event_id,
            range
        );
        Ok(record)
    }

    /// 顺序扫描：每轮读取全部已占用号码，选择最小的空闲号码
    async fn allocate_sequential(&self, event_id: &str, range: u32) -> AppResult<NumberRecord> {
        for attempt in 1..=self.max_attempts {
            let taken: HashSet<u32> = self
                .store
                .find_by_event(event_id)
                .await?
                .into_iter()
                .map(|r| r.number)
                .collect();

            // 已占用数量达到 range 即视为已满（range 缩小后，超出部分同样计入）
            let candidate = if taken.len() as u64 >= u64::from(range) {
                None
            } else {
                (1..=range).find(|n| !taken.contains(n))
            };
            let Some(candidate) = candidate else {
                return Err(AppError::RangeExhausted {
                    event_id: event_id.to_string(),
                    range,
                });
            };

            if let Some(record) = self.try_claim(event_id, candidate, range).await? {
                return Ok(record);
            }
            log::debug!(
                "Number {candidate} for event {event_id} taken concurrently (attempt {attempt}/{})",
                self.max_attempts
            );
        }

        log::warn!(
            "Sequential allocation for event {event_id} gave up after {} attempts",
            self.max_attempts
        );
        Err(AppError::AllocationFailed {
            event_id: event_id.to_string(),
            range,
            attempts: self.max_attempts,
        })
    }

    /// 随机探测：在 [1, range] 内随机抽取，最多尝试 2 × range 次
    async fn allocate_random_probe(&self, event_id: &str, range: u32) -> AppResult<NumberRecord> {
        let budget = range.saturating_mul(2);
        for _ in 0..budget {
            let candidate = rand::thread_rng().gen_range(1..=range);
            if let Some(record) = self.try_claim(event_id, candidate, range).await? {
                return Ok(record);
            }
        }

        // 预算耗尽后读取一次，区分"已满"与"竞争失败"
        let taken: HashSet<u32> = self
            .store
            .find_by_event(event_id)
            .await?
            .into_iter()
            .map(|r| r.number)
            .filter(|n| (1..=range).contains(n))
            .collect();
        if taken.len() as u64 >= u64::from(range) {
            return Err(AppError::RangeExhausted {
                event_id: event_id.to_string(),
                range,
            });
        }

        log::warn!("Random probe for event {event_id} gave up after {budget} attempts");
        Err(AppError::AllocationFailed {
            event_id: event_id.to_string(),
            range,
            attempts: budget,
        })
    }

    /// 复核后插入。号码已被并发写入者占用时返回 Ok(None)，由调用方重试
    async fn try_claim(
        &self,
        event_id: &str,
        number: u32,
        range: u32,
    ) -> AppResult<Option<NumberRecord>> {
        let existing = self
            .store
            .find_by_event_and_number(event_id, number)
            .await?;
        if !existing.is_empty() {
            return Ok(None);
        }

        match self
            .store
            .insert(NewNumberRecord::new(event_id, number, range))
            .await
        {
            Ok(record) => Ok(Some(record)),
            Err(StoreError::Conflict) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

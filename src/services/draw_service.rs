use std::sync::Arc;

use rand::Rng;

use crate::error::AppResult;
use crate::models::NumberRecord;
use crate::store::NumberStore;

/// 从参与记录中等概率抽取一条；列表为空时返回 None（"暂无可抽取号码"，不是错误）。
/// 不做加权，也不排除之前的中奖者。
pub fn draw(entries: &[NumberRecord]) -> Option<&NumberRecord> {
    draw_with_rng(entries, &mut rand::thread_rng())
}

pub fn draw_with_rng<'a, R: Rng + ?Sized>(
    entries: &'a [NumberRecord],
    rng: &mut R,
) -> Option<&'a NumberRecord> {
    if entries.is_empty() {
        return None;
    }
    entries.get(rng.gen_range(0..entries.len()))
}

/// 管理端：查看参与记录、抽奖、清空活动
#[derive(Clone)]
pub struct DrawService {
    store: Arc<dyn NumberStore>,
}

impl DrawService {
    pub fn new(store: Arc<dyn NumberStore>) -> Self {
        Self { store }
    }

    /// 活动的全部参与记录（按号码升序）
    pub async fn list_entries(&self, event_id: &str) -> AppResult<Vec<NumberRecord>> {
        let mut entries = self.store.find_by_event(event_id).await?;
        entries.sort_by_key(|r| r.number);
        Ok(entries)
    }

    /// 抽取一名中奖者，返回 (参与总数, 中奖记录)
    pub async fn draw_winner(&self, event_id: &str) -> AppResult<(usize, Option<NumberRecord>)> {
        let entries = self.list_entries(event_id).await?;
        let winner = draw(&entries).cloned();
        match &winner {
            Some(w) => log::info!(
                "Drew number {} for event {} out of {} entries",
                w.number,
                event_id,
                entries.len()
            ),
            None => log::info!("Nothing to draw for event {event_id}"),
        }
        Ok((entries.len(), winner))
    }

    /// 清空活动的全部号码记录，返回删除条数
    pub async fn clear_entries(&self, event_id: &str) -> AppResult<u64> {
        let deleted = self.store.delete_by_event(event_id).await?;
        log::info!("Cleared {deleted} entries for event {event_id}");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewNumberRecord;
    use crate::store::MemoryNumberStore;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn entries(k: u32) -> Vec<NumberRecord> {
        (1..=k)
            .map(|n| NewNumberRecord::new("demo", n, k).into_record(i64::from(n)))
            .collect()
    }

    #[test]
    fn test_draw_empty_returns_none() {
        assert!(draw(&[]).is_none());
    }

    #[test]
    fn test_draw_returns_member_of_list() {
        let list = entries(5);
        for _ in 0..50 {
            let winner = draw(&list).unwrap();
            assert!(list.contains(winner));
        }
    }

    #[test]
    fn test_draw_is_uniform_over_four_entries() {
        let list = entries(4);
        let mut rng = StdRng::seed_from_u64(20251019);
        let trials = 40_000;
        let mut counts = [0u32; 4];
        for _ in 0..trials {
            let winner = draw_with_rng(&list, &mut rng).unwrap();
            counts[(winner.number - 1) as usize] += 1;
        }
        for count in counts {
            let freq = f64::from(count) / f64::from(trials);
            assert!((freq - 0.25).abs() < 0.02, "frequency {freq} too far from 1/4");
        }
    }

    #[tokio::test]
    async fn test_draw_winner_and_clear() {
        let store = Arc::new(MemoryNumberStore::new());
        for n in [3, 1, 2] {
            store.insert(NewNumberRecord::new("demo", n, 3)).await.unwrap();
        }
        store.insert(NewNumberRecord::new("other", 1, 3)).await.unwrap();
        let service = DrawService::new(store);

        let listed: Vec<u32> = service
            .list_entries("demo")
            .await
            .unwrap()
            .iter()
            .map(|r| r.number)
            .collect();
        assert_eq!(listed, vec![1, 2, 3]);

        let (total, winner) = service.draw_winner("demo").await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(winner.unwrap().event_id, "demo");

        assert_eq!(service.clear_entries("demo").await.unwrap(), 3);
        let (total, winner) = service.draw_winner("demo").await.unwrap();
        assert_eq!(total, 0);
        assert!(winner.is_none());
        assert_eq!(service.list_entries("other").await.unwrap().len(), 1);
    }
}

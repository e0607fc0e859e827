//! In-memory stand-in for one admin resource endpoint.
//!
//! Behaves like the real backend as seen through [`RestGateway`]: it owns
//! the authoritative ordering, serves either list payload shape, and can
//! renormalize ranks to a contiguous sequence after every rank update the
//! way several backend resources do. Used for integration tests and
//! offline development.
//!
//! [`RestGateway`]: crate::client::RestGateway

use std::sync::Mutex;

use async_trait::async_trait;

use roster_api::{EngineError, ListPayload, ListQuery, RankOrder, Ranked, RemoteGateway, Result};

pub struct FakeResource<T: Ranked> {
    order: RankOrder,
    windowed: bool,
    renormalize: bool,
    records: Mutex<Vec<T>>,
}

impl<T: Ranked> FakeResource<T> {
    /// Resource whose `list` answers with a bare array.
    pub fn client_sliced(order: RankOrder, records: Vec<T>) -> Self {
        Self {
            order,
            windowed: false,
            renormalize: false,
            records: Mutex::new(records),
        }
    }

    /// Resource whose `list` answers with a page envelope.
    pub fn server_paginated(order: RankOrder, records: Vec<T>) -> Self {
        Self {
            order,
            windowed: true,
            renormalize: false,
            records: Mutex::new(records),
        }
    }

    /// Renormalize ranks to a contiguous sequence after every rank update,
    /// as several backend resources do.
    pub fn with_renormalization(mut self) -> Self {
        self.renormalize = true;
        self
    }

    pub fn snapshot(&self) -> Vec<T> {
        let mut records = self.records.lock().unwrap().clone();
        records.sort_by(|a, b| self.order.compare(a, b));
        records
    }

    pub fn rank_of(&self, id: &str) -> Option<i64> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id() == id)
            .map(|r| r.rank())
    }

    fn renormalize_locked(&self, records: &mut [T]) {
        records.sort_by(|a, b| self.order.compare(a, b));
        let len = records.len() as i64;
        for (i, record) in records.iter_mut().enumerate() {
            let rank = match self.order {
                RankOrder::Ascending => i as i64 + 1,
                RankOrder::Descending => len - i as i64,
            };
            record.set_rank(rank);
        }
    }
}

#[async_trait]
impl<T: Ranked> RemoteGateway<T> for FakeResource<T> {
    async fn list(&self, query: &ListQuery) -> Result<ListPayload<T>> {
        let sorted = self.snapshot();
        if !self.windowed {
            return Ok(ListPayload::Full(sorted));
        }
        let total_items = sorted.len();
        let page = query.page.max(1);
        let page_size = query.page_size;
        let (items, total_pages) = if page_size == 0 {
            (sorted, 1)
        } else {
            let start = ((page - 1) as usize * page_size as usize).min(total_items);
            let end = (start + page_size as usize).min(total_items);
            (
                sorted[start..end].to_vec(),
                (total_items as u32).div_ceil(page_size),
            )
        };
        Ok(ListPayload::Window {
            items,
            total_items,
            total_pages,
            current_page: page,
        })
    }

    async fn update_rank(&self, id: &str, rank: i64) -> Result<T> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| EngineError::network(format!("HTTP 404 error: record {id} not found")))?;
        record.set_rank(rank);
        if self.renormalize {
            self.renormalize_locked(&mut records);
        }
        let updated = records
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(|| EngineError::network(format!("HTTP 404 error: record {id} not found")))?;
        Ok(updated)
    }

    async fn create(&self, payload: T) -> Result<T> {
        let mut records = self.records.lock().unwrap();
        records.push(payload.clone());
        if self.renormalize {
            self.renormalize_locked(&mut records);
        }
        Ok(payload)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(EngineError::network(format!(
                "HTTP 404 error: record {id} not found"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::testing::TestRecord;

    fn gappy_records() -> Vec<TestRecord> {
        vec![
            TestRecord::new("a", 10),
            TestRecord::new("b", 20),
            TestRecord::new("c", 30),
        ]
    }

    #[tokio::test]
    async fn renormalization_compacts_ranks_after_update() {
        let fake = FakeResource::client_sliced(RankOrder::Ascending, gappy_records())
            .with_renormalization();

        fake.update_rank("c", 15).await.unwrap();

        let ranks: Vec<i64> = fake.snapshot().iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        let ids: Vec<String> = fake.snapshot().iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec!["a", "c", "b"]);
    }

    #[tokio::test]
    async fn windowed_list_slices_and_reports_totals() {
        let records = (0..25)
            .map(|i| TestRecord::new(&format!("r{i}"), i as i64 + 1))
            .collect();
        let fake = FakeResource::server_paginated(RankOrder::Ascending, records);

        let payload = fake
            .list(&ListQuery {
                page: 3,
                page_size: 10,
                filter: None,
            })
            .await
            .unwrap();

        match payload {
            ListPayload::Window {
                items,
                total_items,
                total_pages,
                current_page,
            } => {
                assert_eq!(items.len(), 5);
                assert_eq!(total_items, 25);
                assert_eq!(total_pages, 3);
                assert_eq!(current_page, 3);
            }
            ListPayload::Full(_) => panic!("expected a page envelope"),
        }
    }

    #[tokio::test]
    async fn descending_renormalization_keeps_the_convention() {
        let fake = FakeResource::client_sliced(RankOrder::Descending, gappy_records())
            .with_renormalization();

        fake.update_rank("a", 25).await.unwrap();

        // Highest rank first; ranks compacted to n..1
        let snapshot = fake.snapshot();
        let ids: Vec<String> = snapshot.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        let ranks: Vec<i64> = snapshot.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![3, 2, 1]);
    }
}

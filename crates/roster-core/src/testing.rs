//! In-memory gateway double for engine tests.
//!
//! Simulates the per-resource remote store: authoritative ordering, both
//! list payload shapes, and injectable failures. No network, no clock.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use roster_api::{EngineError, ListPayload, ListQuery, RankOrder, Ranked, RemoteGateway, Result};

/// Minimal record satisfying the [`Ranked`] capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRecord {
    pub id: String,
    pub rank: i64,
    pub created_at: DateTime<Utc>,
}

impl TestRecord {
    /// The timestamp is derived from the id so orderings are deterministic.
    pub fn new(id: &str, rank: i64) -> Self {
        let offset = id
            .bytes()
            .fold(0u64, |h, b| h.wrapping_mul(31).wrapping_add(b as u64))
            % 86_400;
        Self {
            id: id.to_string(),
            rank,
            created_at: Utc
                .timestamp_opt(1_700_000_000 + offset as i64, 0)
                .single()
                .unwrap_or_default(),
        }
    }
}

impl Ranked for TestRecord {
    fn id(&self) -> &str {
        &self.id
    }
    fn rank(&self) -> i64 {
        self.rank
    }
    fn set_rank(&mut self, rank: i64) {
        self.rank = rank;
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadShape {
    /// Answer with a bare array (client-sliced resources).
    Full,
    /// Answer with a page envelope (server-paginated resources).
    Windowed,
}

/// In-memory [`RemoteGateway`] with call counters and failure injection.
pub struct MemoryGateway<T: Ranked> {
    shape: PayloadShape,
    order: RankOrder,
    records: Mutex<Vec<T>>,
    list_calls: AtomicUsize,
    update_calls: AtomicUsize,
    create_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    fail_list: AtomicBool,
    fail_update: Mutex<HashSet<String>>,
    fail_delete: Mutex<HashSet<String>>,
}

impl<T: Ranked> MemoryGateway<T> {
    /// Gateway for a client-sliced resource: `list` returns everything.
    pub fn full(order: RankOrder, records: Vec<T>) -> Self {
        Self::with_shape(PayloadShape::Full, order, records)
    }

    /// Gateway for a server-paginated resource: `list` returns one window.
    pub fn windowed(order: RankOrder, records: Vec<T>) -> Self {
        Self::with_shape(PayloadShape::Windowed, order, records)
    }

    fn with_shape(shape: PayloadShape, order: RankOrder, records: Vec<T>) -> Self {
        Self {
            shape,
            order,
            records: Mutex::new(records),
            list_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            fail_list: AtomicBool::new(false),
            fail_update: Mutex::new(HashSet::new()),
            fail_delete: Mutex::new(HashSet::new()),
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    /// Make `update_rank` reject for the given id.
    pub fn fail_update_rank(&self, id: &str) {
        self.fail_update.lock().unwrap().insert(id.to_string());
    }

    /// Make `delete` reject for the given id.
    pub fn fail_delete(&self, id: &str) {
        self.fail_delete.lock().unwrap().insert(id.to_string());
    }

    /// Current server-side records in authoritative order.
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
}

#[async_trait]
impl<T: Ranked> RemoteGateway<T> for MemoryGateway<T> {
    async fn list(&self, query: &ListQuery) -> Result<ListPayload<T>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(EngineError::network("injected list failure"));
        }
        let sorted = self.snapshot();
        match self.shape {
            PayloadShape::Full => Ok(ListPayload::Full(sorted)),
            PayloadShape::Windowed => {
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
        }
    }

    async fn update_rank(&self, id: &str, rank: i64) -> Result<T> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_update.lock().unwrap().contains(id) {
            return Err(EngineError::network(format!(
                "injected update failure for {id}"
            )));
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| EngineError::network(format!("record {id} not found (HTTP 404)")))?;
        record.set_rank(rank);
        Ok(record.clone())
    }

    async fn create(&self, payload: T) -> Result<T> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.records.lock().unwrap().push(payload.clone());
        Ok(payload)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.lock().unwrap().contains(id) {
            return Err(EngineError::network(format!(
                "injected delete failure for {id}"
            )));
        }
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(EngineError::network(format!(
                "record {id} not found (HTTP 404)"
            )));
        }
        Ok(())
    }
}

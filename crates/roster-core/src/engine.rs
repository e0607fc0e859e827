//! Per-screen list engine: reordering, bulk saves, selection, deletion.
//!
//! One `ListEngine` instance backs one screen. Every mutation follows the
//! same discipline: optimistic local change, concurrent persistence calls,
//! then an unconditional refetch that adopts whatever the remote store now
//! holds. There is no compensating transaction; the refetch is the
//! correction.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info};

use roster_api::{
    EngineError, ListPayload, ListQuery, PageWindow, RankOrder, Ranked, RemoteGateway, Result,
};

use crate::paging::{PageStrategy, Pager};
use crate::selection::{HeaderState, SelectionManager};
use crate::store::RecordStore;

/// Display state of a screen's list area.
///
/// Orthogonal to the [`busy`] flag: a failed save leaves the list `Loaded`
/// (or `LoadError` if the follow-up refetch also failed).
///
/// [`busy`]: ListEngine::is_busy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    LoadError(String),
}

/// Result of [`ListEngine::save_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// No rank differed from the baseline; no network call was made.
    NothingToSave,
    Saved { updated: usize },
}

/// Aggregate result of a bulk delete; individual failures are tallied, not
/// retried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub succeeded: usize,
    pub failed: usize,
}

/// Stale-response guard for in-flight fetches.
///
/// A screen holds a clone and calls [`invalidate`] on unmount; any fetch
/// dispatched before that point discards its result instead of applying it.
///
/// [`invalidate`]: FetchEpoch::invalidate
#[derive(Debug, Clone, Default)]
pub struct FetchEpoch(Arc<AtomicU64>);

impl FetchEpoch {
    pub fn invalidate(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

/// The unified list engine, parameterized by record type.
pub struct ListEngine<T: Ranked> {
    gateway: Arc<dyn RemoteGateway<T>>,
    store: RecordStore<T>,
    selection: SelectionManager,
    pager: Pager,
    state: LoadState,
    busy: bool,
    epoch: FetchEpoch,
    filter: Option<String>,
}

impl<T: Ranked> ListEngine<T> {
    pub fn new(
        gateway: Arc<dyn RemoteGateway<T>>,
        order: RankOrder,
        strategy: PageStrategy,
        page_size: u32,
    ) -> Self {
        Self {
            gateway,
            store: RecordStore::new(order),
            selection: SelectionManager::new(),
            pager: Pager::new(strategy, page_size),
            state: LoadState::Idle,
            busy: false,
            epoch: FetchEpoch::default(),
            filter: None,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn page_window(&self) -> PageWindow {
        self.pager.window()
    }

    pub fn epoch_handle(&self) -> FetchEpoch {
        self.epoch.clone()
    }

    /// All records currently in memory: the full list under client slicing,
    /// the fetched window under server pagination.
    pub fn records(&self) -> &[T] {
        self.store.records()
    }

    /// The rows the current page renders.
    pub fn visible(&self) -> &[T] {
        let range = self.pager.visible_range(self.store.len());
        &self.store.records()[range]
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.selection.ids()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.is_selected(id)
    }

    // ---- fetch / pagination -------------------------------------------

    pub async fn load(&mut self) -> Result<()> {
        self.refetch().await
    }

    /// Apply a new search filter; resets to page 1 and refetches.
    pub async fn search(&mut self, filter: Option<String>) -> Result<()> {
        self.filter = filter;
        self.pager.set_page(1);
        self.refetch().await
    }

    /// Switch pages. Server-paginated screens fetch the new window; client
    /// sliced screens move locally with no network call. Either way the
    /// visible set changes, so the selection is dropped.
    pub async fn change_page(&mut self, page: u32) -> Result<()> {
        let total_pages = self.pager.total_pages();
        if page == 0 || (total_pages > 0 && page > total_pages) {
            return Err(EngineError::IndexOutOfRange {
                index: page as usize,
                len: total_pages as usize,
            });
        }
        self.pager.set_page(page);
        match self.pager.strategy() {
            PageStrategy::RemoteWindow => self.refetch().await,
            PageStrategy::ClientSlice => {
                self.selection.clear();
                Ok(())
            }
        }
    }

    /// Discard any in-flight fetch and return to the pristine state, as on
    /// unmount/navigation.
    pub fn reset(&mut self) {
        self.epoch.invalidate();
        self.store.load(Vec::new());
        self.selection.clear();
        self.pager.set_page(1);
        self.filter = None;
        self.state = LoadState::Idle;
        self.busy = false;
    }

    /// Re-read authoritative state from the remote store.
    ///
    /// This is the universal recovery path: every mutation ends here
    /// whether it succeeded or failed. A result arriving after the epoch
    /// moved on is discarded.
    async fn refetch(&mut self) -> Result<()> {
        let ticket = self.epoch.begin();
        self.state = LoadState::Loading;
        let query = match self.pager.strategy() {
            PageStrategy::RemoteWindow => ListQuery {
                page: self.pager.page(),
                page_size: self.pager.page_size(),
                filter: self.filter.clone(),
            },
            // page_size 0 asks for the entire matching collection
            PageStrategy::ClientSlice => ListQuery {
                page: 1,
                page_size: 0,
                filter: self.filter.clone(),
            },
        };
        debug!(
            "[ListEngine] fetch: page={} page_size={} filter={:?}",
            query.page, query.page_size, query.filter
        );
        let gateway = Arc::clone(&self.gateway);
        let result = gateway.list(&query).await;
        if self.epoch.current() != ticket {
            debug!("[ListEngine] discarding stale fetch result");
            return Ok(());
        }
        match result {
            Ok(ListPayload::Window {
                items,
                total_items,
                total_pages,
                current_page,
            }) => {
                self.store.load(items);
                self.pager.apply_remote(total_items, total_pages, current_page);
            }
            Ok(ListPayload::Full(items)) => {
                self.store.load(items);
                let total = self.store.len();
                self.pager.apply_client(total);
            }
            Err(e) => {
                error!("[ListEngine] fetch failed: {e}");
                self.state = LoadState::LoadError(e.to_string());
                return Err(e);
            }
        }
        self.selection.clear();
        self.state = LoadState::Loaded;
        Ok(())
    }

    // ---- reordering ---------------------------------------------------

    /// Swap the row with its predecessor in the full ordering. No-op at the
    /// top of the list; no network call is issued for a no-op.
    pub async fn move_up(&mut self, row: usize) -> Result<()> {
        self.move_row(row, Direction::Up).await
    }

    /// Swap the row with its successor in the full ordering. No-op at the
    /// bottom of the list.
    pub async fn move_down(&mut self, row: usize) -> Result<()> {
        self.move_row(row, Direction::Down).await
    }

    async fn move_row(&mut self, row: usize, direction: Direction) -> Result<()> {
        if self.busy {
            debug!("[ListEngine] move ignored while busy");
            return Ok(());
        }
        let store_idx = self.store_row_index(row)?;
        let absolute = self.pager.absolute_index(row);
        let total = match self.pager.strategy() {
            PageStrategy::ClientSlice => self.store.len(),
            PageStrategy::RemoteWindow => self.pager.total_items().max(self.store.len()),
        };
        // Boundaries are judged against the full ordering, not the page
        let target_abs = match direction {
            Direction::Up => {
                if absolute == 0 {
                    debug!("[ListEngine] move_up at top is a no-op");
                    return Ok(());
                }
                absolute - 1
            }
            Direction::Down => {
                if absolute + 1 >= total {
                    debug!("[ListEngine] move_down at bottom is a no-op");
                    return Ok(());
                }
                absolute + 1
            }
        };

        let current = self
            .store
            .get(store_idx)
            .ok_or(EngineError::IndexOutOfRange {
                index: store_idx,
                len: self.store.len(),
            })?;
        let id_a = current.id().to_string();
        let rank_a = current.rank();

        let window_offset = match self.pager.strategy() {
            PageStrategy::ClientSlice => 0,
            PageStrategy::RemoteWindow => self.pager.absolute_index(0),
        };
        let in_window =
            target_abs >= window_offset && target_abs < window_offset + self.store.len();

        let (id_b, rank_b) = if in_window {
            let neighbor_idx = target_abs - window_offset;
            let neighbor = self
                .store
                .get(neighbor_idx)
                .ok_or(EngineError::IndexOutOfRange {
                    index: neighbor_idx,
                    len: self.store.len(),
                })?;
            let pair = (neighbor.id().to_string(), neighbor.rank());
            // Optimistic: swap ranks and positions locally
            self.store.swap(store_idx, neighbor_idx)?;
            pair
        } else {
            // The neighbor lives in the adjacent window; fetch it once
            let neighbor = match self.fetch_adjacent_neighbor(direction).await? {
                Some(n) => n,
                None => {
                    debug!("[ListEngine] adjacent window empty, treating move as no-op");
                    return Ok(());
                }
            };
            let pair = (neighbor.id().to_string(), neighbor.rank());
            self.store.local_update(&id_a, |r| r.set_rank(pair.1))?;
            pair
        };

        self.busy = true;
        let result = self.persist_swap(&id_a, rank_b, &id_b, rank_a).await;
        self.busy = false;
        result
    }

    /// Fetch the adjacent page and return the neighbor record a cross-window
    /// swap targets: the last row of the previous window when moving up, the
    /// first row of the next window when moving down.
    async fn fetch_adjacent_neighbor(&self, direction: Direction) -> Result<Option<T>> {
        let page = match direction {
            Direction::Up => self.pager.page().saturating_sub(1).max(1),
            Direction::Down => self.pager.page() + 1,
        };
        let query = ListQuery {
            page,
            page_size: self.pager.page_size(),
            filter: self.filter.clone(),
        };
        debug!("[ListEngine] resolving swap neighbor from page {page}");
        let gateway = Arc::clone(&self.gateway);
        let payload = gateway.list(&query).await?;
        let items = payload.into_items();
        Ok(match direction {
            Direction::Up => items.into_iter().last(),
            Direction::Down => items.into_iter().next(),
        })
    }

    /// Issue the two rank updates of a swap concurrently, then refetch no
    /// matter how they landed. The two calls are one atomic unit for the UI
    /// but not for the remote store; the refetch is what makes it consistent.
    async fn persist_swap(
        &mut self,
        id_a: &str,
        new_rank_a: i64,
        id_b: &str,
        new_rank_b: i64,
    ) -> Result<()> {
        let gateway = Arc::clone(&self.gateway);
        let (res_a, res_b) = futures::join!(
            gateway.update_rank(id_a, new_rank_a),
            gateway.update_rank(id_b, new_rank_b),
        );
        let failures: Vec<EngineError> = [res_a.err(), res_b.err()].into_iter().flatten().collect();

        // Success absorbs server-side renormalization, failure discards the
        // optimistic swap; either way the fetch is mandatory.
        let refetch = self.refetch().await;

        match failures.len() {
            0 => refetch,
            1 => {
                let e = &failures[0];
                error!("[ListEngine] rank swap partially applied: {e}");
                Err(EngineError::consistency(format!(
                    "rank swap partially applied, 1 of 2 updates failed: {e}"
                )))
            }
            _ => {
                let e = failures.into_iter().next().unwrap_or_else(|| {
                    EngineError::network("rank swap failed")
                });
                error!("[ListEngine] rank swap failed: {e}");
                Err(e)
            }
        }
    }

    // ---- bulk rank editing --------------------------------------------

    /// Free-form local rank edit; no network call, no uniqueness check.
    pub fn set_rank(&mut self, row: usize, rank: i64) -> Result<()> {
        let store_idx = self.store_row_index(row)?;
        self.store.set_rank_at(store_idx, rank)
    }

    /// Persist every rank that differs from the baseline, concurrently and
    /// fail-fast. Calls already in flight when one fails are not cancelled
    /// and may still apply remotely; the follow-up refetch adopts whatever
    /// the store now holds.
    pub async fn save_all(&mut self) -> Result<SaveOutcome> {
        if self.busy {
            debug!("[ListEngine] save_all ignored while busy");
            return Ok(SaveOutcome::NothingToSave);
        }
        let diff = self.store.rank_diff();
        if diff.is_empty() {
            info!("[ListEngine] save_all: nothing to save");
            return Ok(SaveOutcome::NothingToSave);
        }
        self.busy = true;
        let result = self.persist_diff(diff).await;
        self.busy = false;
        result
    }

    async fn persist_diff(&mut self, diff: Vec<(String, i64)>) -> Result<SaveOutcome> {
        let attempted = diff.len();
        info!("[ListEngine] save_all: persisting {attempted} rank changes");
        let mut handles = Vec::with_capacity(attempted);
        for (id, rank) in diff {
            let gateway = Arc::clone(&self.gateway);
            handles.push(tokio::spawn(
                async move { gateway.update_rank(&id, rank).await },
            ));
        }

        let mut first_failure: Option<EngineError> = None;
        for handle in handles {
            match handle.await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    // Fail fast: report the first rejection, leave the rest running
                    first_failure = Some(e);
                    break;
                }
                Err(e) => {
                    first_failure = Some(EngineError::network(format!("update task aborted: {e}")));
                    break;
                }
            }
        }

        let refetch = self.refetch().await;

        match first_failure {
            None => {
                refetch?;
                Ok(SaveOutcome::Saved { updated: attempted })
            }
            Some(e) if attempted == 1 => {
                error!("[ListEngine] save failed: {e}");
                Err(e)
            }
            Some(e) => {
                error!("[ListEngine] bulk save aborted: {e}");
                Err(EngineError::consistency(format!(
                    "bulk save aborted after a failed update ({e}); some of {attempted} updates may have been applied"
                )))
            }
        }
    }

    // ---- selection ----------------------------------------------------

    pub fn toggle(&mut self, id: &str) -> Result<()> {
        if !self.visible().iter().any(|r| r.id() == id) {
            return Err(EngineError::RecordNotFound { id: id.to_string() });
        }
        self.selection.toggle(id);
        Ok(())
    }

    pub fn select_all(&mut self, checked: bool) {
        let ids: Vec<String> = self.visible().iter().map(|r| r.id().to_string()).collect();
        self.selection
            .select_all(checked, ids.iter().map(String::as_str));
    }

    pub fn header_state(&self) -> HeaderState {
        self.selection
            .header_state(self.visible().iter().map(|r| r.id()))
    }

    // ---- deletion -----------------------------------------------------

    pub async fn delete_one(&mut self, id: &str) -> Result<DeleteOutcome> {
        self.delete_many(vec![id.to_string()]).await
    }

    /// Delete records concurrently, fail-soft: every call settles on its
    /// own and the outcomes are tallied. The refetch and the selection
    /// clear happen unconditionally; a failed refetch is reflected in the
    /// load state rather than the returned aggregate.
    pub async fn delete_many(&mut self, ids: Vec<String>) -> Result<DeleteOutcome> {
        if self.busy {
            debug!("[ListEngine] delete ignored while busy");
            return Ok(DeleteOutcome::default());
        }
        if ids.is_empty() {
            return Ok(DeleteOutcome::default());
        }
        self.busy = true;

        let gateway = Arc::clone(&self.gateway);
        let calls = ids.iter().map(|id| {
            let gateway = Arc::clone(&gateway);
            let id = id.clone();
            async move { gateway.delete(&id).await }
        });
        let results = futures::future::join_all(calls).await;
        let failed = results.iter().filter(|r| r.is_err()).count();
        let outcome = DeleteOutcome {
            succeeded: results.len() - failed,
            failed,
        };
        if failed > 0 {
            error!(
                "[ListEngine] delete: {failed} of {} calls failed",
                results.len()
            );
        }

        if let Err(e) = self.refetch().await {
            error!("[ListEngine] refresh after delete failed: {e}");
        }
        self.selection.clear();
        self.busy = false;
        Ok(outcome)
    }

    /// Delete everything currently selected.
    pub async fn delete_selected(&mut self) -> Result<DeleteOutcome> {
        let ids = self.selection.ids();
        self.delete_many(ids).await
    }

    // ---- creation -----------------------------------------------------

    /// Create a record through the gateway, then resynchronize. The created
    /// record is returned even when the follow-up fetch fails; the load
    /// state carries that failure. While another mutation is in flight the
    /// call is skipped and the payload comes back unpersisted.
    pub async fn create(&mut self, payload: T) -> Result<T> {
        if self.busy {
            debug!("[ListEngine] create ignored while busy");
            return Ok(payload);
        }
        self.busy = true;
        let gateway = Arc::clone(&self.gateway);
        let created = match gateway.create(payload).await {
            Ok(created) => created,
            Err(e) => {
                self.busy = false;
                return Err(e);
            }
        };
        if let Err(e) = self.refetch().await {
            error!("[ListEngine] refresh after create failed: {e}");
        }
        self.busy = false;
        Ok(created)
    }

    // ---- helpers ------------------------------------------------------

    /// Map a visible row index to an index into the store.
    fn store_row_index(&self, row: usize) -> Result<usize> {
        match self.pager.strategy() {
            PageStrategy::RemoteWindow => {
                let len = self.store.len();
                if row >= len {
                    return Err(EngineError::IndexOutOfRange { index: row, len });
                }
                Ok(row)
            }
            PageStrategy::ClientSlice => {
                let range = self.pager.visible_range(self.store.len());
                let absolute = self.pager.absolute_index(row);
                if !range.contains(&absolute) {
                    return Err(EngineError::IndexOutOfRange {
                        index: row,
                        len: range.len(),
                    });
                }
                Ok(absolute)
            }
        }
    }
}

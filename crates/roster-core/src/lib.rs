//! Generic ordered-collection synchronization engine.
//!
//! Eight admin screens used to reimplement the same list mechanics: swap
//! based reordering with paired persistence, diff based bulk rank saves,
//! multi-select with select-all semantics, partial-failure-tolerant bulk
//! delete, and two pagination strategies. This crate collapses them into
//! one engine parameterized by record type:
//! - [`RecordStore`] holds the fetched list plus an immutable baseline
//!   snapshot for diffing,
//! - [`SelectionManager`] owns the multi-select set,
//! - [`Pager`] covers both server-paginated windows and full-fetch client
//!   slicing behind one absolute-index translation,
//! - [`ListEngine`] wires them to a [`RemoteGateway`] and implements the
//!   mutation flows, each ending in a refetch-to-resync.

pub mod engine;
pub mod paging;
pub mod selection;
pub mod store;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use engine::{DeleteOutcome, FetchEpoch, ListEngine, LoadState, SaveOutcome};
pub use paging::{PageStrategy, Pager};
pub use selection::{HeaderState, SelectionManager};
pub use store::RecordStore;

// Re-export the shared vocabulary so screens depend on one crate
pub use roster_api::{
    to_absolute_index, EngineError, ListPayload, ListQuery, PageWindow, RankOrder, Ranked,
    RemoteGateway, Result,
};

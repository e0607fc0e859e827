//! Shared vocabulary for the roster list-synchronization engine.
//!
//! This crate defines the seam between the generic engine (`roster-core`)
//! and the per-resource remote clients (`roster-rest`):
//! - the [`Ranked`] capability any domain record must satisfy,
//! - the [`RankOrder`] comparator conventions,
//! - page-window types and the absolute-index translation,
//! - the [`RemoteGateway`] trait the engine drives,
//! - the [`EngineError`] taxonomy surfaced to screens.

pub mod error;
pub mod gateway;
pub mod page;
pub mod record;

pub use error::{EngineError, Result};
pub use gateway::{ListPayload, ListQuery, RemoteGateway};
pub use page::{to_absolute_index, PageWindow};
pub use record::{RankOrder, Ranked};

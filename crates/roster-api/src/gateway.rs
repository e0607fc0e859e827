//! The remote CRUD seam the engine drives.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::Ranked;

/// Parameters for a list fetch. The filter is an opaque search string the
/// remote store interprets; the engine only carries it. A `page_size` of 0
/// asks for the entire matching collection in one response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub filter: Option<String>,
}

/// What a list fetch returns.
///
/// Server-paginated resources answer with a page envelope; full-fetch
/// resources answer with a bare array. Both shapes deserialize from the
/// same wire payload (untagged).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Window {
        items: Vec<T>,
        total_items: usize,
        total_pages: u32,
        current_page: u32,
    },
    Full(Vec<T>),
}

impl<T> ListPayload<T> {
    pub fn items(&self) -> &[T] {
        match self {
            ListPayload::Window { items, .. } => items,
            ListPayload::Full(items) => items,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            ListPayload::Window { items, .. } => items,
            ListPayload::Full(items) => items,
        }
    }
}

/// Per-resource CRUD client consumed by the engine.
///
/// One implementation exists per resource type (banners, guideline posts,
/// casino companies, recommendation bundles, remittance partners). The
/// engine treats every implementation identically.
#[async_trait]
pub trait RemoteGateway<T>: Send + Sync
where
    T: Ranked,
{
    async fn list(&self, query: &ListQuery) -> Result<ListPayload<T>>;

    /// Persist a single record's rank; returns the updated record.
    async fn update_rank(&self, id: &str, rank: i64) -> Result<T>;

    async fn create(&self, payload: T) -> Result<T>;

    async fn delete(&self, id: &str) -> Result<()>;
}

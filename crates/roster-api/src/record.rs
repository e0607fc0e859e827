//! Record capability and ordering conventions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Records that carry a display rank.
///
/// Any domain payload (banner, article, catalog entry, ...) satisfying this
/// capability plugs into the engine; the engine never looks at the rest of
/// the payload.
pub trait Ranked: Clone + Send + Sync + 'static {
    /// Unique identifier. Empty means the record has not been persisted yet.
    fn id(&self) -> &str;

    /// Integer position field determining the record's place in the list.
    fn rank(&self) -> i64;

    fn set_rank(&mut self, rank: i64);

    /// Creation timestamp, used only as the ordering tie-break.
    fn created_at(&self) -> DateTime<Utc>;

    fn is_persisted(&self) -> bool {
        !self.id().is_empty()
    }
}

/// Screen-configured ordering convention.
///
/// Some screens sort rank ascending, others descending; both exist in the
/// wild and are preserved per screen rather than unified. The tie-break is
/// `created_at` descending in both conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankOrder {
    Ascending,
    Descending,
}

impl RankOrder {
    pub fn compare<T: Ranked>(&self, a: &T, b: &T) -> Ordering {
        let by_rank = match self {
            RankOrder::Ascending => a.rank().cmp(&b.rank()),
            RankOrder::Descending => b.rank().cmp(&a.rank()),
        };
        // Newest first among equal ranks
        by_rank.then_with(|| b.created_at().cmp(&a.created_at()))
    }
}

//! Wire types for the admin console's JSON contract.

use serde::{Deserialize, Serialize};

/// Body of `PATCH /{resource}/{id}/rank`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RankPatch {
    pub rank: i64,
}

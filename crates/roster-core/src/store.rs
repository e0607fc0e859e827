//! In-memory record list with fetch baseline and dirty marks.

use std::collections::{HashMap, HashSet};

use roster_api::{EngineError, RankOrder, Ranked, Result};

/// Holds the current ordered list and an immutable snapshot of the ranks as
/// of the last successful fetch.
///
/// The baseline is keyed by id, replaced wholesale on every [`load`], and
/// never touched by local edits; it exists only so a bulk save can compute
/// which records actually changed.
///
/// [`load`]: RecordStore::load
pub struct RecordStore<T: Ranked> {
    order: RankOrder,
    records: Vec<T>,
    baseline: HashMap<String, i64>,
    dirty: HashSet<String>,
}

impl<T: Ranked> RecordStore<T> {
    pub fn new(order: RankOrder) -> Self {
        Self {
            order,
            records: Vec::new(),
            baseline: HashMap::new(),
            dirty: HashSet::new(),
        }
    }

    pub fn order(&self) -> RankOrder {
        self.order
    }

    /// Replace the list and the baseline with a fresh fetch result.
    ///
    /// Applies the configured comparator; the incoming order is not trusted.
    pub fn load(&mut self, mut records: Vec<T>) {
        records.sort_by(|a, b| self.order.compare(a, b));
        self.baseline = records
            .iter()
            .map(|r| (r.id().to_string(), r.rank()))
            .collect();
        self.dirty.clear();
        self.records = records;
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.records.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    /// Mutate one record in memory only, marking it dirty relative to the
    /// baseline. The baseline itself is untouched.
    pub fn local_update(&mut self, id: &str, patch: impl FnOnce(&mut T)) -> Result<()> {
        let index = self
            .index_of(id)
            .ok_or_else(|| EngineError::RecordNotFound { id: id.to_string() })?;
        patch(&mut self.records[index]);
        self.dirty.insert(id.to_string());
        Ok(())
    }

    /// Set the rank of the record at `index` in memory only.
    ///
    /// No uniqueness or contiguity validation: transient duplicate or
    /// out-of-order ranks are permitted between edits.
    pub fn set_rank_at(&mut self, index: usize, rank: i64) -> Result<()> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(EngineError::IndexOutOfRange { index, len })?;
        record.set_rank(rank);
        let id = record.id().to_string();
        self.dirty.insert(id);
        Ok(())
    }

    /// Optimistically swap two records: their rank values and their
    /// positions in the list. Both are marked dirty.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        let len = self.records.len();
        if a >= len {
            return Err(EngineError::IndexOutOfRange { index: a, len });
        }
        if b >= len {
            return Err(EngineError::IndexOutOfRange { index: b, len });
        }
        let rank_a = self.records[a].rank();
        let rank_b = self.records[b].rank();
        self.records[a].set_rank(rank_b);
        self.records[b].set_rank(rank_a);
        self.dirty.insert(self.records[a].id().to_string());
        self.dirty.insert(self.records[b].id().to_string());
        self.records.swap(a, b);
        Ok(())
    }

    pub fn is_dirty(&self, id: &str) -> bool {
        self.dirty.contains(id)
    }

    /// Records whose rank differs from the baseline, in list order.
    ///
    /// Records the baseline does not know (should not happen between a
    /// fetch and a save) count as changed.
    pub fn rank_diff(&self) -> Vec<(String, i64)> {
        self.records
            .iter()
            .filter(|r| self.baseline.get(r.id()) != Some(&r.rank()))
            .map(|r| (r.id().to_string(), r.rank()))
            .collect()
    }

    pub fn baseline_rank(&self, id: &str) -> Option<i64> {
        self.baseline.get(id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestRecord;
    use proptest::prelude::*;

    fn store_with(ranks: &[i64]) -> RecordStore<TestRecord> {
        let mut store = RecordStore::new(RankOrder::Ascending);
        store.load(
            ranks
                .iter()
                .enumerate()
                .map(|(i, &rank)| TestRecord::new(&format!("r{i}"), rank))
                .collect(),
        );
        store
    }

    #[test]
    fn load_sorts_and_snapshots_baseline() {
        let store = store_with(&[3, 1, 2]);
        let ranks: Vec<i64> = store.records().iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert_eq!(store.baseline_rank("r0"), Some(3));
        assert!(store.rank_diff().is_empty());
    }

    #[test]
    fn local_update_marks_dirty_but_not_baseline() {
        let mut store = store_with(&[1, 2, 3]);
        store.local_update("r0", |r| r.set_rank(9)).unwrap();
        assert!(store.is_dirty("r0"));
        assert_eq!(store.baseline_rank("r0"), Some(1));
        assert_eq!(store.rank_diff(), vec![("r0".to_string(), 9)]);
    }

    #[test]
    fn local_update_unknown_id_is_rejected() {
        let mut store = store_with(&[1]);
        let err = store.local_update("nope", |r| r.set_rank(9)).unwrap_err();
        assert!(matches!(err, EngineError::RecordNotFound { .. }));
    }

    #[test]
    fn setting_rank_back_to_baseline_leaves_no_diff() {
        let mut store = store_with(&[1, 2]);
        store.set_rank_at(0, 7).unwrap();
        store.set_rank_at(0, 1).unwrap();
        // Dirty mark stays, but the diff is rank-based
        assert!(store.is_dirty("r0"));
        assert!(store.rank_diff().is_empty());
    }

    #[test]
    fn duplicate_ranks_are_permitted_locally() {
        let mut store = store_with(&[1, 2, 3]);
        store.set_rank_at(0, 2).unwrap();
        assert_eq!(store.rank_diff().len(), 1);
    }

    #[test]
    fn swap_exchanges_ranks_and_positions() {
        let mut store = store_with(&[1, 2, 3]);
        let before: Vec<String> = store.records().iter().map(|r| r.id.clone()).collect();
        store.swap(0, 1).unwrap();
        assert_eq!(store.records()[0].id, before[1]);
        assert_eq!(store.records()[0].rank, 1);
        assert_eq!(store.records()[1].id, before[0]);
        assert_eq!(store.records()[1].rank, 2);
    }

    #[test]
    fn swap_out_of_range_is_rejected() {
        let mut store = store_with(&[1, 2]);
        assert!(matches!(
            store.swap(0, 5),
            Err(EngineError::IndexOutOfRange { index: 5, len: 2 })
        ));
    }

    proptest! {
        #[test]
        fn swap_twice_restores_the_list(ranks in proptest::collection::vec(0i64..100, 2..20),
                                        a in 0usize..20, b in 0usize..20) {
            let mut store = store_with(&ranks);
            let a = a % store.len();
            let b = b % store.len();
            let before: Vec<(String, i64)> = store
                .records()
                .iter()
                .map(|r| (r.id.clone(), r.rank))
                .collect();
            store.swap(a, b).unwrap();
            store.swap(a, b).unwrap();
            let after: Vec<(String, i64)> = store
                .records()
                .iter()
                .map(|r| (r.id.clone(), r.rank))
                .collect();
            prop_assert_eq!(before, after);
        }

        #[test]
        fn load_is_idempotent(ranks in proptest::collection::vec(0i64..100, 0..20)) {
            let mut store = store_with(&ranks);
            let once: Vec<String> = store.records().iter().map(|r| r.id.clone()).collect();
            let records = store.records().to_vec();
            store.load(records);
            let twice: Vec<String> = store.records().iter().map(|r| r.id.clone()).collect();
            prop_assert_eq!(once, twice);
        }
    }
}

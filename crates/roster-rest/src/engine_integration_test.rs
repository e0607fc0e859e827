//! End-to-end tests: the generic engine driving a fake resource backend.

use std::sync::Arc;

use roster_api::{RankOrder, RemoteGateway};
use roster_core::testing::TestRecord;
use roster_core::{ListEngine, PageStrategy};

use crate::fake::FakeResource;

fn records(n: usize) -> Vec<TestRecord> {
    (0..n)
        .map(|i| TestRecord::new(&format!("r{i}"), i as i64 + 1))
        .collect()
}

fn ids(records: &[TestRecord]) -> Vec<String> {
    records.iter().map(|r| r.id.clone()).collect()
}

fn gappy() -> Vec<TestRecord> {
    vec![
        TestRecord::new("a", 10),
        TestRecord::new("b", 20),
        TestRecord::new("c", 30),
        TestRecord::new("d", 40),
    ]
}

#[tokio::test]
async fn refetch_absorbs_server_side_renormalization() {
    let fake = Arc::new(
        FakeResource::client_sliced(RankOrder::Ascending, gappy()).with_renormalization(),
    );
    let mut engine = ListEngine::new(
        fake.clone() as Arc<dyn RemoteGateway<TestRecord>>,
        RankOrder::Ascending,
        PageStrategy::ClientSlice,
        10,
    );
    engine.load().await.unwrap();

    // Move "a" between c and d; the backend compacts the gappy ranks and
    // the refetch adopts the compacted values
    engine.set_rank(0, 35).unwrap();
    engine.save_all().await.unwrap();

    assert_eq!(ids(engine.records()), vec!["b", "c", "a", "d"]);
    let ranks: Vec<i64> = engine.records().iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn refetch_adopts_the_renormalized_order_over_the_optimistic_swap() {
    let fake = Arc::new(
        FakeResource::client_sliced(RankOrder::Ascending, gappy()).with_renormalization(),
    );
    let mut engine = ListEngine::new(
        fake.clone() as Arc<dyn RemoteGateway<TestRecord>>,
        RankOrder::Ascending,
        PageStrategy::ClientSlice,
        10,
    );
    engine.load().await.unwrap();

    engine.move_down(0).await.unwrap();

    // The swap's two updates each triggered a compaction: the first ties
    // a and b and the tie resolves by creation time, the second re-sorts
    // around b's new rank. The backend ends up ordered a,c,d,b, not the
    // optimistic local swap, and the refetch takes the backend's word.
    assert_eq!(ids(engine.records()), vec!["a", "c", "d", "b"]);
    let ranks: Vec<i64> = engine.records().iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn paginated_screen_flow_select_and_delete() {
    let fake = Arc::new(FakeResource::server_paginated(
        RankOrder::Ascending,
        records(25),
    ));
    let mut engine = ListEngine::new(
        fake.clone() as Arc<dyn RemoteGateway<TestRecord>>,
        RankOrder::Ascending,
        PageStrategy::RemoteWindow,
        10,
    );
    engine.load().await.unwrap();
    engine.change_page(2).await.unwrap();
    assert_eq!(engine.visible().len(), 10);

    engine.select_all(true);
    assert!(engine.header_state().checked);

    let outcome = engine.delete_selected().await.unwrap();
    assert_eq!(outcome.succeeded, 10);
    assert_eq!(outcome.failed, 0);
    assert!(engine.selected_ids().is_empty());
    assert_eq!(engine.page_window().total_items, 15);
}

#[tokio::test]
async fn descending_screens_keep_their_convention() {
    let fake = Arc::new(FakeResource::client_sliced(
        RankOrder::Descending,
        records(3),
    ));
    let mut engine = ListEngine::new(
        fake.clone() as Arc<dyn RemoteGateway<TestRecord>>,
        RankOrder::Descending,
        PageStrategy::ClientSlice,
        10,
    );
    engine.load().await.unwrap();

    // Highest rank renders first
    assert_eq!(ids(engine.visible()), vec!["r2", "r1", "r0"]);

    engine.move_down(0).await.unwrap();
    assert_eq!(ids(engine.visible()), vec!["r1", "r2", "r0"]);
    assert_eq!(fake.rank_of("r1"), Some(3));
    assert_eq!(fake.rank_of("r2"), Some(2));
}

#[tokio::test]
async fn create_lands_in_the_refetched_list() {
    let fake = Arc::new(FakeResource::client_sliced(
        RankOrder::Ascending,
        records(2),
    ));
    let mut engine = ListEngine::new(
        fake.clone() as Arc<dyn RemoteGateway<TestRecord>>,
        RankOrder::Ascending,
        PageStrategy::ClientSlice,
        10,
    );
    engine.load().await.unwrap();

    engine.create(TestRecord::new("fresh", 99)).await.unwrap();

    assert_eq!(engine.records().len(), 3);
    assert_eq!(engine.records().last().map(|r| r.id.clone()), Some("fresh".into()));
}

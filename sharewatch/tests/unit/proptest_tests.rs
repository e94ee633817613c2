//! Property-based tests using proptest

use std::collections::BTreeSet;

use futures::stream;
use proptest::prelude::*;

use sharewatch::common::types::{ContinuityStatus, Epoch};
use sharewatch::probe::check_sequence;

fn check(epochs: &[Epoch]) -> ContinuityStatus {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    rt.block_on(check_sequence(stream::iter(
        epochs.iter().copied().map(Ok).collect::<Vec<_>>(),
    )))
    .expect("in-memory sequence never errors")
}

/// 開始エポック以上を昇順・重複なしにした列
fn filtered(epochs: &BTreeSet<Epoch>, start: Epoch) -> Vec<Epoch> {
    epochs.range(start..).copied().collect()
}

fn is_consecutive(epochs: &[Epoch]) -> bool {
    epochs.windows(2).all(|w| w[1] == w[0] + 1)
}

// ---------------------------------------------------------------------------
// check_sequence
// ---------------------------------------------------------------------------

proptest! {
    /// 連続判定は「最小値から欠番なし」と一致する
    #[test]
    fn continuity_matches_definition(
        epochs in prop::collection::btree_set(0i64..200, 0..60),
        start in 0i64..200,
    ) {
        let seq = filtered(&epochs, start);
        let status = check(&seq);
        prop_assert_eq!(status.is_continuous(), is_consecutive(&seq));
    }

    /// 空の列は NoData（連続扱い）
    #[test]
    fn empty_after_start_is_no_data(
        epochs in prop::collection::btree_set(0i64..100, 0..30),
    ) {
        let seq = filtered(&epochs, 100);
        prop_assert_eq!(check(&seq), ContinuityStatus::NoData);
    }

    /// 任意の区間は連続で、first/last/count が一致する
    #[test]
    fn ranges_are_continuous(first in 0i64..1_000_000, len in 1u64..500) {
        let seq: Vec<Epoch> = (first..first + len as i64).collect();
        prop_assert_eq!(
            check(&seq),
            ContinuityStatus::Continuous { first, last: first + len as i64 - 1, count: len }
        );
    }

    /// 区間から1つ抜くと、その直前の値で欠番が報告される
    #[test]
    fn removed_element_is_reported_as_first_gap(
        first in 0i64..1_000,
        len in 3i64..200,
        hole_offset in 1i64..199,
    ) {
        prop_assume!(hole_offset < len - 1);
        let hole = first + hole_offset;
        let seq: Vec<Epoch> = (first..first + len).filter(|e| *e != hole).collect();
        prop_assert_eq!(
            check(&seq),
            ContinuityStatus::Gap { previous: hole - 1, found: hole + 1 }
        );
    }
}

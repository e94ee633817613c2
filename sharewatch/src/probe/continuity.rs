//! 連続性チェッカー
//!
//! 昇順のエポック列を先頭から走査し、直前の値 + 1 でない値が現れた時点で欠番と判定する。

use futures::stream::{Stream, StreamExt};

use crate::common::error::ProbeResult;
use crate::common::types::{ContinuityStatus, Epoch, Project};
use crate::db::SharesStore;

/// プロジェクトのシェアテーブルを `start` から検査する
pub async fn check_continuity(
    store: &dyn SharesStore,
    project: Project,
    start: Epoch,
) -> ProbeResult<ContinuityStatus> {
    check_sequence(store.epochs_from(project, start)).await
}

/// 昇順・重複なしのエポック列が連続しているか判定する
///
/// 欠番を見つけたら残りを読まずに返す（ストリームはここでdropされる）。
/// 空の列は `NoData`。
pub async fn check_sequence<S>(epochs: S) -> ProbeResult<ContinuityStatus>
where
    S: Stream<Item = ProbeResult<Epoch>>,
{
    futures::pin_mut!(epochs);

    let mut first: Option<Epoch> = None;
    let mut previous: Option<Epoch> = None;
    let mut count: u64 = 0;

    while let Some(current) = epochs.next().await {
        let current = current?;
        if let Some(previous) = previous {
            if previous.checked_add(1) != Some(current) {
                return Ok(ContinuityStatus::Gap {
                    previous,
                    found: current,
                });
            }
        }
        first.get_or_insert(current);
        previous = Some(current);
        count += 1;
    }

    Ok(match (first, previous) {
        (Some(first), Some(last)) => ContinuityStatus::Continuous { first, last, count },
        _ => ContinuityStatus::NoData,
    })
}

//! Repository traitパターン定義
//!
//! DB操作を抽象化し、プローブループをフェイク実装でテストできるようにするtrait群。

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::common::error::ProbeResult;
use crate::common::types::{Epoch, Project};

// ---------------------------------------------------------------------------
// EpochSource
// ---------------------------------------------------------------------------

/// distributorから開始エポックを読むtrait
#[async_trait]
pub trait EpochSource: Send + Sync {
    /// プロジェクトの `max(max_epoch)` を取得
    ///
    /// 該当行がなければ `ProbeError::NotFound`。
    async fn max_epoch(&self, project: Project) -> ProbeResult<Epoch>;
}

// ---------------------------------------------------------------------------
// SharesStore
// ---------------------------------------------------------------------------

/// シェアテーブルのエポック列を読むtrait
pub trait SharesStore: Send + Sync {
    /// `start` 以上の異なるエポック番号を昇順で返すストリーム
    ///
    /// ストリームは途中でdropしてよい。dropでカーソルが解放される。
    fn epochs_from(&self, project: Project, start: Epoch) -> BoxStream<'_, ProbeResult<Epoch>>;
}

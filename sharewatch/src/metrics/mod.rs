//! メトリクス公開
//!
//! 連続性の結果をゲージとして外部の集約先へ送る。

use async_trait::async_trait;

use crate::common::error::ProbeResult;
use crate::common::types::Gauge;

/// Pushgateway実装
pub mod pushgateway;

pub use pushgateway::PushgatewayPublisher;

/// ゲージの送信先
#[async_trait]
pub trait MetricPublisher: Send + Sync {
    /// ゲージを1本送信する
    ///
    /// 失敗しても呼び出し側はサイクルを中断しない。
    async fn push(&self, gauge: &Gauge) -> ProbeResult<()>;
}

//! プローブ初期化ロジック
//!
//! 3つのデータベース接続とPushgatewayクライアントを用意し、`ContinuityProbe` を組み立てる。
//! 起動時に接続できないデータベースがあればエラーを返す（呼び出し側で終了する）。

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::common::types::Project;
use crate::config::ProbeConfig;
use crate::db::{self, DistributorStore, SharesDb, SharesStore};
use crate::metrics::PushgatewayPublisher;
use crate::probe::{ContinuityProbe, ProbeContext};

/// 設定からプローブを構築する
pub async fn initialize(config: &ProbeConfig) -> anyhow::Result<ContinuityProbe> {
    info!("sharewatch v{}", env!("CARGO_PKG_VERSION"));
    config.validate()?;

    let connect_timeout = config.timeouts.connect;
    let oula = db::connect("oula", &config.oula_dsn, connect_timeout)
        .await
        .context("Failed to connect to Oula database")?;

    let publisher = PushgatewayPublisher::new(&config.pushgateway_url, config.timeouts.push)?;
    info!(
        pushgateway = %config.pushgateway_url,
        instance = ?config.instance,
        "Pushgateway publisher ready"
    );

    let mut shares = Vec::with_capacity(Project::ALL.len());
    for project in Project::ALL {
        let pool = db::connect(project.job(), config.shares_dsn(project), connect_timeout)
            .await
            .with_context(|| format!("Failed to connect to {project} shares database"))?;
        let store: Arc<dyn SharesStore> = Arc::new(SharesDb::new(pool));
        shares.push((project, store));
    }

    let ctx = ProbeContext {
        distributor: Arc::new(DistributorStore::new(oula)),
        shares,
        publisher: Arc::new(publisher),
        instance: config.instance.clone(),
    };

    Ok(ContinuityProbe::new(ctx, config.schedule).with_query_timeout(config.timeouts.query))
}

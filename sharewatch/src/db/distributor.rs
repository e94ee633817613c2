//! distributorテーブルのストレージ層
//!
//! プロジェクトごとの処理済み最大エポックを読み取る

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::EpochSource;
use crate::common::error::{ProbeError, ProbeResult};
use crate::common::types::{Epoch, Project};

const MAX_EPOCH_QUERY: &str = "SELECT max(max_epoch)::BIGINT FROM distributor WHERE project = $1";

/// distributorストレージ
#[derive(Clone)]
pub struct DistributorStore {
    pool: PgPool,
}

impl DistributorStore {
    /// 新しいストレージインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EpochSource for DistributorStore {
    async fn max_epoch(&self, project: Project) -> ProbeResult<Epoch> {
        let max_epoch = sqlx::query_scalar::<_, Option<i64>>(MAX_EPOCH_QUERY)
            .bind(project.distributor_key())
            .fetch_one(&self.pool)
            .await
            .map_err(ProbeError::from_sqlx)?;

        require_epoch(project, max_epoch)
    }
}

/// 集約結果がNULLなら `NotFound` にする（0を黙って返さない）
pub(crate) fn require_epoch(project: Project, max_epoch: Option<i64>) -> ProbeResult<Epoch> {
    max_epoch.ok_or(ProbeError::NotFound { project })
}

//! シェアテーブルのストレージ層

use futures::stream::{BoxStream, StreamExt};
use sqlx::PgPool;

use super::traits::SharesStore;
use crate::common::error::{ProbeError, ProbeResult};
use crate::common::types::{Epoch, Project};

/// プロジェクト別シェアDB
#[derive(Clone)]
pub struct SharesDb {
    pool: PgPool,
}

impl SharesDb {
    /// 新しいストレージインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SharesStore for SharesDb {
    fn epochs_from(&self, project: Project, start: Epoch) -> BoxStream<'_, ProbeResult<Epoch>> {
        // ストリームをdropするとカーソルと接続がプールへ返却される
        sqlx::query_scalar::<_, i64>(project.continuity_query())
            .bind(start)
            .fetch(&self.pool)
            .map(|row| row.map_err(ProbeError::from_sqlx))
            .boxed()
    }
}

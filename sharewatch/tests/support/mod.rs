//! テスト用のフェイクストア

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use sharewatch::common::error::{ProbeError, ProbeResult};
use sharewatch::common::types::{Epoch, Project};
use sharewatch::db::{EpochSource, SharesStore};

/// プロジェクトごとに固定の開始エポックを返すdistributor
#[derive(Default)]
pub struct StaticDistributor {
    epochs: HashMap<Project, Epoch>,
    pub calls: Mutex<usize>,
}

impl StaticDistributor {
    pub fn with_epoch(mut self, project: Project, epoch: Epoch) -> Self {
        self.epochs.insert(project, epoch);
        self
    }
}

#[async_trait]
impl EpochSource for StaticDistributor {
    async fn max_epoch(&self, project: Project) -> ProbeResult<Epoch> {
        *self.calls.lock().unwrap() += 1;
        self.epochs
            .get(&project)
            .copied()
            .ok_or(ProbeError::NotFound { project })
    }
}

/// メモリ上のシェアテーブル
pub struct MemoryShares(pub Vec<Epoch>);

impl SharesStore for MemoryShares {
    fn epochs_from(&self, _project: Project, start: Epoch) -> BoxStream<'_, ProbeResult<Epoch>> {
        let mut epochs: Vec<Epoch> = self.0.iter().copied().filter(|e| *e >= start).collect();
        epochs.sort_unstable();
        epochs.dedup();
        stream::iter(epochs.into_iter().map(Ok)).boxed()
    }
}

//! 連続性プローブ
//!
//! 一定間隔でプロジェクトごとに
//! 開始エポック取得 → 連続性チェック → ゲージ送信 を順に実行する。
//!
//! - あるプロジェクトの取得/チェック失敗はそのプロジェクトの残りのステップだけを飛ばす
//! - 送信失敗はログのみ（他プロジェクトには影響しない）
//! - 固定バックオフでは失敗したプロジェクトだけを1回リトライする（通常周期は変えない）
//! - ループ外へエラーは伝播しない

/// 連続性チェッカー
pub mod continuity;
/// サイクル結果
pub mod report;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{interval, sleep, timeout, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::common::error::{ProbeError, ProbeResult};
use crate::common::types::{ContinuityStatus, Gauge, Project};
use crate::config::{BackoffPolicy, ScheduleConfig};
use crate::db::{EpochSource, SharesStore};
use crate::metrics::MetricPublisher;
use crate::shutdown::ShutdownController;

pub use continuity::{check_continuity, check_sequence};
pub use report::{CycleReport, ProjectOutcome, Step, StepFailure};

/// デフォルトのクエリタイムアウト（秒）
const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

/// プローブが使う外部リソース一式
///
/// 接続はプロセス存続中ずっと保持され、ループからのみ使われる。
#[derive(Clone)]
pub struct ProbeContext {
    /// distributor（開始エポックの読み取り元）
    pub distributor: Arc<dyn EpochSource>,
    /// プロジェクトとそのシェアDB（この順にチェックする）
    pub shares: Vec<(Project, Arc<dyn SharesStore>)>,
    /// ゲージ送信先
    pub publisher: Arc<dyn MetricPublisher>,
    /// `instance` ラベル
    pub instance: Option<String>,
}

/// 連続性プローブ
#[derive(Clone)]
pub struct ContinuityProbe {
    ctx: ProbeContext,
    schedule: ScheduleConfig,
    query_timeout: Duration,
    shutdown: ShutdownController,
}

impl ContinuityProbe {
    /// 新しいプローブを作成
    pub fn new(ctx: ProbeContext, schedule: ScheduleConfig) -> Self {
        Self {
            ctx,
            schedule,
            query_timeout: Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
            shutdown: ShutdownController::default(),
        }
    }

    /// DB呼び出しごとのタイムアウトを設定
    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    /// シャットダウンコントローラーを差し替え
    pub fn with_shutdown(mut self, shutdown: ShutdownController) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// シャットダウンコントローラー
    pub fn shutdown(&self) -> &ShutdownController {
        &self.shutdown
    }

    /// 監視ループ
    ///
    /// 最初のサイクルは即時実行。シャットダウン要求は待機中にのみ確認する。
    pub async fn run(&self) {
        let mut timer = interval(self.schedule.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            interval_secs = self.schedule.interval.as_secs(),
            backoff = ?self.schedule.backoff,
            projects = self.ctx.shares.len(),
            "Continuity probe started"
        );

        loop {
            tokio::select! {
                _ = timer.tick() => {}
                _ = self.shutdown.wait() => break,
            }

            let mut report = self.run_cycle().await;

            if let BackoffPolicy::Fixed(delay) = self.schedule.backoff {
                if report.needs_retry() {
                    warn!(
                        retry_in_secs = delay.as_secs(),
                        failed = ?report.failed_projects(),
                        "Cycle had failed steps, retrying failed projects"
                    );
                    tokio::select! {
                        _ = sleep(delay) => {}
                        _ = self.shutdown.wait() => break,
                    }
                    // リトライは1回のみ。通常周期はそのまま維持する
                    self.retry_failed(&mut report).await;
                    if report.needs_retry() {
                        warn!(
                            failed = ?report.failed_projects(),
                            "Retry failed, waiting for next interval"
                        );
                    }
                }
            }

            info!("Cycle completed, waiting for next interval");
        }

        info!("Continuity probe stopped");
    }

    /// 全プロジェクトを1サイクル分チェック
    pub async fn run_cycle(&self) -> CycleReport {
        let started_at = Utc::now();
        info!("Starting new check cycle");

        let mut outcomes = Vec::with_capacity(self.ctx.shares.len());
        for (project, shares) in &self.ctx.shares {
            outcomes.push(self.check_project(*project, shares.as_ref()).await);
        }

        CycleReport {
            started_at,
            outcomes,
        }
    }

    /// 取得/チェックに失敗したプロジェクトだけを再実行し、結果を差し替える
    async fn retry_failed(&self, report: &mut CycleReport) {
        for outcome in report.outcomes.iter_mut().filter(|o| o.check_failed()) {
            let project = outcome.project;
            if let Some((_, shares)) = self.ctx.shares.iter().find(|(p, _)| *p == project) {
                *outcome = self.check_project(project, shares.as_ref()).await;
            }
        }
    }

    /// 単一プロジェクトのパイプライン
    async fn check_project(&self, project: Project, shares: &dyn SharesStore) -> ProjectOutcome {
        let mut outcome = ProjectOutcome::new(project);

        let start_epoch = match self
            .with_deadline("epoch read", self.ctx.distributor.max_epoch(project))
            .await
        {
            Ok(epoch) => epoch,
            Err(e) => {
                record_failure(&mut outcome, Step::EpochRead, &e);
                return outcome;
            }
        };
        info!(project = %project, start_epoch, "Fetched max epoch");
        outcome.start_epoch = Some(start_epoch);

        let status = match self
            .with_deadline(
                "continuity check",
                check_continuity(shares, project, start_epoch),
            )
            .await
        {
            Ok(status) => status,
            Err(e) => {
                record_failure(&mut outcome, Step::ContinuityCheck, &e);
                return outcome;
            }
        };
        outcome.status = Some(status);

        match status {
            ContinuityStatus::NoData => warn!(
                project = %project,
                start_epoch,
                table = project.shares_table(),
                "No shares at or above start epoch; reporting as continuous"
            ),
            ContinuityStatus::Gap { previous, found } => warn!(
                project = %project,
                start_epoch,
                previous,
                found,
                "Epoch gap detected"
            ),
            ContinuityStatus::Continuous { .. } => {
                info!(project = %project, status = %status, "Continuity status")
            }
        }

        let gauge = Gauge::continuity(project, &status, self.ctx.instance.as_deref());
        match self.ctx.publisher.push(&gauge).await {
            Ok(()) => {
                debug!(project = %project, value = gauge.value, "Metric published");
                outcome.published = true;
            }
            Err(e) => record_failure(&mut outcome, Step::Publish, &e),
        }

        outcome
    }

    async fn with_deadline<T, F>(&self, operation: &'static str, fut: F) -> ProbeResult<T>
    where
        F: Future<Output = ProbeResult<T>>,
    {
        timeout(self.query_timeout, fut)
            .await
            .map_err(|_| ProbeError::Timeout {
                operation,
                after: self.query_timeout,
            })?
    }
}

fn record_failure(outcome: &mut ProjectOutcome, step: Step, e: &ProbeError) {
    error!(
        project = %outcome.project,
        step = step.as_str(),
        kind = e.kind(),
        error = %e,
        "Probe step failed"
    );
    outcome.failures.push(StepFailure::new(step, e));
}

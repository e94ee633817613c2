//! サイクル結果
//!
//! `--once` の出力とバックオフ判定に使う。

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::common::error::ProbeError;
use crate::common::types::{ContinuityStatus, Epoch, Project};

/// パイプラインのステップ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// distributorからの開始エポック取得
    EpochRead,
    /// シェアテーブルの連続性チェック
    ContinuityCheck,
    /// ゲージ送信
    Publish,
}

impl Step {
    /// ログ用ラベル
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::EpochRead => "epoch_read",
            Step::ContinuityCheck => "continuity_check",
            Step::Publish => "publish",
        }
    }
}

/// ステップ失敗
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
    /// 失敗したステップ
    pub step: Step,
    /// エラー種別（`ProbeError::kind`）
    pub kind: &'static str,
    /// エラーメッセージ
    pub message: String,
}

impl StepFailure {
    /// エラーから生成
    pub fn new(step: Step, error: &ProbeError) -> Self {
        Self {
            step,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// プロジェクト1件分の結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectOutcome {
    /// 対象プロジェクト
    pub project: Project,
    /// 開始エポック（取得できた場合）
    pub start_epoch: Option<Epoch>,
    /// 連続性チェック結果（実行できた場合）
    pub status: Option<ContinuityStatus>,
    /// ゲージを送信できたか
    pub published: bool,
    /// 失敗したステップ
    pub failures: Vec<StepFailure>,
}

impl ProjectOutcome {
    pub(crate) fn new(project: Project) -> Self {
        Self {
            project,
            start_epoch: None,
            status: None,
            published: false,
            failures: Vec::new(),
        }
    }

    /// 取得またはチェックが失敗した（送信失敗は含まない）
    pub fn check_failed(&self) -> bool {
        self.failures.iter().any(|f| f.step != Step::Publish)
    }

    /// 全ステップ成功かつ連続
    pub fn is_healthy(&self) -> bool {
        self.failures.is_empty()
            && self
                .status
                .map(|status| status.is_continuous())
                .unwrap_or(false)
    }
}

/// 1サイクル分の結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    /// サイクル開始時刻
    pub started_at: DateTime<Utc>,
    /// プロジェクトごとの結果（チェック順）
    pub outcomes: Vec<ProjectOutcome>,
}

impl CycleReport {
    /// バックオフ対象の失敗を含むか
    pub fn needs_retry(&self) -> bool {
        self.outcomes.iter().any(ProjectOutcome::check_failed)
    }

    /// すべてのプロジェクトが健全か
    pub fn all_healthy(&self) -> bool {
        self.outcomes.iter().all(ProjectOutcome::is_healthy)
    }

    /// 取得またはチェックに失敗したプロジェクト
    pub fn failed_projects(&self) -> Vec<Project> {
        self.outcomes
            .iter()
            .filter(|o| o.check_failed())
            .map(|o| o.project)
            .collect()
    }

    /// プロジェクトの結果を取得
    pub fn outcome(&self, project: Project) -> Option<&ProjectOutcome> {
        self.outcomes.iter().find(|o| o.project == project)
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "cycle started at {}", self.started_at.to_rfc3339())?;
        for outcome in &self.outcomes {
            write!(f, "  {:<12}", outcome.project.to_string())?;
            match outcome.start_epoch {
                Some(start) => write!(f, " start={start}")?,
                None => write!(f, " start=-")?,
            }
            match outcome.status {
                Some(status) => write!(f, " {status}")?,
                None => write!(f, " unchecked")?,
            }
            write!(
                f,
                " {}",
                if outcome.published {
                    "published"
                } else {
                    "not published"
                }
            )?;
            writeln!(f)?;
            for failure in &outcome.failures {
                writeln!(
                    f,
                    "    {} failed ({}): {}",
                    failure.step.as_str(),
                    failure.kind,
                    failure.message
                )?;
            }
        }
        Ok(())
    }
}

//! 共通型定義
//!
//! Project, ContinuityStatus, Gauge等のコアデータ型

use serde::{Deserialize, Serialize};
use std::fmt;

/// エポック番号（Postgres `BIGINT`）
pub type Epoch = i64;

/// 監視対象プロジェクト
///
/// 閉じた集合として扱い、SQLに埋め込むテーブル名は各バリアントの静的文字列のみとする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Project {
    /// Aleo
    #[serde(rename = "ALEO")]
    Aleo,
    /// Quai Garden
    #[serde(rename = "Quai_Garden")]
    QuaiGarden,
}

impl Project {
    /// 監視対象の全プロジェクト（チェック順）
    pub const ALL: [Project; 2] = [Project::Aleo, Project::QuaiGarden];

    /// distributorテーブルの`project`列の値
    pub fn distributor_key(&self) -> &'static str {
        match self {
            Project::Aleo => "ALEO",
            Project::QuaiGarden => "Quai_Garden",
        }
    }

    /// シェアテーブル名
    pub fn shares_table(&self) -> &'static str {
        match self {
            Project::Aleo => "user_shares",
            Project::QuaiGarden => "shares",
        }
    }

    /// 連続性チェック用SQL
    ///
    /// `$1` に開始エポックをバインドする。
    pub fn continuity_query(&self) -> &'static str {
        match self {
            Project::Aleo => {
                "SELECT DISTINCT epoch_number::BIGINT FROM user_shares \
                 WHERE epoch_number >= $1 ORDER BY 1 ASC"
            }
            Project::QuaiGarden => {
                "SELECT DISTINCT epoch_number::BIGINT FROM shares \
                 WHERE epoch_number >= $1 ORDER BY 1 ASC"
            }
        }
    }

    /// Pushgatewayのjob名
    pub fn job(&self) -> &'static str {
        match self {
            Project::Aleo => "aleo",
            Project::QuaiGarden => "quai",
        }
    }

    /// 公開するゲージ名
    pub fn metric_name(&self) -> &'static str {
        match self {
            Project::Aleo => "aleo_shares_continuity_status",
            Project::QuaiGarden => "quai_shares_continuity_status",
        }
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.distributor_key())
    }
}

/// 連続性チェック結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ContinuityStatus {
    /// 開始エポック以降が欠番なく並んでいる
    Continuous {
        /// 最初に観測したエポック
        first: Epoch,
        /// 最後に観測したエポック
        last: Epoch,
        /// 観測した異なるエポック数
        count: u64,
    },
    /// 欠番を検出（最初の違反箇所）
    Gap {
        /// 直前のエポック
        previous: Epoch,
        /// `previous + 1` の代わりに現れたエポック
        found: Epoch,
    },
    /// 開始エポック以降の行が存在しない
    NoData,
}

impl ContinuityStatus {
    /// ゲージに反映する真偽値
    ///
    /// `NoData` は連続扱い（空集合は欠番なし）。
    pub fn is_continuous(&self) -> bool {
        !matches!(self, ContinuityStatus::Gap { .. })
    }

    /// ゲージ値（1.0 = 連続, 0.0 = 欠番あり）
    pub fn gauge_value(&self) -> f64 {
        if self.is_continuous() {
            1.0
        } else {
            0.0
        }
    }
}

impl fmt::Display for ContinuityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContinuityStatus::Continuous { first, last, count } => {
                write!(f, "continuous ({count} epochs, {first}..={last})")
            }
            ContinuityStatus::Gap { previous, found } => {
                write!(f, "gap after {previous} (next observed {found})")
            }
            ContinuityStatus::NoData => f.write_str("no data"),
        }
    }
}

/// Pushgatewayへ送る単一ゲージ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gauge {
    /// メトリクス名
    pub name: String,
    /// job ラベル
    pub job: String,
    /// instance ラベル（未指定ならグルーピングに含めない）
    pub instance: Option<String>,
    /// 値
    pub value: f64,
}

impl Gauge {
    /// プロジェクトの連続性ゲージを生成
    pub fn continuity(project: Project, status: &ContinuityStatus, instance: Option<&str>) -> Self {
        Self {
            name: project.metric_name().to_string(),
            job: project.job().to_string(),
            instance: instance.map(str::to_string),
            value: status.gauge_value(),
        }
    }
}

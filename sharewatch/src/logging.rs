//! ロギング初期化ユーティリティ
//!
//! 標準出力へのfmtレイヤーに加え、`SHAREWATCH_LOG_DIR` が設定されていれば
//! 日次ローテーションのログファイルにも出力する。

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{get_env_with_alias, get_env_with_alias_or};

const LOG_FILE_PREFIX: &str = "sharewatch.log";

/// ログ出力設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// EnvFilterディレクティブ（例: `info`, `sharewatch=debug,sqlx=warn`）
    pub filter: String,
    /// ログファイル出力先ディレクトリ
    pub log_dir: Option<PathBuf>,
}

impl LogSettings {
    /// 環境変数から読み込む
    pub fn from_env() -> Self {
        Self {
            filter: get_env_with_alias_or("SHAREWATCH_LOG_LEVEL", "LOG_LEVEL", "info"),
            log_dir: get_env_with_alias("SHAREWATCH_LOG_DIR", "LOG_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

/// ログファイルのフラッシュを保証するガード
///
/// プロセス終了までdropしないこと。
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// グローバルsubscriberを初期化
pub fn init() -> Result<LoggingGuard, Box<dyn std::error::Error + Send + Sync>> {
    init_with(LogSettings::from_env())
}

/// 指定設定でグローバルsubscriberを初期化
pub fn init_with(
    settings: LogSettings,
) -> Result<LoggingGuard, Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_new(&settings.filter)?;

    let (file_layer, guard) = match settings.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init()?;

    Ok(LoggingGuard { _file: guard })
}

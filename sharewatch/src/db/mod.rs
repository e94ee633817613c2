//! データベースアクセス層
//!
//! PostgreSQL（distributor / 各プロジェクトのシェアDB）からの読み取り専用アクセス

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

/// distributorテーブル
pub mod distributor;

/// シェアテーブル
pub mod shares;

/// Repository traitパターン（テスタビリティ向上）
pub mod traits;

pub use distributor::DistributorStore;
pub use shares::SharesDb;
pub use traits::{EpochSource, SharesStore};

/// 単一ループからしか使わないため、プールは小さく保つ
const MAX_CONNECTIONS: u32 = 2;

/// 接続プールを作成し、1本目の接続を確立する
///
/// 起動時に接続できなければエラーを返す（呼び出し側でプロセスを終了する）。
pub async fn connect(name: &str, dsn: &str, acquire_timeout: Duration) -> sqlx::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(acquire_timeout)
        .connect(dsn)
        .await?;

    info!(database = name, "Connected to database");
    Ok(pool)
}

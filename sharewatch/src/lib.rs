//! sharewatch
//!
//! マイニングプールのエポック/シェア台帳の連続性を定期的に監視し、
//! プロジェクトごとの健全性ゲージをPushgatewayへ送信する。

#![warn(missing_docs)]

/// 共通型定義とエラー型
pub mod common;

/// データベースアクセス
pub mod db;

/// メトリクス公開（Pushgateway）
pub mod metrics;

/// 連続性プローブ（チェッカーと監視ループ）
pub mod probe;

/// ロギング初期化ユーティリティ
pub mod logging;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// CLIインターフェース
pub mod cli;

/// 起動処理
pub mod bootstrap;

/// シャットダウン制御
pub mod shutdown;

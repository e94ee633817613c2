//! 共通型定義とエラー型

/// エラー型
pub mod error;

/// コアデータ型
pub mod types;

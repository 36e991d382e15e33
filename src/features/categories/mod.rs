//! 取引カテゴリー機能
//!
//! カテゴリーの参照・一覧と初期データ投入後の管理を提供する。
//! 取引登録時のカテゴリー名スナップショットの参照元になる。

pub mod models;
pub mod repository;
pub mod service;

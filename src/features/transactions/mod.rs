//! 取引機能
//!
//! 収入・支出の登録・更新・削除・絞り込み検索と、グラフ表示用の
//! 集計を提供する。符号で種別を表す（正: 収入、負: 支出）。

pub mod models;
pub mod repository;
pub mod service;

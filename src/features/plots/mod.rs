//! 農地機能
//!
//! GPS境界点付きの農地の登録・取得を提供する。収穫記録は農地に
//! 埋め込んで保持する。

pub mod models;
pub mod repository;
pub mod service;

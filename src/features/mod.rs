//! 機能モジュール
//!
//! 各機能はmodels・repository・serviceの3層で構成する。

pub mod auth;
pub mod categories;
pub mod machinery;
pub mod plots;
pub mod transactions;
pub mod users;

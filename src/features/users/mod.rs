//! ユーザー機能
//!
//! ユーザーの登録（サインアップ）と認証（サインイン）を提供する。
//! ユーザーレコードには所有農地のサマリーを非正規化して保持する。

pub mod models;
pub mod repository;
pub mod service;

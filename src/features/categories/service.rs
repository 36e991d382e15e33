use crate::features::categories::{models::Category, repository};
use crate::shared::errors::{AppError, AppResult};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// カテゴリー参照サービス
#[derive(Clone)]
pub struct CategoryService {
    /// データベース接続
    db: Arc<Mutex<Connection>>,
}

impl CategoryService {
    /// 新しいCategoryServiceを作成する
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    /// IDでカテゴリーを取得する
    ///
    /// # 引数
    /// * `id` - カテゴリーID
    ///
    /// # 戻り値
    /// カテゴリー（存在しない場合はNone）、または失敗時はエラー
    pub fn get(&self, id: &str) -> AppResult<Option<Category>> {
        let conn = self
            .db
            .lock()
            .map_err(|e| AppError::concurrency(format!("データベースロック取得失敗: {e}")))?;

        repository::find_by_id(&conn, id)
    }

    /// カテゴリー一覧を取得する
    ///
    /// # 戻り値
    /// 名前順のカテゴリーリスト、または失敗時はエラー
    pub fn list(&self) -> AppResult<Vec<Category>> {
        let conn = self
            .db
            .lock()
            .map_err(|e| AppError::concurrency(format!("データベースロック取得失敗: {e}")))?;

        repository::find_all(&conn)
    }
}

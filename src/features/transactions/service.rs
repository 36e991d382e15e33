use crate::features::categories::repository as categories_repository;
use crate::features::transactions::{
    models::{AddTransactionDto, ChartPoint, Transaction, TransactionFilter, YearCategorySum},
    repository,
};
use crate::shared::errors::{AppError, AppResult};
use chrono::Utc;
use chrono_tz::Asia::Tokyo;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// 取引管理サービス
///
/// 登録時にカテゴリーを解決し、その時点のカテゴリー名を取引に
/// スナップショットとして保持する。
#[derive(Clone)]
pub struct TransactionService {
    /// データベース接続
    db: Arc<Mutex<Connection>>,
}

impl TransactionService {
    /// 新しいTransactionServiceを作成する
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    /// 取引を新規登録する
    ///
    /// dtoのidは無視し、常に新しいIDで登録する。
    ///
    /// # 引数
    /// * `user_id` - 所有者のユーザーID
    /// * `dto` - 登録リクエスト
    ///
    /// # 戻り値
    /// 保存された取引、カテゴリー不在の場合はエラー
    pub fn add(&self, user_id: &str, dto: AddTransactionDto) -> AppResult<Transaction> {
        let conn = self
            .db
            .lock()
            .map_err(|e| AppError::concurrency(format!("データベースロック取得失敗: {e}")))?;

        // カテゴリーを解決して名前をスナップショットする
        let category = categories_repository::find_by_id(&conn, &dto.category_id)?
            .ok_or_else(|| AppError::validation("カテゴリーが存在しません"))?;

        let transaction = Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            category_id: category.id,
            category_name: category.name,
            description: dto.description,
            value: dto.value,
            date: dto.date,
            created_at: Utc::now().with_timezone(&Tokyo).to_rfc3339(),
        };

        repository::insert(&conn, &transaction)?;

        log::info!("取引を登録しました: {}", transaction.id);

        Ok(transaction)
    }

    /// 既存の取引を更新する
    ///
    /// # 引数
    /// * `user_id` - 所有者のユーザーID
    /// * `dto` - 更新リクエスト（idは必須）
    ///
    /// # 戻り値
    /// 更新後の取引、id未指定・カテゴリー不在・対象取引不在の場合はエラー
    pub fn update(&self, user_id: &str, dto: AddTransactionDto) -> AppResult<Transaction> {
        let id = dto
            .id
            .ok_or_else(|| AppError::validation("取引IDが指定されていません"))?;

        let conn = self
            .db
            .lock()
            .map_err(|e| AppError::concurrency(format!("データベースロック取得失敗: {e}")))?;

        let category = categories_repository::find_by_id(&conn, &dto.category_id)?
            .ok_or_else(|| AppError::validation("カテゴリーが存在しません"))?;

        // 既存取引を取得してcreated_atを引き継ぐ
        let existing = repository::find_for_user(&conn, &id, user_id)?
            .ok_or_else(|| AppError::not_found("取引"))?;

        let transaction = Transaction {
            id,
            user_id: user_id.to_string(),
            category_id: category.id,
            category_name: category.name,
            description: dto.description,
            value: dto.value,
            date: dto.date,
            created_at: existing.created_at,
        };

        if !repository::update_for_user(&conn, &transaction)? {
            return Err(AppError::not_found("取引"));
        }

        log::info!("取引を更新しました: {}", transaction.id);

        Ok(transaction)
    }

    /// 取引を削除する
    ///
    /// # 引数
    /// * `user_id` - 所有者のユーザーID
    /// * `transaction_id` - 取引ID
    ///
    /// # 戻り値
    /// 削除された場合はtrue、対象が存在しない場合はfalse
    pub fn delete(&self, user_id: &str, transaction_id: &str) -> AppResult<bool> {
        let conn = self
            .db
            .lock()
            .map_err(|e| AppError::concurrency(format!("データベースロック取得失敗: {e}")))?;

        repository::delete_for_user(&conn, transaction_id, user_id)
    }

    /// 絞り込み条件に一致する取引一覧を取得する
    ///
    /// # 引数
    /// * `user_id` - 所有者のユーザーID
    /// * `filter` - 絞り込み条件
    ///
    /// # 戻り値
    /// 取引日の降順の取引リスト
    pub fn query(&self, user_id: &str, filter: &TransactionFilter) -> AppResult<Vec<Transaction>> {
        let conn = self
            .db
            .lock()
            .map_err(|e| AppError::concurrency(format!("データベースロック取得失敗: {e}")))?;

        repository::find_filtered(&conn, user_id, filter)
    }

    /// グラフ表示用の月別収支データを取得する
    ///
    /// # 引数
    /// * `user_id` - 所有者のユーザーID
    ///
    /// # 戻り値
    /// 年月昇順の月別収支集計点リスト
    pub fn chart_data(&self, user_id: &str) -> AppResult<Vec<ChartPoint>> {
        let conn = self
            .db
            .lock()
            .map_err(|e| AppError::concurrency(format!("データベースロック取得失敗: {e}")))?;

        repository::chart_data(&conn, user_id)
    }

    /// 年×カテゴリー別の集計を取得する
    ///
    /// # 引数
    /// * `user_id` - 所有者のユーザーID
    ///
    /// # 戻り値
    /// 年×カテゴリー別の合計リスト
    pub fn per_year_and_category(&self, user_id: &str) -> AppResult<Vec<YearCategorySum>> {
        let conn = self
            .db
            .lock()
            .map_err(|e| AppError::concurrency(format!("データベースロック取得失敗: {e}")))?;

        repository::grouped_by_year_and_category(&conn, user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::models::Category;
    use crate::shared::database::connection::create_in_memory_connection;

    fn setup() -> (TransactionService, Category) {
        let conn = create_in_memory_connection().unwrap();
        let category = categories_repository::find_all(&conn).unwrap().remove(0);
        (
            TransactionService::new(Arc::new(Mutex::new(conn))),
            category,
        )
    }

    fn sample_dto(category_id: &str, value: f64) -> AddTransactionDto {
        AddTransactionDto {
            id: None,
            category_id: category_id.to_string(),
            description: "テスト取引".to_string(),
            value,
            date: "2024-03-10".to_string(),
        }
    }

    #[test]
    fn test_add_snapshots_category_name() {
        let (service, category) = setup();

        let saved = service.add("u-1", sample_dto(&category.id, -5000.0)).unwrap();
        assert_eq!(saved.category_name, category.name);
        assert_eq!(saved.user_id, "u-1");
        assert!(!saved.id.is_empty());
    }

    #[test]
    fn test_add_ignores_supplied_id() {
        let (service, category) = setup();

        let first = service.add("u-1", sample_dto(&category.id, -100.0)).unwrap();

        // 既存IDを指定しても上書きせず新規登録になる
        let mut dto = sample_dto(&category.id, -200.0);
        dto.id = Some(first.id.clone());
        let second = service.add("u-1", dto).unwrap();

        assert_ne!(second.id, first.id);
        let all = service.query("u-1", &TransactionFilter::default()).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_category_rename_does_not_change_stored_transactions() {
        let (service, category) = setup();

        let saved = service.add("u-1", sample_dto(&category.id, -5000.0)).unwrap();

        {
            let conn = service.db.lock().unwrap();
            assert!(categories_repository::rename(&conn, &category.id, "改名後").unwrap());
        }

        // 保存済み取引は登録時点の名前を保持し続ける
        let all = service.query("u-1", &TransactionFilter::default()).unwrap();
        assert_eq!(all[0].category_name, saved.category_name);
        assert_ne!(all[0].category_name, "改名後");
    }

    #[test]
    fn test_add_with_unknown_category_fails() {
        let (service, _) = setup();

        let result = service.add("u-1", sample_dto("存在しないID", -100.0));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_update_replaces_existing() {
        let (service, category) = setup();

        let saved = service.add("u-1", sample_dto(&category.id, -5000.0)).unwrap();

        let mut dto = sample_dto(&category.id, -7500.0);
        dto.id = Some(saved.id.clone());
        service.update("u-1", dto).unwrap();

        let all = service.query("u-1", &TransactionFilter::default()).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].value, -7500.0);
    }

    #[test]
    fn test_update_preserves_and_returns_stored_created_at() {
        let (service, category) = setup();

        let saved = service.add("u-1", sample_dto(&category.id, -5000.0)).unwrap();
        assert!(!saved.created_at.is_empty());

        let mut dto = sample_dto(&category.id, -7500.0);
        dto.id = Some(saved.id.clone());
        let updated = service.update("u-1", dto).unwrap();

        // レスポンスと保存済みレコードのcreated_atが一致すること
        assert_eq!(updated.created_at, saved.created_at);

        let all = service.query("u-1", &TransactionFilter::default()).unwrap();
        assert_eq!(all[0].created_at, saved.created_at);
    }

    #[test]
    fn test_update_without_id_is_rejected() {
        let (service, category) = setup();

        let result = service.update("u-1", sample_dto(&category.id, -100.0));
        assert!(matches!(result, Err(AppError::Validation(_))));

        // 何も登録されていないこと
        let all = service.query("u-1", &TransactionFilter::default()).unwrap();
        assert!(all.is_empty());
    }

    #[test]
    fn test_update_missing_transaction_is_not_found() {
        let (service, category) = setup();

        let mut dto = sample_dto(&category.id, -100.0);
        dto.id = Some("存在しないID".to_string());

        assert!(matches!(
            service.update("u-1", dto),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_returns_false_for_missing() {
        let (service, category) = setup();

        let saved = service.add("u-1", sample_dto(&category.id, -100.0)).unwrap();

        assert!(service.delete("u-1", &saved.id).unwrap());
        assert!(!service.delete("u-1", &saved.id).unwrap());
    }
}

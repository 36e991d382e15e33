use crate::features::plots::{
    models::{CreatePlotDto, Plot},
    repository,
};
use crate::features::users::{models::PlotSummary, repository as users_repository};
use crate::shared::errors::{AppError, AppResult};
use chrono::Utc;
use chrono_tz::Asia::Tokyo;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// 農地管理サービス
///
/// 農地の登録時には所有者レコードへのサマリー追記を同一トランザクション
/// で行い、農地と所有者の整合性を保つ。
#[derive(Clone)]
pub struct PlotService {
    /// データベース接続
    db: Arc<Mutex<Connection>>,
}

impl PlotService {
    /// 新しいPlotServiceを作成する
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    /// 農地を登録する
    ///
    /// # 引数
    /// * `user_id` - 所有者のユーザーID
    /// * `dto` - 登録リクエスト
    ///
    /// # 戻り値
    /// 作成された農地、検証失敗または所有者不在の場合はエラー
    pub fn create(&self, user_id: &str, dto: CreatePlotDto) -> AppResult<Plot> {
        if dto.border_points.is_empty() {
            return Err(AppError::validation("農地の境界点が指定されていません"));
        }
        if dto.area < 0 {
            return Err(AppError::validation("面積は0以上で入力してください"));
        }

        let conn = self
            .db
            .lock()
            .map_err(|e| AppError::concurrency(format!("データベースロック取得失敗: {e}")))?;

        if users_repository::find_by_id(&conn, user_id)?.is_none() {
            return Err(AppError::not_found("ユーザー"));
        }

        let plot = Plot {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            area: dto.area,
            plot_number: dto.plot_number,
            municipality: dto.municipality,
            border_points: dto.border_points,
            current_culture: dto.current_culture,
            harvests: dto.harvests,
            created_at: Utc::now().with_timezone(&Tokyo).to_rfc3339(),
        };

        let summary = PlotSummary {
            id: plot.id.clone(),
            area: plot.area,
            plot_number: plot.plot_number,
            municipality: plot.municipality.clone(),
        };

        // 農地の保存と所有者へのサマリー追記を同一トランザクションで行う
        let tx = conn.unchecked_transaction()?;
        repository::create(&tx, &plot)?;
        if !users_repository::append_plot_summary(&tx, user_id, &summary)? {
            return Err(AppError::not_found("ユーザー"));
        }
        tx.commit()?;

        log::info!("農地を登録しました: {} (所有者: {user_id})", plot.id);

        Ok(plot)
    }

    /// IDで農地を取得する
    ///
    /// 他のユーザーが所有する農地は存在しないものとして扱う。
    ///
    /// # 引数
    /// * `user_id` - 呼び出し元のユーザーID
    /// * `plot_id` - 農地ID
    ///
    /// # 戻り値
    /// 農地、存在しない・所有者が異なる場合はエラー
    pub fn get(&self, user_id: &str, plot_id: &str) -> AppResult<Plot> {
        let conn = self
            .db
            .lock()
            .map_err(|e| AppError::concurrency(format!("データベースロック取得失敗: {e}")))?;

        match repository::find_by_id(&conn, plot_id)? {
            Some(plot) if plot.user_id == user_id => Ok(plot),
            _ => Err(AppError::not_found("農地")),
        }
    }

    /// ユーザーの所有する農地一覧を取得する
    ///
    /// # 引数
    /// * `user_id` - 所有者のユーザーID
    ///
    /// # 戻り値
    /// 農地リスト（所有農地がない場合は空リスト）
    pub fn list_for_user(&self, user_id: &str) -> AppResult<Vec<Plot>> {
        let conn = self
            .db
            .lock()
            .map_err(|e| AppError::concurrency(format!("データベースロック取得失敗: {e}")))?;

        repository::find_by_user(&conn, user_id)
    }
}

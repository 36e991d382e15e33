use serde::{Deserialize, Serialize};

/// 取引（収入・支出）のデータモデル
///
/// 符号で種別を表す。正の値は収入、負の値は支出。
/// カテゴリー名は登録時点のスナップショットを保持する。
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Transaction {
    pub id: String,
    #[serde(skip_serializing, default)]
    pub user_id: String,
    pub category_id: String,
    pub category_name: String,
    pub description: String,
    pub value: f64,
    /// 取引日（"YYYY-MM-DD"形式）
    pub date: String,
    pub created_at: String,
}

/// 取引の登録・更新リクエスト
///
/// 更新時はidが必須。新規登録時のidは無視される。
#[derive(Debug, Deserialize, Clone)]
pub struct AddTransactionDto {
    #[serde(default)]
    pub id: Option<String>,
    pub category_id: String,
    #[serde(default)]
    pub description: String,
    pub value: f64,
    pub date: String,
}

/// 取引種別フィルター
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransactionKind {
    /// 支出（負の値）
    Expense,
    /// 収入（正の値）
    Income,
}

/// 取引一覧の絞り込み条件
///
/// すべての条件は省略可能。dateは指定日より前の取引のみを返す。
#[derive(Debug, Default, Clone)]
pub struct TransactionFilter {
    /// この日付より前の取引のみ（"YYYY-MM-DD"形式）
    pub before_date: Option<String>,
    /// 取引種別
    pub kind: Option<TransactionKind>,
    /// カテゴリーIDの一覧（いずれかに一致）
    pub category_ids: Vec<String>,
    /// 取得件数の上限
    pub take: Option<i64>,
    /// 読み飛ばす件数
    pub skip: Option<i64>,
}

/// 月別の収支集計点
///
/// expenseは支出の絶対値を保持する。
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ChartPoint {
    pub year: i32,
    pub month: u32,
    pub income: f64,
    pub expense: f64,
}

/// 年×カテゴリー別の合計
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct YearCategorySum {
    pub year: i32,
    pub category_name: String,
    pub total: f64,
}

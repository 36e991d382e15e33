use crate::features::transactions::models::{
    ChartPoint, Transaction, TransactionFilter, TransactionKind, YearCategorySum,
};
use crate::shared::errors::AppResult;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// 取引を保存する
///
/// # 引数
/// * `conn` - データベース接続
/// * `transaction` - 保存する取引
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラー
pub fn insert(conn: &Connection, transaction: &Transaction) -> AppResult<()> {
    conn.execute(
        "INSERT INTO transactions (id, user_id, category_id, category_name,
                                   description, value, date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            transaction.id,
            transaction.user_id,
            transaction.category_id,
            transaction.category_name,
            transaction.description,
            transaction.value,
            transaction.date,
            transaction.created_at,
        ],
    )?;

    Ok(())
}

/// ユーザーの取引をIDで取得する
///
/// # 引数
/// * `conn` - データベース接続
/// * `transaction_id` - 取引ID
/// * `user_id` - 所有者のユーザーID
///
/// # 戻り値
/// 取引（存在しない・所有者が異なる場合はNone）
pub fn find_for_user(
    conn: &Connection,
    transaction_id: &str,
    user_id: &str,
) -> AppResult<Option<Transaction>> {
    let transaction = conn
        .query_row(
            "SELECT id, user_id, category_id, category_name, description, value, date, created_at
             FROM transactions WHERE id = ?1 AND user_id = ?2",
            params![transaction_id, user_id],
            map_transaction_row,
        )
        .optional()?;

    Ok(transaction)
}

/// ユーザーの既存取引を更新する
///
/// # 引数
/// * `conn` - データベース接続
/// * `transaction` - 更新内容（idとuser_idで対象を特定）
///
/// # 戻り値
/// 更新された場合はtrue、対象が存在しない場合はfalse
pub fn update_for_user(conn: &Connection, transaction: &Transaction) -> AppResult<bool> {
    let updated = conn.execute(
        "UPDATE transactions
         SET category_id = ?1, category_name = ?2, description = ?3, value = ?4, date = ?5
         WHERE id = ?6 AND user_id = ?7",
        params![
            transaction.category_id,
            transaction.category_name,
            transaction.description,
            transaction.value,
            transaction.date,
            transaction.id,
            transaction.user_id,
        ],
    )?;

    Ok(updated > 0)
}

/// ユーザーの取引を削除する
///
/// # 引数
/// * `conn` - データベース接続
/// * `transaction_id` - 取引ID
/// * `user_id` - 所有者のユーザーID
///
/// # 戻り値
/// 削除された場合はtrue、対象が存在しない場合はfalse
pub fn delete_for_user(conn: &Connection, transaction_id: &str, user_id: &str) -> AppResult<bool> {
    let deleted = conn.execute(
        "DELETE FROM transactions WHERE id = ?1 AND user_id = ?2",
        params![transaction_id, user_id],
    )?;

    Ok(deleted > 0)
}

/// 絞り込み条件に一致するユーザーの取引を取得する
///
/// 条件はすべて省略可能で、指定されたものだけがWHERE句に追加される。
/// 結果は取引日の降順で返す。
///
/// # 引数
/// * `conn` - データベース接続
/// * `user_id` - 所有者のユーザーID
/// * `filter` - 絞り込み条件
///
/// # 戻り値
/// 条件に一致する取引リスト
pub fn find_filtered(
    conn: &Connection,
    user_id: &str,
    filter: &TransactionFilter,
) -> AppResult<Vec<Transaction>> {
    let mut sql = String::from(
        "SELECT id, user_id, category_id, category_name, description, value, date, created_at
         FROM transactions WHERE user_id = ?",
    );
    let mut sql_params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id.to_string())];

    if let Some(before_date) = &filter.before_date {
        sql.push_str(" AND date < ?");
        sql_params.push(Box::new(before_date.clone()));
    }

    match filter.kind {
        Some(TransactionKind::Expense) => sql.push_str(" AND value < 0"),
        Some(TransactionKind::Income) => sql.push_str(" AND value > 0"),
        None => {}
    }

    if !filter.category_ids.is_empty() {
        let placeholders = vec!["?"; filter.category_ids.len()].join(", ");
        sql.push_str(&format!(" AND category_id IN ({placeholders})"));
        for category_id in &filter.category_ids {
            sql_params.push(Box::new(category_id.clone()));
        }
    }

    sql.push_str(" ORDER BY date DESC LIMIT ? OFFSET ?");
    sql_params.push(Box::new(filter.take.unwrap_or(-1))); // -1 は無制限
    sql_params.push(Box::new(filter.skip.unwrap_or(0)));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        rusqlite::params_from_iter(sql_params.iter().map(|p| p.as_ref())),
        map_transaction_row,
    )?;

    let mut transactions = Vec::new();
    for row in rows {
        transactions.push(row?);
    }

    Ok(transactions)
}

/// ユーザーの取引を月別に集計する
///
/// 収入は正の値の合計、支出は負の値の絶対値の合計として返す。
/// 結果は年月の昇順。
///
/// # 引数
/// * `conn` - データベース接続
/// * `user_id` - 所有者のユーザーID
///
/// # 戻り値
/// 月別の収支集計点リスト
pub fn chart_data(conn: &Connection, user_id: &str) -> AppResult<Vec<ChartPoint>> {
    let mut stmt = conn.prepare(
        "SELECT CAST(strftime('%Y', date) AS INTEGER) AS year,
                CAST(strftime('%m', date) AS INTEGER) AS month,
                SUM(CASE WHEN value > 0 THEN value ELSE 0 END) AS income,
                SUM(CASE WHEN value < 0 THEN -value ELSE 0 END) AS expense
         FROM transactions
         WHERE user_id = ?1
         GROUP BY year, month
         ORDER BY year, month",
    )?;

    let rows = stmt.query_map(params![user_id], |row| {
        Ok(ChartPoint {
            year: row.get(0)?,
            month: row.get(1)?,
            income: row.get(2)?,
            expense: row.get(3)?,
        })
    })?;

    let mut points = Vec::new();
    for row in rows {
        points.push(row?);
    }

    Ok(points)
}

/// ユーザーの取引を年×カテゴリー別に集計する
///
/// # 引数
/// * `conn` - データベース接続
/// * `user_id` - 所有者のユーザーID
///
/// # 戻り値
/// 年×カテゴリー別の合計リスト（年の昇順、カテゴリー名順）
pub fn grouped_by_year_and_category(
    conn: &Connection,
    user_id: &str,
) -> AppResult<Vec<YearCategorySum>> {
    let mut stmt = conn.prepare(
        "SELECT CAST(strftime('%Y', date) AS INTEGER) AS year,
                category_name,
                SUM(value) AS total
         FROM transactions
         WHERE user_id = ?1
         GROUP BY year, category_name
         ORDER BY year, category_name",
    )?;

    let rows = stmt.query_map(params![user_id], |row| {
        Ok(YearCategorySum {
            year: row.get(0)?,
            category_name: row.get(1)?,
            total: row.get(2)?,
        })
    })?;

    let mut sums = Vec::new();
    for row in rows {
        sums.push(row?);
    }

    Ok(sums)
}

fn map_transaction_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category_id: row.get(2)?,
        category_name: row.get(3)?,
        description: row.get(4)?,
        value: row.get(5)?,
        date: row.get(6)?,
        created_at: row.get(7)?,
    })
}

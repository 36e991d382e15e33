use crate::shared::errors::AppResult;
use rusqlite::Connection;
use std::path::Path;

/// データベース接続を初期化し、テーブルを作成する
///
/// # 引数
/// * `database_path` - SQLiteデータベースファイルのパス
///
/// # 戻り値
/// データベース接続、または失敗時はエラー
///
/// # 処理内容
/// 1. データベース接続の開設
/// 2. テーブル作成（冪等）
/// 3. 初期カテゴリデータの投入
pub fn initialize_database(database_path: &Path) -> AppResult<Connection> {
    let conn = Connection::open(database_path)?;

    create_tables(&conn)?;

    log::info!("データベースを初期化しました: {:?}", database_path);

    Ok(conn)
}

/// テスト用のインメモリデータベース接続を作成する
///
/// # 戻り値
/// テーブル作成済みのインメモリ接続
pub fn create_in_memory_connection() -> AppResult<Connection> {
    let conn = Connection::open_in_memory()?;
    create_tables(&conn)?;
    Ok(conn)
}

/// データベーステーブルを作成する
///
/// # 引数
/// * `conn` - データベース接続
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラー
pub fn create_tables(conn: &Connection) -> AppResult<()> {
    create_users_table(conn)?;
    create_plots_table(conn)?;
    create_categories_table(conn)?;
    create_transactions_table(conn)?;
    create_indexes(conn)?;

    Ok(())
}

/// ユーザーテーブルを作成する
///
/// plotsカラムは所有農地のサマリー（JSON配列）の非正規化コピー。
fn create_users_table(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            address TEXT NOT NULL,
            image_url TEXT NOT NULL,
            plots TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// 農地テーブルを作成する
///
/// border_points（境界点）とharvests（収穫履歴）は農地に埋め込まれた
/// 子コレクションのため、JSON配列として1カラムに保持する。
fn create_plots_table(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS plots (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            area INTEGER NOT NULL CHECK(area >= 0),
            plot_number INTEGER NOT NULL,
            municipality TEXT NOT NULL,
            border_points TEXT NOT NULL,
            current_culture TEXT NOT NULL,
            harvests TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// カテゴリーテーブルを作成する
fn create_categories_table(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL
        )",
        [],
    )?;

    // テーブルが空の場合、初期カテゴリデータを挿入
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;

    if count == 0 {
        insert_default_categories(conn)?;
    }

    Ok(())
}

/// 取引テーブルを作成する
///
/// category_nameは登録時点のカテゴリー名のスナップショット。
/// カテゴリー名が後から変更されても追従しない（カスケード更新なし）。
fn create_transactions_table(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            category_id TEXT NOT NULL,
            category_name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            value REAL NOT NULL,
            date TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// インデックスを作成する
fn create_indexes(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_plots_user ON plots(user_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_user ON transactions(user_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id)",
        [],
    )?;

    Ok(())
}

/// デフォルトカテゴリを挿入する
fn insert_default_categories(conn: &Connection) -> AppResult<()> {
    let categories = [
        "種苗費",
        "肥料費",
        "農薬費",
        "燃料費",
        "農機具費",
        "出荷収入",
        "その他",
    ];

    for name in categories.iter() {
        conn.execute(
            "INSERT INTO categories (id, name) VALUES (?1, ?2)",
            [uuid::Uuid::new_v4().to_string().as_str(), name],
        )?;
    }

    log::info!("初期カテゴリを{}件登録しました", categories.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_create_tables() {
        let conn = Connection::open_in_memory().unwrap();

        let result = create_tables(&conn);
        assert!(result.is_ok());

        // 各テーブルが作成されていることを確認
        let tables = ["users", "plots", "categories", "transactions"];
        for table in &tables {
            let count: i64 = conn
                .query_row(
                    &format!(
                        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='{table}'"
                    ),
                    [],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "テーブル {table} が作成されていません");
        }
    }

    #[test]
    fn test_create_tables_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        create_tables(&conn).unwrap();
        // 2回目の実行でもエラーにならないこと
        create_tables(&conn).unwrap();
    }

    #[test]
    fn test_default_categories_seeded_once() {
        let conn = Connection::open_in_memory().unwrap();

        create_tables(&conn).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))
            .unwrap();
        assert!(count > 0);

        // 再実行しても重複投入されないこと
        create_tables(&conn).unwrap();
        let count_after: i64 = conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, count_after);
    }

    #[test]
    fn test_initialize_database_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_nouka_techou.db");

        let conn = initialize_database(&path).unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='users'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert!(path.exists());
    }
}

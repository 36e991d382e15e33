use crate::features::categories::models::Category;
use crate::shared::errors::AppResult;
use rusqlite::{params, Connection, OptionalExtension};

/// IDでカテゴリーを取得する
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - カテゴリーID
///
/// # 戻り値
/// カテゴリー（存在しない場合はNone）、または失敗時はエラー
pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<Category>> {
    let category = conn
        .query_row(
            "SELECT id, name FROM categories WHERE id = ?1",
            params![id],
            |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?;

    Ok(category)
}

/// カテゴリー一覧を取得する
///
/// # 引数
/// * `conn` - データベース接続
///
/// # 戻り値
/// 名前順のカテゴリーリスト、または失敗時はエラー
pub fn find_all(conn: &Connection) -> AppResult<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY name")?;

    let categories = stmt
        .query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(categories)
}

/// カテゴリーを作成する
///
/// # 引数
/// * `conn` - データベース接続
/// * `name` - カテゴリー名
///
/// # 戻り値
/// 作成されたカテゴリー、または失敗時はエラー
pub fn create(conn: &Connection, name: &str) -> AppResult<Category> {
    let category = Category {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
    };

    conn.execute(
        "INSERT INTO categories (id, name) VALUES (?1, ?2)",
        params![category.id, category.name],
    )?;

    Ok(category)
}

/// カテゴリー名を変更する
///
/// 既存取引にコピー済みのcategory_nameには反映されない（スナップショット仕様）。
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - カテゴリーID
/// * `name` - 新しいカテゴリー名
///
/// # 戻り値
/// 変更が行われた場合はtrue、対象が存在しない場合はfalse
pub fn rename(conn: &Connection, id: &str, name: &str) -> AppResult<bool> {
    let affected_rows = conn.execute(
        "UPDATE categories SET name = ?1 WHERE id = ?2",
        params![name, id],
    )?;

    Ok(affected_rows > 0)
}

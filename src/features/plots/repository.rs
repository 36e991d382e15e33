use crate::features::plots::models::Plot;
use crate::shared::errors::AppResult;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// 農地を保存する
///
/// # 引数
/// * `conn` - データベース接続
/// * `plot` - 保存する農地
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラー
pub fn create(conn: &Connection, plot: &Plot) -> AppResult<()> {
    conn.execute(
        "INSERT INTO plots (id, user_id, area, plot_number, municipality,
                            border_points, current_culture, harvests, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            plot.id,
            plot.user_id,
            plot.area,
            plot.plot_number,
            plot.municipality,
            serde_json::to_string(&plot.border_points)?,
            plot.current_culture,
            serde_json::to_string(&plot.harvests)?,
            plot.created_at,
        ],
    )?;

    Ok(())
}

/// IDで農地を取得する
///
/// # 引数
/// * `conn` - データベース接続
/// * `plot_id` - 農地ID
///
/// # 戻り値
/// 農地（存在しない場合はNone）、または失敗時はエラー
pub fn find_by_id(conn: &Connection, plot_id: &str) -> AppResult<Option<Plot>> {
    let row = conn
        .query_row(
            "SELECT id, user_id, area, plot_number, municipality,
                    border_points, current_culture, harvests, created_at
             FROM plots WHERE id = ?1",
            params![plot_id],
            map_plot_row,
        )
        .optional()?;

    row.map(into_plot).transpose()
}

/// ユーザーの所有する農地を全件取得する
///
/// # 引数
/// * `conn` - データベース接続
/// * `user_id` - 所有者のユーザーID
///
/// # 戻り値
/// 登録日時順の農地リスト（所有農地がない場合は空リスト）
pub fn find_by_user(conn: &Connection, user_id: &str) -> AppResult<Vec<Plot>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, area, plot_number, municipality,
                border_points, current_culture, harvests, created_at
         FROM plots WHERE user_id = ?1 ORDER BY created_at",
    )?;

    let rows = stmt.query_map(params![user_id], map_plot_row)?;

    let mut plots = Vec::new();
    for row in rows {
        plots.push(into_plot(row?)?);
    }

    Ok(plots)
}

/// SELECT結果の1行をJSONカラム未解析の中間表現に変換する
fn map_plot_row(row: &Row<'_>) -> rusqlite::Result<(Plot, String, String)> {
    let plot = Plot {
        id: row.get(0)?,
        user_id: row.get(1)?,
        area: row.get(2)?,
        plot_number: row.get(3)?,
        municipality: row.get(4)?,
        border_points: vec![],
        current_culture: row.get(6)?,
        harvests: vec![],
        created_at: row.get(8)?,
    };
    let border_json: String = row.get(5)?;
    let harvests_json: String = row.get(7)?;

    Ok((plot, border_json, harvests_json))
}

/// 中間表現のJSONカラムを解析して農地を完成させる
fn into_plot((mut plot, border_json, harvests_json): (Plot, String, String)) -> AppResult<Plot> {
    plot.border_points = serde_json::from_str(&border_json)?;
    plot.harvests = serde_json::from_str(&harvests_json)?;
    Ok(plot)
}

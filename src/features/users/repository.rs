use crate::features::users::models::{PlotSummary, User};
use crate::shared::errors::AppResult;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// ユーザーを作成する
///
/// # 引数
/// * `conn` - データベース接続
/// * `user` - 保存するユーザー（ハッシュ済みパスワードを含む）
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラー
pub fn create(conn: &Connection, user: &User) -> AppResult<()> {
    conn.execute(
        "INSERT INTO users (id, name, email, password_hash, address, image_url, plots, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            user.id,
            user.name,
            user.email,
            user.password_hash,
            user.address,
            user.image_url,
            serde_json::to_string(&user.plots)?,
            user.created_at,
        ],
    )?;

    Ok(())
}

/// メールアドレスでユーザーを取得する
///
/// # 引数
/// * `conn` - データベース接続
/// * `email` - メールアドレス
///
/// # 戻り値
/// ユーザー（存在しない場合はNone）、または失敗時はエラー
pub fn find_by_email(conn: &Connection, email: &str) -> AppResult<Option<User>> {
    let row = conn
        .query_row(
            "SELECT id, name, email, password_hash, address, image_url, plots, created_at
             FROM users WHERE email = ?1",
            params![email],
            map_user_row,
        )
        .optional()?;

    row.map(into_user).transpose()
}

/// IDでユーザーを取得する
///
/// # 引数
/// * `conn` - データベース接続
/// * `user_id` - ユーザーID
///
/// # 戻り値
/// ユーザー（存在しない場合はNone）、または失敗時はエラー
pub fn find_by_id(conn: &Connection, user_id: &str) -> AppResult<Option<User>> {
    let row = conn
        .query_row(
            "SELECT id, name, email, password_hash, address, image_url, plots, created_at
             FROM users WHERE id = ?1",
            params![user_id],
            map_user_row,
        )
        .optional()?;

    row.map(into_user).transpose()
}

/// 所有農地サマリーをユーザーに追記する
///
/// 農地登録と同一トランザクション内で呼ぶこと。
///
/// # 引数
/// * `conn` - データベース接続
/// * `user_id` - ユーザーID
/// * `summary` - 追記する農地サマリー
///
/// # 戻り値
/// 追記が行われた場合はtrue、ユーザーが存在しない場合はfalse
pub fn append_plot_summary(
    conn: &Connection,
    user_id: &str,
    summary: &PlotSummary,
) -> AppResult<bool> {
    let plots_json: Option<String> = conn
        .query_row(
            "SELECT plots FROM users WHERE id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()?;

    let Some(plots_json) = plots_json else {
        return Ok(false);
    };

    let mut plots: Vec<PlotSummary> = serde_json::from_str(&plots_json)?;
    plots.push(summary.clone());

    conn.execute(
        "UPDATE users SET plots = ?1 WHERE id = ?2",
        params![serde_json::to_string(&plots)?, user_id],
    )?;

    Ok(true)
}

/// SELECT結果の1行をJSONカラム未解析の中間表現に変換する
fn map_user_row(row: &Row<'_>) -> rusqlite::Result<(User, String)> {
    let user = User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        address: row.get(4)?,
        image_url: row.get(5)?,
        plots: vec![],
        created_at: row.get(7)?,
    };
    let plots_json: String = row.get(6)?;

    Ok((user, plots_json))
}

/// 中間表現のJSONカラムを解析してユーザーを完成させる
fn into_user((mut user, plots_json): (User, String)) -> AppResult<User> {
    user.plots = serde_json::from_str(&plots_json)?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::database::connection::create_in_memory_connection;

    fn sample_user(email: &str) -> User {
        User {
            id: uuid::Uuid::new_v4().to_string(),
            name: "テスト農家".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            address: "北海道帯広市".to_string(),
            image_url: String::new(),
            plots: vec![],
            created_at: "2024-01-01T00:00:00+09:00".to_string(),
        }
    }

    #[test]
    fn test_create_and_find_by_email() {
        let conn = create_in_memory_connection().unwrap();
        let user = sample_user("a@example.com");

        create(&conn, &user).unwrap();

        let found = find_by_email(&conn, "a@example.com").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.email, user.email);
        assert_eq!(found.password_hash, "hash");
        assert!(found.plots.is_empty());
    }

    #[test]
    fn test_find_by_email_missing_returns_none() {
        let conn = create_in_memory_connection().unwrap();
        assert!(find_by_email(&conn, "nashi@example.com").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_is_rejected_by_unique_constraint() {
        let conn = create_in_memory_connection().unwrap();

        create(&conn, &sample_user("dup@example.com")).unwrap();
        let result = create(&conn, &sample_user("dup@example.com"));
        assert!(result.is_err());
    }

    #[test]
    fn test_append_plot_summary() {
        let conn = create_in_memory_connection().unwrap();
        let user = sample_user("plots@example.com");
        create(&conn, &user).unwrap();

        let summary = PlotSummary {
            id: "p-1".to_string(),
            area: 800,
            plot_number: 7,
            municipality: "富良野市".to_string(),
        };

        assert!(append_plot_summary(&conn, &user.id, &summary).unwrap());

        let found = find_by_id(&conn, &user.id).unwrap().unwrap();
        assert_eq!(found.plots.len(), 1);
        assert_eq!(found.plots[0], summary);

        // 存在しないユーザーへの追記はfalse
        assert!(!append_plot_summary(&conn, "存在しないID", &summary).unwrap());
    }
}

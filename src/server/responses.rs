use crate::features::users::models::User;
use crate::shared::errors::AppError;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// メッセージのみのレスポンス
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

/// サインイン成功時のレスポンス
#[derive(Debug, Serialize)]
pub struct SigninResponse {
    pub user: User,
    pub auth_token: String,
}

/// ヘルスチェックのレスポンス
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// JSONレスポンスを作成する
///
/// # 引数
/// * `status` - HTTPステータスコード
/// * `body` - シリアライズするレスポンスボディ
///
/// # 戻り値
/// application/jsonのHTTPレスポンス
pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Response<String> {
    let serialized = match serde_json::to_string(body) {
        Ok(s) => s,
        Err(e) => {
            log::error!("レスポンスのシリアライズに失敗: {e}");
            return plain_error_response();
        }
    };

    match Response::builder()
        .status(status)
        .header("Content-Type", "application/json; charset=utf-8")
        .body(serialized)
    {
        Ok(response) => response,
        Err(e) => {
            log::error!("レスポンスの構築に失敗: {e}");
            plain_error_response()
        }
    }
}

/// アプリケーションエラーをHTTPレスポンスに変換する
///
/// 認証エラーは401、それ以外は400として返す。ボディはユーザー向け
/// メッセージのみを含む。
pub fn error_response(error: &AppError) -> Response<String> {
    let status = match error {
        AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        _ => StatusCode::BAD_REQUEST,
    };

    log::warn!("リクエスト処理エラー: {error}");

    json(status, &MessageResponse::new(error.user_message()))
}

/// 404レスポンスを作成する
pub fn not_found_response() -> Response<String> {
    json(
        StatusCode::NOT_FOUND,
        &MessageResponse::new("リソースが見つかりません"),
    )
}

/// シリアライズ自体が失敗した場合の最終手段のレスポンス
fn plain_error_response() -> Response<String> {
    let mut response = Response::new(r#"{"msg":"サーバーエラーが発生しました"}"#.to_string());
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_sets_status_and_content_type() {
        let response = json(StatusCode::OK, &MessageResponse::new("完了"));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "application/json; charset=utf-8"
        );
        assert!(response.body().contains("完了"));
    }

    #[test]
    fn test_unauthorized_maps_to_401() {
        let response = error_response(&AppError::unauthorized("認証エラーが発生しました"));
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.body().contains("認証エラーが発生しました"));
    }

    #[test]
    fn test_other_errors_map_to_400() {
        let response = error_response(&AppError::validation("入力が不正です"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = error_response(&AppError::not_found("取引"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.body().contains("取引が見つかりません"));
    }
}

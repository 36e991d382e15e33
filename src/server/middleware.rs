use crate::features::auth::token::TokenManager;
use crate::shared::errors::{AppError, AppResult};
use hyper::body::Incoming;
use hyper::Request;

/// 認証済みリクエストのコンテキスト
///
/// 保護されたハンドラーの呼び出し前にルーターが一度だけ構築する。
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// 認証されたユーザーのID
    pub user_id: String,
}

/// AuthorizationヘッダーからBearerトークンを取り出す
///
/// # 引数
/// * `req` - HTTPリクエスト
///
/// # 戻り値
/// トークン文字列（ヘッダーが無い・形式が不正な場合はNone）
fn extract_bearer_token(req: &Request<Incoming>) -> Option<&str> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// リクエストを認証してコンテキストを構築する
///
/// # 引数
/// * `tokens` - トークン検証に使用するTokenManager
/// * `req` - HTTPリクエスト
///
/// # 戻り値
/// 認証済みコンテキスト、トークンが無い・不正な場合は認証エラー
pub fn authenticate(tokens: &TokenManager, req: &Request<Incoming>) -> AppResult<AuthContext> {
    let token = extract_bearer_token(req)
        .ok_or_else(|| AppError::unauthorized("認証エラーが発生しました"))?;

    let claims = tokens.verify(token)?;

    Ok(AuthContext {
        user_id: claims.user_id,
    })
}

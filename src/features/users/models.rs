use serde::{Deserialize, Serialize};

/// ユーザーに非正規化して保持する所有農地のサマリー
///
/// 農地登録時に所有者のレコードへ追記される。一覧画面のための
/// コピーであり、農地本体の更新には追従しない。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlotSummary {
    pub id: String,
    pub area: i64,
    pub plot_number: i64,
    pub municipality: String,
}

/// ユーザーのデータモデル
///
/// password_hashはクライアントへのレスポンスには含めない。
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub address: String,
    pub image_url: String,
    pub plots: Vec<PlotSummary>,
    pub created_at: String,
}

/// ユーザー登録リクエスト
#[derive(Debug, Deserialize, Clone)]
pub struct SignupDto {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub image_url: String,
}

/// サインイン時の認証情報
#[derive(Debug, Deserialize, Clone)]
pub struct AuthCredsDto {
    pub email: String,
    pub password: String,
}

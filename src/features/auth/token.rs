use crate::shared::errors::{AppError, AppResult};
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// ベアラートークンに埋め込むクレーム
///
/// ユーザーIDはクレーム名 "Id" で保持する。
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// ユーザーID
    #[serde(rename = "Id")]
    pub user_id: String,
    /// 発行時刻（UNIX秒）
    pub issued_at: i64,
}

/// ベアラートークンの発行・検証を行う構造体
///
/// クレームのJSONをAES-256-GCMで暗号化し、ナンスと暗号文を結合して
/// Base64エンコードしたものをトークンとする。有効期限は持たない。
#[derive(Clone)]
pub struct TokenManager {
    /// 暗号化キー
    encryption_key: Vec<u8>,
}

impl TokenManager {
    /// 新しいTokenManagerを作成する
    ///
    /// # 引数
    /// * `key` - 暗号化キー（32バイトに調整して使用）
    ///
    /// # 戻り値
    /// TokenManagerインスタンス
    pub fn new(key: &str) -> Self {
        // 暗号化キーを32バイトに調整
        let mut key_bytes = key.as_bytes().to_vec();
        key_bytes.resize(32, 0); // 32バイトに調整（不足分は0で埋める）

        Self {
            encryption_key: key_bytes,
        }
    }

    /// ユーザーIDを埋め込んだトークンを発行する
    ///
    /// # 引数
    /// * `user_id` - ユーザーID
    ///
    /// # 戻り値
    /// 暗号化されたベアラートークン
    pub fn issue(&self, user_id: &str) -> AppResult<String> {
        let claims = TokenClaims {
            user_id: user_id.to_string(),
            issued_at: Utc::now().timestamp(),
        };
        let plaintext = serde_json::to_string(&claims)?;

        let cipher = Aes256Gcm::new_from_slice(&self.encryption_key)
            .map_err(|e| AppError::security(format!("暗号化キーの初期化に失敗: {e}")))?;

        // ランダムなナンス（12バイト）を生成
        let mut nonce_bytes = [0u8; 12];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        // クレームを暗号化
        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| AppError::security(format!("トークン暗号化に失敗: {e}")))?;

        // ナンスと暗号文を結合してBase64エンコード
        let mut token_bytes = nonce_bytes.to_vec();
        token_bytes.extend_from_slice(&ciphertext);
        let token = general_purpose::STANDARD.encode(&token_bytes);

        log::debug!("トークンを発行しました: user_id={user_id}");

        Ok(token)
    }

    /// トークンを検証してクレームを取り出す
    ///
    /// # 引数
    /// * `token` - ベアラートークン
    ///
    /// # 戻り値
    /// 検証されたクレーム、不正なトークンの場合は認証エラー
    pub fn verify(&self, token: &str) -> AppResult<TokenClaims> {
        // Base64デコード
        let token_bytes = general_purpose::STANDARD
            .decode(token)
            .map_err(|_| AppError::unauthorized("認証エラーが発生しました"))?;

        if token_bytes.len() < 12 {
            return Err(AppError::unauthorized("認証エラーが発生しました"));
        }

        // ナンスと暗号文を分離
        let (nonce_bytes, ciphertext) = token_bytes.split_at(12);
        let nonce = Nonce::from_slice(nonce_bytes);

        let cipher = Aes256Gcm::new_from_slice(&self.encryption_key)
            .map_err(|e| AppError::security(format!("暗号化キーの初期化に失敗: {e}")))?;

        // 復号化
        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| AppError::unauthorized("認証エラーが発生しました"))?;

        let claims: TokenClaims = serde_json::from_slice(&plaintext)
            .map_err(|_| AppError::unauthorized("認証エラーが発生しました"))?;

        Ok(claims)
    }
}

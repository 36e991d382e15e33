use crate::features::auth::token::TokenManager;
use crate::features::users::{
    models::{AuthCredsDto, SignupDto, User},
    repository,
};
use crate::shared::errors::{AppError, AppResult};
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use chrono_tz::Asia::Tokyo;
use rand::RngCore;
use rusqlite::Connection;
use sha2::{Digest, Sha256};
use std::sync::{Arc, Mutex};

/// ユーザー登録・認証サービス
///
/// パスワードはソルト付きSHA-256でハッシュ化して保存する。
/// サインイン成功時にベアラートークンを発行する。
#[derive(Clone)]
pub struct UserService {
    /// データベース接続
    db: Arc<Mutex<Connection>>,
    /// トークン発行・検証
    tokens: TokenManager,
}

impl UserService {
    /// 新しいUserServiceを作成する
    pub fn new(db: Arc<Mutex<Connection>>, tokens: TokenManager) -> Self {
        Self { db, tokens }
    }

    /// 新規ユーザーを登録する
    ///
    /// # 引数
    /// * `dto` - 登録リクエスト
    ///
    /// # 戻り値
    /// 作成されたユーザー、メールアドレスが登録済みの場合はエラー
    pub fn signup(&self, dto: SignupDto) -> AppResult<User> {
        if dto.email.trim().is_empty() {
            return Err(AppError::validation("メールアドレスを入力してください"));
        }
        if dto.password.is_empty() {
            return Err(AppError::validation("パスワードを入力してください"));
        }

        let conn = self
            .db
            .lock()
            .map_err(|e| AppError::concurrency(format!("データベースロック取得失敗: {e}")))?;

        // メールアドレスの重複チェック
        if repository::find_by_email(&conn, &dto.email)?.is_some() {
            return Err(AppError::validation(
                "このメールアドレスは既に登録されています",
            ));
        }

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            name: dto.name,
            email: dto.email,
            password_hash: hash_password(&dto.password),
            address: dto.address,
            image_url: dto.image_url,
            plots: vec![],
            created_at: Utc::now().with_timezone(&Tokyo).to_rfc3339(),
        };

        repository::create(&conn, &user)?;

        log::info!("新規ユーザーを登録しました: {}", user.id);

        Ok(user)
    }

    /// メールアドレスとパスワードでサインインする
    ///
    /// # 引数
    /// * `dto` - 認証情報
    ///
    /// # 戻り値
    /// ユーザーと発行済みベアラートークン、認証失敗時は認証エラー
    pub fn signin(&self, dto: AuthCredsDto) -> AppResult<(User, String)> {
        let conn = self
            .db
            .lock()
            .map_err(|e| AppError::concurrency(format!("データベースロック取得失敗: {e}")))?;

        let user = repository::find_by_email(&conn, &dto.email)?
            .ok_or_else(|| AppError::unauthorized("メールアドレスまたはパスワードが違います"))?;

        if !verify_password(&dto.password, &user.password_hash) {
            return Err(AppError::unauthorized(
                "メールアドレスまたはパスワードが違います",
            ));
        }

        let token = self.tokens.issue(&user.id)?;

        log::info!("サインインしました: {}", user.id);

        Ok((user, token))
    }

    /// メールアドレスでユーザーを取得する
    ///
    /// # 引数
    /// * `email` - メールアドレス
    ///
    /// # 戻り値
    /// ユーザー（存在しない場合はNone）、または失敗時はエラー
    pub fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let conn = self
            .db
            .lock()
            .map_err(|e| AppError::concurrency(format!("データベースロック取得失敗: {e}")))?;

        repository::find_by_email(&conn, email)
    }
}

/// パスワードをソルト付きSHA-256でハッシュ化する
///
/// 16バイトのランダムソルトを生成し、"base64(ソルト)$base64(ダイジェスト)"
/// 形式の文字列を返す。
fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut salt);

    let digest = salted_digest(&salt, password);

    format!(
        "{}${}",
        general_purpose::STANDARD.encode(salt),
        general_purpose::STANDARD.encode(digest)
    )
}

/// 平文パスワードが保存済みハッシュと一致するかを検証する
fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_b64, digest_b64)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = general_purpose::STANDARD.decode(salt_b64) else {
        return false;
    };
    let Ok(expected) = general_purpose::STANDARD.decode(digest_b64) else {
        return false;
    };

    salted_digest(&salt, password).as_slice() == expected.as_slice()
}

/// ソルトとパスワードを連結してSHA-256ダイジェストを計算する
fn salted_digest(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

use crate::shared::errors::{AppError, AppResult};
use std::path::PathBuf;

/// アプリケーションの実行環境を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    /// 開発環境
    Development,
    /// プロダクション環境
    Production,
}

/// 現在の実行環境を判定する
///
/// # 戻り値
/// 現在の実行環境（Development または Production）
///
/// # 判定ロジック
/// 1. 実行時環境変数 ENVIRONMENT を確認
/// 2. デバッグビルドの場合は Development
/// 3. リリースビルドの場合は Production
pub fn get_environment() -> Environment {
    // 実行時環境変数を確認
    if let Ok(env_var) = std::env::var("ENVIRONMENT") {
        let env = match env_var.as_str() {
            "production" => Environment::Production,
            _ => Environment::Development,
        };
        log::debug!("環境判定: 実行時環境変数を使用 -> {env_var} -> {env:?}");
        return env;
    }

    // フォールバック: ビルド設定に基づく判定
    if cfg!(debug_assertions) {
        Environment::Development
    } else {
        Environment::Production
    }
}

/// 環境変数の読み込みを確認する
///
/// # 処理内容
/// 1. 開発環境（デバッグビルド）の場合のみ.envファイルを読み込み
/// 2. 本番ビルドでは環境変数は実行時に設定されることを前提とする
///
/// # 注意
/// - 本番環境では.envファイルは読み込まれません（秘匿情報がバイナリに埋め込まれるのを防ぐため）
/// - 本番実行時は環境変数を設定してからアプリケーションを起動してください
pub fn load_environment_variables() {
    let is_development = cfg!(debug_assertions);

    if is_development {
        match dotenv::dotenv() {
            Ok(path) => {
                eprintln!("環境ファイルを読み込みました: {}", path.display());
            }
            Err(e) => {
                eprintln!("環境ファイルの読み込みに失敗: {e}");
                eprintln!("環境変数が設定されていることを確認してください");
            }
        }
    } else {
        eprintln!("本番環境: 環境変数は実行時に設定されます");
    }
}

/// ログシステムを初期化する
///
/// # 処理内容
/// 1. LOG_LEVEL環境変数からログレベルを決定（未設定時は環境に応じたデフォルト）
/// 2. env_loggerを初期化
pub fn initialize_logging_system() {
    let environment = get_environment();

    let default_level = if environment == Environment::Development {
        "debug"
    } else {
        "info"
    };
    let level_name = std::env::var("LOG_LEVEL").unwrap_or_else(|_| default_level.to_string());

    let log_level = match level_name.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .init();

    log::info!("ログシステムを初期化しました: level={level_name}, environment={environment:?}");
}

/// サーバー設定を管理する構造体
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTPサーバーの待ち受けポート
    pub port: u16,
    /// SQLiteデータベースファイルのパス
    pub database_path: PathBuf,
    /// 認証トークンの暗号化キー（32バイトに調整して使用）
    pub token_encryption_key: String,
}

impl ServerConfig {
    /// 環境変数からサーバー設定を読み込む
    ///
    /// # 環境変数
    /// - `PORT` - 待ち受けポート（デフォルト: 8080）
    /// - `DATABASE_PATH` - データベースファイルパス（デフォルトは環境に応じたファイル名）
    /// - `TOKEN_ENCRYPTION_KEY` - トークン暗号化キー（本番では必須）
    ///
    /// # 戻り値
    /// サーバー設定
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| {
                log::debug!("PORTが未設定のため、デフォルト値8080を使用します");
                8080
            });

        let database_path = std::env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(default_database_filename()));

        let token_encryption_key = std::env::var("TOKEN_ENCRYPTION_KEY").unwrap_or_else(|_| {
            log::warn!("TOKEN_ENCRYPTION_KEYが未設定のため、開発用キーを使用します");
            "dev_token_encryption_key_32bytes".to_string()
        });

        Self {
            port,
            database_path,
            token_encryption_key,
        }
    }

    /// 設定を検証する
    ///
    /// # 戻り値
    /// 設定が有効な場合はOk(())、無効な場合はエラー
    pub fn validate(&self) -> AppResult<()> {
        if self.port == 0 {
            return Err(AppError::configuration(
                "ポート番号は0より大きい値である必要があります",
            ));
        }

        if self.token_encryption_key.is_empty() {
            return Err(AppError::configuration(
                "TOKEN_ENCRYPTION_KEYが設定されていません",
            ));
        }

        // 本番環境でのデフォルトキー使用は拒否する
        if get_environment() == Environment::Production
            && self.token_encryption_key == "dev_token_encryption_key_32bytes"
        {
            return Err(AppError::configuration(
                "本番環境ではTOKEN_ENCRYPTION_KEYを必ず設定してください",
            ));
        }

        Ok(())
    }
}

/// 環境に応じたデータベースファイル名を取得する
///
/// # ファイル名の規則
/// - 開発環境: "dev_nouka_techou.db"
/// - プロダクション環境: "nouka_techou.db"
fn default_database_filename() -> &'static str {
    if get_environment() == Environment::Production {
        "nouka_techou.db"
    } else {
        "dev_nouka_techou.db"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_equality() {
        assert_eq!(Environment::Development, Environment::Development);
        assert_ne!(Environment::Development, Environment::Production);
    }

    #[test]
    fn test_get_environment() {
        // 現在の環境を取得（実際の値はビルド設定に依存）
        let env = get_environment();
        assert!(matches!(
            env,
            Environment::Development | Environment::Production
        ));
    }

    #[test]
    fn test_default_database_filename() {
        let filename = default_database_filename();
        assert!(filename.ends_with(".db"));
    }

    #[test]
    fn test_config_validate() {
        let config = ServerConfig {
            port: 8080,
            database_path: PathBuf::from("test.db"),
            token_encryption_key: "test_encryption_key_32_bytes_long".to_string(),
        };
        assert!(config.validate().is_ok());

        let invalid_port = ServerConfig {
            port: 0,
            ..config.clone()
        };
        assert!(invalid_port.validate().is_err());

        let empty_key = ServerConfig {
            token_encryption_key: String::new(),
            ..config
        };
        assert!(empty_key.validate().is_err());
    }

    #[test]
    fn test_load_environment_variables() {
        // 環境変数読み込み関数が正常に実行されることを確認（パニックしない）
        load_environment_variables();
    }
}

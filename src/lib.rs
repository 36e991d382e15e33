//! 農家手帳 - 小規模農家向けの記帳API
//!
//! 農地（GPS境界・収穫記録付き）と収入・支出の取引を管理する
//! HTTP JSON APIを提供する。

pub mod features;
pub mod server;
pub mod shared;

use features::auth::token::TokenManager;
use features::categories::service::CategoryService;
use features::plots::service::PlotService;
use features::transactions::service::TransactionService;
use features::users::service::UserService;
use rusqlite::Connection;
use shared::config::environment::{
    initialize_logging_system, load_environment_variables, ServerConfig,
};
use shared::database::connection::initialize_database;
use shared::errors::AppResult;
use std::sync::{Arc, Mutex};

/// 共有アプリケーション状態
///
/// 全サービスが単一のデータベース接続を共有する。
pub struct AppState {
    pub users: UserService,
    pub plots: PlotService,
    pub transactions: TransactionService,
    pub categories: CategoryService,
    pub tokens: TokenManager,
}

impl AppState {
    /// サービス一式を組み立てる
    pub fn new(db: Arc<Mutex<Connection>>, tokens: TokenManager) -> Self {
        Self {
            users: UserService::new(db.clone(), tokens.clone()),
            plots: PlotService::new(db.clone()),
            transactions: TransactionService::new(db.clone()),
            categories: CategoryService::new(db),
            tokens,
        }
    }
}

/// アプリケーションを起動する
///
/// 環境変数の読み込み、ログ初期化、データベース初期化を行い、
/// HTTPサーバーを開始する。
pub async fn run() -> AppResult<()> {
    load_environment_variables();
    initialize_logging_system();

    let config = ServerConfig::from_env();
    config.validate()?;

    let conn = initialize_database(&config.database_path)?;
    let db = Arc::new(Mutex::new(conn));

    let tokens = TokenManager::new(&config.token_encryption_key);
    let state = Arc::new(AppState::new(db, tokens));

    server::start_server(state, config.port).await
}

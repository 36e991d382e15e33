//! HTTPサーバー
//!
//! hyperのHTTP/1サーバーでJSON APIを提供する。保護されたルートは
//! ハンドラー呼び出し前にBearerトークンを検証してAuthContextを構築する。

pub mod middleware;
pub mod responses;

use crate::features::plots::models::CreatePlotDto;
use crate::features::transactions::models::{
    AddTransactionDto, TransactionFilter, TransactionKind,
};
use crate::features::users::models::{AuthCredsDto, SignupDto};
use crate::shared::errors::{AppError, AppResult};
use crate::AppState;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use middleware::{authenticate, AuthContext};
use responses::{error_response, json, not_found_response};
use responses::{HealthResponse, MessageResponse, SigninResponse};
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use url::Url;

/// HTTPサーバーを開始する
///
/// # 引数
/// * `state` - 共有アプリケーション状態
/// * `port` - 待ち受けポート番号
///
/// # 戻り値
/// サーバーが停止した場合のみ戻る（通常は戻らない）
pub async fn start_server(state: Arc<AppState>, port: u16) -> AppResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    log::info!("サーバーを開始しました: http://{addr}");

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);
                    let service =
                        service_fn(move |req| handle_request(Arc::clone(&state), req));

                    if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                        log::error!("HTTP接続処理エラー: {e}");
                    }
                });
            }
            Err(e) => {
                log::error!("接続受け入れエラー: {e}");
            }
        }
    }
}

/// HTTPリクエストをルーティングして処理する
async fn handle_request(
    state: Arc<AppState>,
    req: Request<Incoming>,
) -> Result<Response<String>, Infallible> {
    log::debug!("リクエストを受信: {} {}", req.method(), req.uri());

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let result = match (&method, path.as_str()) {
        (&Method::GET, "/health") => Ok(json(StatusCode::OK, &HealthResponse { status: "ok" })),
        (&Method::POST, "/user/signup") => handle_signup(&state, req).await,
        (&Method::POST, "/user/signin") => handle_signin(&state, req).await,
        (&Method::POST, "/plot/add") => handle_add_plot(&state, req).await,
        (&Method::GET, "/plot/plots") => handle_list_plots(&state, &req),
        (&Method::POST, "/transaction") => handle_add_transaction(&state, req).await,
        (&Method::PUT, "/transaction") => handle_update_transaction(&state, req).await,
        (&Method::GET, "/transaction/q") => handle_query_transactions(&state, &req),
        (&Method::GET, "/transaction/dataforchart") => handle_chart_data(&state, &req),
        (&Method::GET, "/transaction/expense-income-per-year") => {
            handle_per_year_and_category(&state, &req)
        }
        (&Method::GET, "/category/list") => handle_list_categories(&state, &req),
        (&Method::DELETE, p) if p.starts_with("/transaction/") => {
            handle_delete_transaction(&state, &req, p)
        }
        (&Method::GET, p) if p.starts_with("/plot/") => handle_get_plot(&state, &req, p),
        _ => {
            log::debug!("未対応のリクエスト: {method} {path}");
            Ok(not_found_response())
        }
    };

    Ok(result.unwrap_or_else(|e| error_response(&e)))
}

/// POST /user/signup
async fn handle_signup(
    state: &AppState,
    req: Request<Incoming>,
) -> AppResult<Response<String>> {
    let dto: SignupDto = read_json(req).await?;
    state.users.signup(dto)?;

    Ok(json(
        StatusCode::OK,
        &MessageResponse::new("登録が完了しました"),
    ))
}

/// POST /user/signin
async fn handle_signin(
    state: &AppState,
    req: Request<Incoming>,
) -> AppResult<Response<String>> {
    let dto: AuthCredsDto = read_json(req).await?;
    let (user, auth_token) = state.users.signin(dto)?;

    Ok(json(StatusCode::OK, &SigninResponse { user, auth_token }))
}

/// POST /plot/add
async fn handle_add_plot(
    state: &AppState,
    req: Request<Incoming>,
) -> AppResult<Response<String>> {
    let auth = authenticate(&state.tokens, &req)?;
    let dto: CreatePlotDto = read_json(req).await?;

    state.plots.create(&auth.user_id, dto)?;

    Ok(json(
        StatusCode::OK,
        &MessageResponse::new("新しい農地を登録しました"),
    ))
}

/// GET /plot/plots
fn handle_list_plots(state: &AppState, req: &Request<Incoming>) -> AppResult<Response<String>> {
    let auth = authenticate(&state.tokens, req)?;
    let plots = state.plots.list_for_user(&auth.user_id)?;

    Ok(json(StatusCode::OK, &plots))
}

/// GET /plot/{plotId}
fn handle_get_plot(
    state: &AppState,
    req: &Request<Incoming>,
    path: &str,
) -> AppResult<Response<String>> {
    let auth = authenticate(&state.tokens, req)?;

    let plot_id = path.trim_start_matches("/plot/");
    let plot = state.plots.get(&auth.user_id, plot_id)?;

    Ok(json(StatusCode::OK, &plot))
}

/// POST /transaction
async fn handle_add_transaction(
    state: &AppState,
    req: Request<Incoming>,
) -> AppResult<Response<String>> {
    let auth = authenticate(&state.tokens, &req)?;
    let dto: AddTransactionDto = read_json(req).await?;

    let transaction = state.transactions.add(&auth.user_id, dto)?;

    Ok(json(StatusCode::OK, &transaction))
}

/// PUT /transaction
async fn handle_update_transaction(
    state: &AppState,
    req: Request<Incoming>,
) -> AppResult<Response<String>> {
    let auth = authenticate(&state.tokens, &req)?;
    let dto: AddTransactionDto = read_json(req).await?;

    let transaction = state.transactions.update(&auth.user_id, dto)?;

    Ok(json(StatusCode::OK, &transaction))
}

/// GET /transaction/q
fn handle_query_transactions(
    state: &AppState,
    req: &Request<Incoming>,
) -> AppResult<Response<String>> {
    let auth = authenticate(&state.tokens, req)?;
    let filter = parse_transaction_filter(req.uri().query().unwrap_or(""))?;

    let transactions = state.transactions.query(&auth.user_id, &filter)?;

    Ok(json(StatusCode::OK, &transactions))
}

/// GET /transaction/dataforchart
fn handle_chart_data(state: &AppState, req: &Request<Incoming>) -> AppResult<Response<String>> {
    let auth = authenticate(&state.tokens, req)?;
    let points = state.transactions.chart_data(&auth.user_id)?;

    Ok(json(StatusCode::OK, &points))
}

/// GET /transaction/expense-income-per-year
fn handle_per_year_and_category(
    state: &AppState,
    req: &Request<Incoming>,
) -> AppResult<Response<String>> {
    let auth = authenticate(&state.tokens, req)?;
    let sums = state.transactions.per_year_and_category(&auth.user_id)?;

    Ok(json(StatusCode::OK, &sums))
}

/// DELETE /transaction/{id}
fn handle_delete_transaction(
    state: &AppState,
    req: &Request<Incoming>,
    path: &str,
) -> AppResult<Response<String>> {
    let auth = authenticate(&state.tokens, req)?;

    let transaction_id = path.trim_start_matches("/transaction/");
    if state.transactions.delete(&auth.user_id, transaction_id)? {
        Ok(json(
            StatusCode::OK,
            &MessageResponse::new("取引を削除しました"),
        ))
    } else {
        Err(AppError::validation("取引が存在しません"))
    }
}

/// GET /category/list
fn handle_list_categories(
    state: &AppState,
    req: &Request<Incoming>,
) -> AppResult<Response<String>> {
    authenticate(&state.tokens, req)?;

    let categories = state.categories.list()?;

    Ok(json(StatusCode::OK, &categories))
}

/// リクエストボディをJSONとして読み込む
async fn read_json<T: DeserializeOwned>(req: Request<Incoming>) -> AppResult<T> {
    let bytes = req
        .into_body()
        .collect()
        .await
        .map_err(|e| AppError::validation(format!("リクエストボディの読み込みに失敗: {e}")))?
        .to_bytes();

    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::validation(format!("リクエストボディの形式が不正です: {e}")))
}

/// 取引絞り込みのクエリパラメータを解析する
///
/// 対応キー: before（この日付より前）、skip、take、type（expense / income）、
/// categoryIds（繰り返し指定可）。
fn parse_transaction_filter(query: &str) -> AppResult<TransactionFilter> {
    let url = Url::parse(&format!("http://localhost/?{query}"))
        .map_err(|_| AppError::validation("クエリパラメータが不正です"))?;

    let mut filter = TransactionFilter::default();

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "before" => filter.before_date = Some(value.to_string()),
            "skip" => {
                filter.skip = Some(value.parse().map_err(|_| {
                    AppError::validation("skipには数値を指定してください")
                })?);
            }
            "take" => {
                filter.take = Some(value.parse().map_err(|_| {
                    AppError::validation("takeには数値を指定してください")
                })?);
            }
            "type" => {
                filter.kind = Some(match value.as_ref() {
                    "expense" => TransactionKind::Expense,
                    "income" => TransactionKind::Income,
                    _ => return Err(AppError::validation("取引種別が不正です")),
                });
            }
            // 繰り返し指定とカンマ区切りの両方を受け付ける
            "categoryIds" => filter
                .category_ids
                .extend(value.split(',').filter(|v| !v.is_empty()).map(String::from)),
            _ => {}
        }
    }

    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transaction_filter_full() {
        let filter = parse_transaction_filter(
            "before=2024-03-01&skip=10&take=20&type=expense&categoryIds=c-1&categoryIds=c-2",
        )
        .unwrap();

        assert_eq!(filter.before_date.as_deref(), Some("2024-03-01"));
        assert_eq!(filter.skip, Some(10));
        assert_eq!(filter.take, Some(20));
        assert_eq!(filter.kind, Some(TransactionKind::Expense));
        assert_eq!(filter.category_ids, vec!["c-1", "c-2"]);
    }

    #[test]
    fn test_parse_transaction_filter_empty() {
        let filter = parse_transaction_filter("").unwrap();

        assert!(filter.before_date.is_none());
        assert!(filter.kind.is_none());
        assert!(filter.category_ids.is_empty());
        assert!(filter.take.is_none());
    }

    #[test]
    fn test_parse_transaction_filter_comma_separated_categories() {
        let filter = parse_transaction_filter("categoryIds=c-1,c-2,c-3").unwrap();
        assert_eq!(filter.category_ids, vec!["c-1", "c-2", "c-3"]);
    }

    #[test]
    fn test_parse_transaction_filter_rejects_bad_values() {
        assert!(parse_transaction_filter("type=unknown").is_err());
        assert!(parse_transaction_filter("skip=abc").is_err());
        assert!(parse_transaction_filter("take=十").is_err());
    }
}

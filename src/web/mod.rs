use std::{sync::Arc, time::Instant};

use anyhow::Result;
use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    normalize_path::NormalizePath,
};

use crate::{cache::PriceStore, logging};

pub mod handler;
pub mod response;

/// 建立所有 HTTP 路由，任何來源皆可跨域存取
pub fn router(store: Arc<PriceStore>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handler::index))
        .route("/api/prices", get(handler::list_prices))
        .route("/api/prices/{year}", get(handler::prices_by_year))
        .route("/api/prices/{year}/{month}", get(handler::price_by_year_and_month))
        .route("/api/yearly-averages", get(handler::yearly_averages))
        .fallback(handler::not_found)
        .with_state(store)
        .layer(middleware::from_fn(log_request))
        .layer(cors)
}

/// 對外提供的服務：路由之前先去掉路徑結尾的 `/`，
/// 讓 `/api/prices/2023/` 與 `/api/prices/2023` 相同
pub fn app(store: Arc<PriceStore>) -> NormalizePath<Router> {
    NormalizePath::trim_trailing_slash(router(store))
}

/// 在已綁定的 listener 上提供服務，直到伺服器停止
pub async fn serve(listener: TcpListener, store: Arc<PriceStore>) -> Result<()> {
    let addr = listener.local_addr()?;
    logging::info_file_async(format!("HTTP 伺服器正在 {:?} 開始服務...", addr));

    let service = axum::ServiceExt::<Request>::into_make_service(app(store));
    let result = axum::serve(listener, service).await;
    match &result {
        Ok(_) => logging::info_file_async(format!("HTTP 伺服器在 {:?} 正常停止", addr)),
        Err(why) => logging::error_file_async(format!("HTTP 伺服器運行中斷 ({:?}): {}", addr, why)),
    }

    Ok(result?)
}

async fn log_request(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    logging::info_file_async(format!(
        "{} {} {} {:?}",
        method,
        path,
        response.status().as_u16(),
        start.elapsed()
    ));

    response
}

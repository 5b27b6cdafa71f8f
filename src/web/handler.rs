use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::{
    cache::PriceStore,
    calculation::yearly_average::YearlyAverage,
    declare,
    query::QueryError,
    util::text,
    web::response::ErrorBody,
};

/// GET / 服務說明
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Egg Price API",
        "endpoints": {
            "/api/prices": "Get all egg prices",
            "/api/prices/:year": "Get egg prices for a specific year",
            "/api/prices/:year/:month": "Get egg price for a specific year and month (month as M01-M12)",
            "/api/yearly-averages": "Get average egg prices by year"
        }
    }))
}

/// GET /api/prices
pub async fn list_prices(State(store): State<Arc<PriceStore>>) -> Response {
    let query = store.query();
    Json(query.list_all()).into_response()
}

/// GET /api/prices/{year}
pub async fn prices_by_year(
    State(store): State<Arc<PriceStore>>,
    Path(year): Path<String>,
) -> Result<Response, QueryError> {
    let year = path_year(&year).map_err(|year| QueryError::YearNotFound { year })?;

    let query = store.query();
    let records = query.by_year(year)?;
    Ok(Json(records).into_response())
}

/// GET /api/prices/{year}/{month}
pub async fn price_by_year_and_month(
    State(store): State<Arc<PriceStore>>,
    Path((year, month)): Path<(String, String)>,
) -> Result<Response, QueryError> {
    let year = match path_year(&year) {
        Ok(year) => year,
        Err(_) if !declare::is_valid_period(&month) => return Err(QueryError::InvalidMonth),
        Err(year) => return Err(QueryError::MonthNotFound { year, month }),
    };

    let query = store.query();
    let record = query.by_year_and_month(year, &month)?;
    Ok(Json(record).into_response())
}

/// GET /api/yearly-averages
pub async fn yearly_averages(State(store): State<Arc<PriceStore>>) -> Json<Vec<YearlyAverage>> {
    Json(store.query().yearly_averages())
}

/// 路徑上的年份只取開頭的整數部分，例如 "2023abc" 視為 2023。
///
/// 無法取得年份時回傳錯誤訊息中要顯示的文字：沒有數字為 `NaN`，
/// 超出 i32 範圍則為數字本身（不可能有資料）。
fn path_year(raw: &str) -> Result<i32, String> {
    match text::parse_int_prefix(raw) {
        Some(year) => i32::try_from(year).map_err(|_| year.to_string()),
        None => Err(declare::NOT_A_NUMBER.to_string()),
    }
}

pub async fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not found")))
}

use std::sync::Arc;

use thiserror::Error;

use crate::{
    calculation::yearly_average::{self, YearlyAverage},
    declare,
    record::PriceRecord,
};

/// 查詢失敗的原因，訊息內容即為回傳給呼叫端的文字
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// 月份代碼不是 M01 ~ M12
    #[error("Month should be in format M01-M12")]
    InvalidMonth,
    #[error("No data found for year {year}")]
    YearNotFound { year: String },
    #[error("No data found for {month}/{year}")]
    MonthNotFound { year: String, month: String },
}

/// 對某一份資料快照的唯讀查詢
#[derive(Debug, Clone, Default)]
pub struct PriceQuery {
    records: Arc<Vec<PriceRecord>>,
}

impl PriceQuery {
    pub fn new(records: Arc<Vec<PriceRecord>>) -> Self {
        PriceQuery { records }
    }

    /// 全部資料，維持載入順序
    pub fn list_all(&self) -> &[PriceRecord] {
        &self.records
    }

    /// 指定年份的全部資料，維持載入順序
    ///
    /// 查無資料時回傳 [`QueryError::YearNotFound`]，不會回傳空集合。
    pub fn by_year(&self, year: i32) -> Result<Vec<&PriceRecord>, QueryError> {
        let found: Vec<&PriceRecord> = self.records.iter().filter(|r| r.year == year).collect();
        if found.is_empty() {
            return Err(QueryError::YearNotFound {
                year: year.to_string(),
            });
        }

        Ok(found)
    }

    /// 指定年份與月份的第一筆資料
    ///
    /// 先檢查月份格式，格式錯誤時不會查詢資料；
    /// 同一年月有多筆時以最先載入的為準。
    pub fn by_year_and_month(&self, year: i32, period: &str) -> Result<&PriceRecord, QueryError> {
        if !declare::is_valid_period(period) {
            return Err(QueryError::InvalidMonth);
        }

        self.records
            .iter()
            .find(|r| r.is_in(year, period))
            .ok_or_else(|| QueryError::MonthNotFound {
                year: year.to_string(),
                month: period.to_string(),
            })
    }

    /// 各年度的平均、最低、最高價，依年份排序；沒有資料時為空集合
    pub fn yearly_averages(&self) -> Vec<YearlyAverage> {
        yearly_average::calculate(&self.records)
    }
}

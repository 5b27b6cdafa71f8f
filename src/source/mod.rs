//! 讀取價格資料表（CSV）並轉成 [`PriceRecord`]。
//!
//! 每一列資料獨立轉換：年份、價格或月漲跌無法解析的列會被略過並記錄原因，
//! 不會中斷整份檔案的載入。找不到檔案、缺少必要欄位或讀取途中發生 I/O
//! 錯誤則視為致命錯誤，直接回傳 `Err`。

use std::{fs::File, io::Read, path::Path};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::{
    declare::{Column, NOT_APPLICABLE},
    logging,
    record::PriceRecord,
    util::text,
};

/// CSV 原始列，全部欄位皆以字串讀入
#[derive(Deserialize, Debug, Clone)]
struct RawRow {
    #[serde(rename = "Series ID")]
    series_id: String,
    #[serde(rename = "Year")]
    year: String,
    #[serde(rename = "Period")]
    period: String,
    #[serde(rename = "Label")]
    label: String,
    #[serde(rename = "Value")]
    value: String,
    #[serde(rename = "1-Month Net Change")]
    monthly_change: String,
}

impl TryFrom<RawRow> for PriceRecord {
    type Error = anyhow::Error;

    fn try_from(row: RawRow) -> Result<Self> {
        let year = text::parse_i32(&row.year).context("Year")?;
        let value = text::parse_f64(&row.value).context("Value")?;
        let monthly_change = if row.monthly_change == NOT_APPLICABLE {
            None
        } else {
            Some(text::parse_f64(&row.monthly_change).context("1-Month Net Change")?)
        };

        Ok(PriceRecord {
            series_id: row.series_id,
            year,
            period: row.period,
            month_label: row.label,
            value,
            monthly_change,
        })
    }
}

/// 被略過的資料列
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// 檔案中的行號（標題列為第 1 行）
    pub line: u64,
    pub reason: String,
}

/// 一次載入的結果
#[derive(Debug, Default)]
pub struct LoadReport {
    /// 依來源順序排列
    pub records: Vec<PriceRecord>,
    pub skipped: Vec<SkippedRow>,
    /// 讀到的資料列數（不含標題列）
    pub rows_read: u64,
}

/// 從檔案載入價格資料
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<LoadReport> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open price table {}", path.display()))?;

    read_records(file).with_context(|| format!("Failed to load {}", path.display()))
}

/// 從任意來源讀取 CSV 並轉成價格資料
pub fn read_records<R: Read>(reader: R) -> Result<LoadReport> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let missing: Vec<String> = Column::iterator()
        .map(|c| c.to_string())
        .filter(|name| !headers.iter().any(|h| h == name.as_str()))
        .collect();
    if !missing.is_empty() {
        return Err(anyhow!("Missing required columns: {}", missing.join(", ")));
    }

    let mut report = LoadReport::default();
    for result in rdr.deserialize::<RawRow>() {
        report.rows_read += 1;

        let row = match result {
            Ok(row) => row,
            Err(why) if why.is_io_error() => {
                return Err(anyhow!("Failed to read price table because {}", why));
            }
            Err(why) => {
                let line = why
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(report.rows_read + 1);
                report.skip(line, why.to_string());
                continue;
            }
        };

        // 標題列為第 1 行，第 n 筆資料在第 n + 1 行（不含跨行欄位的情況）
        let line = report.rows_read + 1;
        match PriceRecord::try_from(row) {
            Ok(record) => report.records.push(record),
            Err(why) => report.skip(line, format!("{:#}", why)),
        }
    }

    Ok(report)
}

impl LoadReport {
    fn skip(&mut self, line: u64, reason: String) {
        logging::warn_file_async(format!("Skip price row at line {}: {}", line, reason));
        self.skipped.push(SkippedRow { line, reason });
    }
}

use once_cell::sync::Lazy;
use regex::Regex;

/// 來源檔中「無數值」的字面值，僅出現在 `1-Month Net Change` 欄位
pub const NOT_APPLICABLE: &str = "N/A";

/// 路徑上的年份沒有任何數字時，錯誤訊息中顯示的年份
pub const NOT_A_NUMBER: &str = "NaN";

/// 月份代碼 M01 ~ M12（兩位數補零、大寫 M）
static REG_PERIOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^M(0[1-9]|1[0-2])$").expect("Failed to compile period regex"));

/// 來源檔欄位名稱
#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::Display, strum::AsRefStr)]
pub enum Column {
    #[strum(serialize = "Series ID")]
    SeriesId,
    #[strum(serialize = "Year")]
    Year,
    #[strum(serialize = "Period")]
    Period,
    #[strum(serialize = "Label")]
    Label,
    #[strum(serialize = "Value")]
    Value,
    #[strum(serialize = "1-Month Net Change")]
    MonthlyChange,
}

impl Column {
    pub fn iterator() -> impl Iterator<Item = Self> {
        [
            Self::SeriesId,
            Self::Year,
            Self::Period,
            Self::Label,
            Self::Value,
            Self::MonthlyChange,
        ]
        .iter()
        .copied()
    }
}

/// 判斷月份代碼是否為 `M01`..`M12`，大小寫與位數必須完全相符
pub fn is_valid_period(period: &str) -> bool {
    REG_PERIOD.is_match(period)
}

use serde::{Deserialize, Serialize};

/// 單筆月度價格
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
    /// 資料序列代碼，原樣保留
    pub series_id: String,
    pub year: i32,
    /// 月份代碼 M01 ~ M12
    pub period: String,
    /// 顯示用的月份標籤，例如 "2023 Jan"
    pub month_label: String,
    pub value: f64,
    /// 與上月相比的漲跌，來源為 N/A 時為 None
    pub monthly_change: Option<f64>,
}

impl PriceRecord {
    pub fn is_in(&self, year: i32, period: &str) -> bool {
        self.year == year && self.period == period
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_serialize_camel_case() {
        let record = PriceRecord {
            series_id: "APU0000708111".to_string(),
            year: 2023,
            period: "M01".to_string(),
            month_label: "2023 Jan".to_string(),
            value: 4.823,
            monthly_change: None,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "seriesId": "APU0000708111",
                "year": 2023,
                "period": "M01",
                "monthLabel": "2023 Jan",
                "value": 4.823,
                "monthlyChange": null
            })
        );
    }

    #[test]
    fn test_is_in() {
        let record = PriceRecord {
            series_id: "S".to_string(),
            year: 2020,
            period: "M05".to_string(),
            month_label: "2020 May".to_string(),
            value: 1.5,
            monthly_change: Some(0.1),
        };

        assert!(record.is_in(2020, "M05"));
        assert!(!record.is_in(2020, "m05"));
        assert!(!record.is_in(2021, "M05"));
    }
}

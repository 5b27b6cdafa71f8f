use std::collections::BTreeMap;

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::record::PriceRecord;

/// 單一年度的價格統計
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YearlyAverage {
    pub year: i32,
    /// 年度平均價，四捨五入至小數第二位
    pub average_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

#[derive(Debug)]
struct Accumulator {
    total: f64,
    count: u32,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn new(value: f64) -> Self {
        Accumulator {
            total: value,
            count: 1,
            min: value,
            max: value,
        }
    }

    fn push(&mut self, value: f64) {
        self.total += value;
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

/// 依年份分組並計算平均、最低、最高價
///
/// 每個出現過的年份恰好產生一筆，結果依年份由小到大排序；
/// 沒有任何資料時回傳空集合。
pub fn calculate(records: &[PriceRecord]) -> Vec<YearlyAverage> {
    let mut groups: BTreeMap<i32, Accumulator> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.year)
            .and_modify(|acc| acc.push(record.value))
            .or_insert_with(|| Accumulator::new(record.value));
    }

    groups
        .into_iter()
        .map(|(year, acc)| YearlyAverage {
            year,
            average_price: round_price(acc.total / acc.count as f64),
            min_price: round_price(acc.min),
            max_price: round_price(acc.max),
        })
        .collect()
}

/// 四捨五入至小數第二位（0.5 一律遠離零）
///
/// 以 f64 實際的二進位值進位，1.005 實際上略小於 1.005，因此得到 1.00。
pub fn round_price(value: f64) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn record(year: i32, period: &str, value: f64) -> PriceRecord {
        PriceRecord {
            series_id: "APU0000708111".to_string(),
            year,
            period: period.to_string(),
            month_label: format!("{} {}", year, period),
            value,
            monthly_change: None,
        }
    }

    #[test]
    fn test_calculate() {
        let records = vec![
            record(2023, "M01", 3.50),
            record(2023, "M02", 4.00),
        ];

        assert_eq!(
            calculate(&records),
            vec![YearlyAverage {
                year: 2023,
                average_price: 3.75,
                min_price: 3.50,
                max_price: 4.00,
            }]
        );
    }

    #[test]
    fn test_calculate_sorted_by_year() {
        let records = vec![
            record(2021, "M01", 1.60),
            record(1995, "M01", 0.87),
            record(2021, "M02", 1.62),
            record(2008, "M01", 1.98),
            record(1995, "M02", 0.91),
        ];

        let result = calculate(&records);
        let years: Vec<i32> = result.iter().map(|y| y.year).collect();
        assert_eq!(years, vec![1995, 2008, 2021]);

        for y in &result {
            assert!(y.min_price <= y.average_price + 0.01, "{:?}", y);
            assert!(y.average_price <= y.max_price + 0.01, "{:?}", y);
        }

        assert_eq!(result[0].average_price, 0.89);
        assert_eq!(result[2].average_price, 1.61);
    }

    #[test]
    fn test_calculate_empty() {
        assert!(calculate(&[]).is_empty());
    }

    #[test]
    fn test_round_price() {
        assert_eq!(round_price(3.754), 3.75);
        assert_eq!(round_price(3.756), 3.76);
        assert_eq!(round_price(2.125), 2.13);
        assert_eq!(round_price(-2.125), -2.13);
        assert_eq!(round_price(4.0), 4.0);
        assert_eq!(Some(round_price(4.823)), dec!(4.82).to_f64());
    }

    #[test]
    fn test_round_price_binary_value() {
        assert_eq!(round_price(1.005), 1.0);
        assert_eq!(round_price(-1.005), -1.0);
        assert_eq!(round_price(1.015), 1.01);
        assert_eq!(round_price(0.125), 0.13);
    }

    #[test]
    fn test_calculate_average_below_midpoint() {
        let records = vec![record(2024, "M01", 1.004), record(2024, "M02", 1.006)];

        let result = calculate(&records);
        assert_eq!(result[0].average_price, 1.0);
        assert_eq!(result[0].min_price, 1.0);
        assert_eq!(result[0].max_price, 1.01);
    }

    #[test]
    fn test_serialize_camel_case() {
        let json = serde_json::to_string(&YearlyAverage {
            year: 2023,
            average_price: 3.75,
            min_price: 3.5,
            max_price: 4.0,
        })
        .unwrap();

        assert_eq!(
            json,
            r#"{"year":2023,"averagePrice":3.75,"minPrice":3.5,"maxPrice":4.0}"#
        );
    }
}

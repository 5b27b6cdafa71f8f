//! 價格資料的全域快取。
//!
//! 啟動時由背景工作讀取資料表，完整建好後透過 [`PriceStore::publish`]
//! 一次替換進來；在那之前任何查詢都看到空的資料集。
//! 發布之後資料不再變動，讀取端只需複製 `Arc` 即可並行查詢。

use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Result};

use crate::{logging, query::PriceQuery, record::PriceRecord};

/// 啟動後只發布一次的價格資料
#[derive(Debug, Default)]
pub struct PriceStore {
    records: RwLock<Arc<Vec<PriceRecord>>>,
}

impl PriceStore {
    /// 建立空的資料集，尚未載入任何資料
    pub fn new() -> Self {
        Default::default()
    }

    /// 以完整建好的資料取代目前內容，寫鎖失敗時回傳錯誤
    pub fn publish(&self, records: Vec<PriceRecord>) -> Result<()> {
        let records = Arc::new(records);
        match self.records.write() {
            Ok(mut current) => {
                logging::debug_file_async(format!("PriceStore published {} records", records.len()));
                *current = records;
                Ok(())
            }
            Err(why) => {
                logging::error_file_async(format!("Failed to records.write because {:?}", why));
                Err(anyhow!("Failed to publish price records because {}", why))
            }
        }
    }

    /// 取得目前資料的快照；尚未發布或讀鎖失敗時為空資料集
    pub fn snapshot(&self) -> Arc<Vec<PriceRecord>> {
        match self.records.read() {
            Ok(records) => Arc::clone(&records),
            Err(_) => Default::default(),
        }
    }

    /// 對目前快照建立查詢
    pub fn query(&self) -> PriceQuery {
        PriceQuery::new(self.snapshot())
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub mod cache;
pub mod calculation;
pub mod config;
pub mod declare;
pub mod logging;
pub mod query;
pub mod record;
pub mod source;
pub mod util;
pub mod web;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use crate::{cache::PriceStore, config::SETTINGS};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::info_file_async(format!("SETTINGS: {:?}", *SETTINGS));

    let store = Arc::new(PriceStore::new());
    let addr = SETTINGS.http_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    logging::info_console(format!("Server is running on {}", addr));

    // 監聽先開始，資料載入完成前查詢皆視為空資料集
    let loader = tokio::spawn(load(
        Arc::clone(&store),
        PathBuf::from(&SETTINGS.source.csv_path),
    ));
    let server = web::serve(listener, store);
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result,
        loaded = loader => {
            if let Err(why) = loaded.map_err(anyhow::Error::from).and_then(|r| r) {
                logging::error_console(format!("{:#}", why));
                logging::error_file_async(format!("{:#}", why));
                return Err(why);
            }
        }
    }

    server.await
}

/// 讀取價格資料表並發布到快取，找不到檔案或讀取失敗時回傳錯誤
async fn load(store: Arc<PriceStore>, path: PathBuf) -> Result<()> {
    let report = tokio::task::spawn_blocking(move || source::load_csv(path)).await??;

    logging::info_file_async(format!(
        "Price table loaded: rows {}, records {}, skipped {}",
        report.rows_read,
        report.records.len(),
        report.skipped.len()
    ));
    if !report.skipped.is_empty() {
        logging::info_console(format!(
            "{} malformed rows skipped, see log for details",
            report.skipped.len()
        ));
    }

    store.publish(report.records)?;
    logging::info_console(format!("CSV file successfully processed ({} records)", store.len()));
    if store.is_empty() {
        logging::warn_file_async("Price table has no usable records".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[tokio::test]
    async fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("egg.csv");
        fs::write(
            &path,
            "Series ID,Year,Period,Label,Value,1-Month Net Change\n\
             APU0000708111,2023,M01,2023 Jan,3.50,N/A\n\
             APU0000708111,2023,M02,2023 Feb,4.00,0.50\n\
             APU0000708111,year,M03,2023 Mar,4.10,0.10\n",
        )
        .unwrap();

        let store = Arc::new(PriceStore::new());
        load(Arc::clone(&store), path).await.unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.query().by_year(2023).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(PriceStore::new());

        let result = load(Arc::clone(&store), dir.path().join("missing.csv")).await;

        assert!(result.is_err());
        assert!(store.is_empty());
    }
}

use std::{env, path::PathBuf, str::FromStr};

use anyhow::Result;
use config::{Config as config_config, File as config_file};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::logging;

const CONFIG_PATH: &str = "app.json";

const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
const DEFAULT_HTTP_PORT: u16 = 3000;
const DEFAULT_CSV_PATH: &str = "egg.csv";

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct App {
    #[serde(default)]
    pub system: System,
    #[serde(default)]
    pub source: Source,
}

const HTTP_HOST: &str = "HTTP_HOST";
const PORT: &str = "PORT";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct System {
    #[serde(default = "default_http_host")]
    pub http_host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

impl Default for System {
    fn default() -> Self {
        System {
            http_host: default_http_host(),
            http_port: default_http_port(),
        }
    }
}

const PRICE_CSV_PATH: &str = "PRICE_CSV_PATH";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Source {
    /// 價格資料表的路徑
    #[serde(default = "default_csv_path")]
    pub csv_path: String,
}

impl Default for Source {
    fn default() -> Self {
        Source {
            csv_path: default_csv_path(),
        }
    }
}

fn default_http_host() -> String {
    DEFAULT_HTTP_HOST.to_string()
}

fn default_http_port() -> u16 {
    DEFAULT_HTTP_PORT
}

fn default_csv_path() -> String {
    DEFAULT_CSV_PATH.to_string()
}

pub static SETTINGS: Lazy<App> = Lazy::new(|| match App::get() {
    Ok(app) => app,
    Err(why) => {
        logging::error_console(format!(
            "I can't read the config context because {:?}",
            why
        ));
        App::default().override_with_env()
    }
});

impl App {
    /// 有設定檔時以設定檔為主，否則使用預設值；兩者都會再被 env 覆蓋
    fn get() -> Result<Self> {
        let config_path = config_path();
        if config_path.exists() {
            let config: App = config_config::builder()
                .add_source(config_file::from(config_path))
                .build()?
                .try_deserialize()?;
            return Ok(config.override_with_env());
        }

        Ok(App::default().override_with_env())
    }

    /// 將來至於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(mut self) -> Self {
        if let Ok(host) = env::var(HTTP_HOST) {
            self.system.http_host = host;
        }

        if let Ok(port) = env::var(PORT) {
            self.system.http_port = u16::from_str(port.trim()).unwrap_or(DEFAULT_HTTP_PORT);
        }

        if let Ok(path) = env::var(PRICE_CSV_PATH) {
            self.source.csv_path = path;
        }

        self
    }

    /// HTTP 服務監聽的位址
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.system.http_host, self.system.http_port)
    }
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    #[test]
    fn test_default() {
        let app = App::default();
        assert_eq!(app.system.http_port, 3000);
        assert_eq!(app.system.http_host, "0.0.0.0");
        assert_eq!(app.source.csv_path, "egg.csv");
        assert_eq!(app.http_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_from_json() {
        let app: App = config_config::builder()
            .add_source(config_file::from_str(
                r#"{ "system": { "http_port": 8080 }, "source": { "csv_path": "data/egg.csv" } }"#,
                FileFormat::Json,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(app.system.http_port, 8080);
        assert_eq!(app.system.http_host, "0.0.0.0");
        assert_eq!(app.source.csv_path, "data/egg.csv");
    }

    #[test]
    fn test_from_empty_json() {
        let app: App = config_config::builder()
            .add_source(config_file::from_str("{}", FileFormat::Json))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(app, App::default());
    }
}

use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    time::UNIX_EPOCH,
};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, TimeDelta};
use rayon::prelude::*;

use crate::logging;

/// 預設單檔最大大小：10 MB
const DEFAULT_MAX_SIZE: u64 = 10 * 1024 * 1024;
/// 預設保留天數：7 天
const DEFAULT_MAX_AGE_DAYS: i64 = 7;

/// 依日期與檔案大小輪轉的日誌檔
pub struct Rotate {
    /// 檔名模式，例如 "log/%Y-%m-%d-name.log"
    fn_pattern: String,
    /// 當前基礎檔名（不含 generation，由日期決定）
    cur_base_fn: String,
    /// 當前完整檔名（含 generation）
    cur_fn: String,
    out_fh: Option<BufWriter<File>>,
    /// 當前世代編號，只增不減
    generation: u32,
    max_size: u64,
    current_size: u64,
    max_age: TimeDelta,
}

impl Rotate {
    /// 預設值：單檔 10 MB、保留 7 天
    pub fn new(fn_pattern: String) -> Self {
        Self::with_options(fn_pattern, DEFAULT_MAX_SIZE, DEFAULT_MAX_AGE_DAYS)
    }

    pub fn with_options(fn_pattern: String, max_size: u64, max_age_days: i64) -> Self {
        Rotate {
            fn_pattern,
            cur_base_fn: String::new(),
            cur_fn: String::new(),
            out_fh: None,
            generation: 0,
            max_size,
            current_size: 0,
            max_age: TimeDelta::try_days(max_age_days).unwrap_or(TimeDelta::days(DEFAULT_MAX_AGE_DAYS)),
        }
    }

    /// 寫入日誌訊息，日期變更或檔案超過大小時自動換檔
    pub fn write_msg(&mut self, now: DateTime<Local>, msg: &[u8]) -> Result<()> {
        let base_fn = now.format(&self.fn_pattern).to_string();
        if base_fn != self.cur_base_fn {
            self.cur_base_fn = base_fn;
            self.generation = 0;
            self.open_new_file()?;
            self.cleanup_old_files(now);
        } else if self.current_size + msg.len() as u64 > self.max_size && self.current_size > 0 {
            self.generation += 1;
            self.open_new_file()?;
        }

        let writer = self
            .out_fh
            .as_mut()
            .ok_or_else(|| anyhow!("log file {} is not open", self.cur_fn))?;
        writer.write_all(msg)?;
        self.current_size += msg.len() as u64;

        Ok(())
    }

    pub fn flush(&mut self) {
        if let Some(writer) = self.out_fh.as_mut() {
            if let Err(why) = writer.flush() {
                logging::error_console(format!("Failed to flush {} because {:?}", self.cur_fn, why));
            }
        }
    }

    pub fn current_file(&self) -> &str {
        &self.cur_fn
    }

    /// generation = 0: "log/2025-02-03-app.log"
    /// generation = 2: "log/2025-02-03-app.2.log"
    fn generate_full_fn(base_fn: &str, generation: u32) -> String {
        if generation == 0 {
            return base_fn.to_string();
        }

        let path = Path::new(base_fn);
        let parent = path.parent().unwrap_or(Path::new(""));
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("log");
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("log");

        parent
            .join(format!("{}.{}.{}", stem, generation, ext))
            .to_string_lossy()
            .to_string()
    }

    fn open_new_file(&mut self) -> Result<()> {
        self.flush();

        let filename = Self::generate_full_fn(&self.cur_base_fn, self.generation);
        if let Some(parent) = Path::new(&filename).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&filename)?;
        self.current_size = file.metadata().map(|m| m.len()).unwrap_or(0);
        self.out_fh = Some(BufWriter::with_capacity(4096, file));
        self.cur_fn = filename;

        Ok(())
    }

    /// 刪除同目錄下修改時間超過 max_age 的 .log 檔
    fn cleanup_old_files(&self, now: DateTime<Local>) {
        let cut_off = (now - self.max_age).timestamp().max(0) as u64;
        let files = match Self::log_files_beside(&self.cur_fn) {
            Ok(files) => files,
            Err(why) => {
                logging::error_console(format!(
                    "Failed to list log files beside {} because {:?}",
                    self.cur_fn, why
                ));
                return;
            }
        };

        let to_unlink: Vec<PathBuf> = files
            .into_iter()
            .filter(|file| file.to_string_lossy() != self.cur_fn)
            .filter(|file| {
                fs::metadata(file)
                    .and_then(|metadata| metadata.modified())
                    .ok()
                    .and_then(|modified| modified.duration_since(UNIX_EPOCH).ok())
                    .is_some_and(|duration| duration.as_secs() <= cut_off)
            })
            .collect();

        to_unlink
            .par_iter()
            .with_min_len(num_cpus::get())
            .for_each(|unlink| {
                if let Err(why) = fs::remove_file(unlink) {
                    logging::error_console(format!(
                        "couldn't remove the file({}). because {:?}",
                        unlink.display(),
                        why
                    ));
                }
            });
    }

    fn log_files_beside(file_path: &str) -> Result<Vec<PathBuf>, io::Error> {
        let parent_dir = match Path::new(file_path).parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(parent_dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "log") {
                files.push(path);
            }
        }

        Ok(files)
    }
}

impl Drop for Rotate {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use std::fs::FileTimes;
    use std::time::{Duration, SystemTime};

    use super::*;

    fn pattern(dir: &Path, name: &str) -> String {
        dir.join(format!("%Y-%m-%d-{}.log", name))
            .to_string_lossy()
            .to_string()
    }

    #[test]
    fn test_generation_filename() {
        let base = "log/2025-02-03-app.log";
        assert_eq!(Rotate::generate_full_fn(base, 0), "log/2025-02-03-app.log");
        assert_eq!(Rotate::generate_full_fn(base, 1), "log/2025-02-03-app.1.log");
        assert_eq!(Rotate::generate_full_fn(base, 2), "log/2025-02-03-app.2.log");
    }

    #[test]
    fn test_basic_write() {
        let dir = tempfile::tempdir().unwrap();
        let mut r = Rotate::new(pattern(dir.path(), "basic"));
        let now = Local::now();

        r.write_msg(now, b"hello\r\n").unwrap();
        r.flush();

        let content = fs::read_to_string(r.current_file()).unwrap();
        assert_eq!(content, "hello\r\n");
    }

    #[test]
    fn test_date_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let mut r = Rotate::new(pattern(dir.path(), "date"));
        let now = Local::now();

        r.write_msg(now, b"day 1\r\n").unwrap();
        let first = r.current_file().to_string();

        let tomorrow = now + TimeDelta::try_days(1).unwrap();
        r.write_msg(tomorrow, b"day 2\r\n").unwrap();
        r.flush();

        assert_ne!(first, r.current_file());
        assert_eq!(fs::read_to_string(&first).unwrap(), "day 1\r\n");
        assert_eq!(fs::read_to_string(r.current_file()).unwrap(), "day 2\r\n");
    }

    /// generation 只增不減，且不會覆蓋舊檔案
    #[test]
    fn test_size_rotation_no_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let mut r = Rotate::with_options(pattern(dir.path(), "size"), 512, 7);
        let now = Local::now();

        for i in 0..50 {
            let msg = format!("Line {:03} - {}\r\n", i, "X".repeat(50));
            r.write_msg(now, msg.as_bytes()).unwrap();
        }
        r.flush();

        assert!(r.generation >= 3, "generation: {}", r.generation);

        let files = Rotate::log_files_beside(r.current_file()).unwrap();
        assert_eq!(files.len() as u32, r.generation + 1);

        let total: u64 = files.iter().map(|f| fs::metadata(f).unwrap().len()).sum();
        assert_eq!(total, 50 * 63);
        for file in &files {
            assert!(fs::metadata(file).unwrap().len() <= 512);
        }
    }

    #[test]
    fn test_cleanup_old_files() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("2000-01-01-old.log");
        let keep = dir.path().join("notes.txt");
        fs::write(&stale, "old").unwrap();
        fs::write(&keep, "keep").unwrap();

        let old = SystemTime::now() - Duration::from_secs(30 * 24 * 60 * 60);
        let file = OpenOptions::new().write(true).open(&stale).unwrap();
        file.set_times(FileTimes::new().set_modified(old)).unwrap();
        drop(file);

        let mut r = Rotate::new(pattern(dir.path(), "cleanup"));
        r.write_msg(Local::now(), b"x").unwrap();

        assert!(!stale.exists());
        assert!(keep.exists());
        assert!(Path::new(r.current_file()).exists());
    }
}

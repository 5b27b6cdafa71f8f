use std::thread;

use chrono::{format::DelayedFormat, DateTime, Local};
use once_cell::sync::Lazy;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use crate::logging::rotate::Rotate;

pub mod rotate;

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("default"));

#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Level {
    Info,
    Warn,
    Error,
    Debug,
}

pub struct LogMessage {
    pub level: Level,
    pub msg: String,
    pub created_at: DateTime<Local>,
}

impl LogMessage {
    pub fn new(level: Level, msg: String) -> Self {
        LogMessage {
            level,
            msg,
            created_at: Local::now(),
        }
    }

    fn to_line(&self) -> String {
        format!(
            "{} {} {}\r\n",
            self.created_at.format("%F %X%.6f"),
            self.level,
            self.msg
        )
    }
}

pub struct Logger {
    writer: UnboundedSender<LogMessage>,
}

impl Logger {
    fn new(log_name: &str) -> Self {
        let (tx, mut rx) = unbounded_channel::<LogMessage>();
        let mut rotate = Rotate::new(format!("log/%Y-%m-%d-{}.log", log_name));

        // 寫入檔案的操作使用另一個線程處理
        thread::spawn(move || {
            let mut together = String::with_capacity(4096);
            let mut last = Local::now();

            while let Some(received) = rx.blocking_recv() {
                last = received.created_at;
                together.push_str(&received.to_line());

                if rx.is_empty() || together.len() >= 4096 {
                    if let Err(why) = rotate.write_msg(last, together.as_bytes()) {
                        error_console(format!(
                            "Failed to write log {} because {:?}",
                            rotate.current_file(),
                            why
                        ));
                        info_console(together.clone());
                    }
                    rotate.flush();
                    together.clear();
                }
            }

            if !together.is_empty() {
                let _ = rotate.write_msg(last, together.as_bytes());
            }
        });

        Logger { writer: tx }
    }

    fn send(&self, level: Level, msg: String) {
        if let Err(why) = self.writer.send(LogMessage::new(level, msg)) {
            error_console(why.to_string());
        }
    }
}

pub fn info_file_async(log: String) {
    LOGGER.send(Level::Info, log);
}

pub fn warn_file_async(log: String) {
    LOGGER.send(Level::Warn, log);
}

pub fn error_file_async(log: String) {
    LOGGER.send(Level::Error, log);
}

pub fn debug_file_async(log: String) {
    LOGGER.send(Level::Debug, log);
}

pub fn info_console(log: String) {
    println!(
        "{} Info {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        log
    );
}

pub fn error_console(log: String) {
    println!(
        "{} Error {}",
        DelayedFormat::to_string(&Local::now().format("%Y-%m-%d %H:%M:%S.%3f")),
        log
    );
}

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use chrono::Local;
use colored::Colorize;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Logger that formats on the calling thread and writes on a background one,
/// so decoding never blocks on stdout or the log file.
pub struct AsyncLogger {
    sender: Sender<LogMessage>,
    level: LevelFilter,
}

enum LogMessage {
    Line {
        level: Level,
        message: String,
        timestamp: String,
        target: String,
    },
    Flush(Sender<()>),
}

/// Installs the global logger. With `log_dir` set, every line is also
/// appended to a timestamped file in that directory.
pub fn init(level: LevelFilter, log_dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let file = match log_dir {
        Some(dir) => Some(open_log_file(dir)?),
        None => None,
    };

    let (tx, rx) = unbounded();
    thread::Builder::new()
        .name("protocol-logger".into())
        .spawn(move || AsyncLogger::logger_thread(rx, file))?;

    log::set_boxed_logger(Box::new(AsyncLogger { sender: tx, level }))?;
    log::set_max_level(level);
    Ok(())
}

fn open_log_file(dir: &Path) -> std::io::Result<File> {
    fs::create_dir_all(dir)?;
    let now = Local::now();
    let path: PathBuf = dir.join(format!("{}_{}_protocol.log", now.format("%Y-%m-%d"), now.format("%H-%M-%S")));
    OpenOptions::new().create(true).append(true).open(path)
}

/// Keeps the last path segment, `hytale_protocol::network::packet::packet_io` -> `packet_io`.
fn short_target(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

impl AsyncLogger {
    fn logger_thread(rx: Receiver<LogMessage>, mut file: Option<File>) {
        while let Ok(msg) = rx.recv() {
            match msg {
                LogMessage::Line { level, message, timestamp, target } => {
                    if let Some(file) = file.as_mut() {
                        let line = format!("[{}] [{}] [{}] {}\n", timestamp, level, target, message);
                        let _ = file.write_all(line.as_bytes());
                    }

                    let level = level.as_str();
                    let level_colored = match level {
                        "ERROR" => level.red().bold(),
                        "WARN" => level.yellow().bold(),
                        "INFO" => level.green().bold(),
                        "DEBUG" => level.blue().bold(),
                        _ => level.purple().bold(),
                    };
                    println!("[{}] [{}] [{}] {}", timestamp, level_colored, target, message);
                }
                LogMessage::Flush(ack) => {
                    if let Some(file) = file.as_mut() {
                        let _ = file.flush();
                    }
                    let _ = std::io::stdout().flush();
                    let _ = ack.send(());
                }
            }
        }

        if let Some(mut file) = file {
            let _ = file.flush();
        }
    }
}

impl Log for AsyncLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let _ = self.sender.try_send(LogMessage::Line {
            level: record.level(),
            message: record.args().to_string(),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            target: short_target(record.target()).to_string(),
        });
    }

    /// Blocks until every line queued before the call has been written.
    fn flush(&self) {
        let (ack, done) = bounded(1);
        if self.sender.send(LogMessage::Flush(ack)).is_ok() {
            let _ = done.recv();
        }
    }
}

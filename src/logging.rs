//! File logging through log4rs
//!
//! Library crates only use the `log` facade; the binary installs this logger once.

use anyhow::Result;
use log::LevelFilter;
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};

pub const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} {t} {m}{n}";

/// Build the log4rs config writing `level` and above to `file_path`
pub fn log_config(level: LevelFilter, file_path: &str) -> Result<Config> {
    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(file_path)?;
    let config = Config::builder()
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(level)))
                .build("logfile", Box::new(logfile)),
        )
        .build(Root::builder().appender("logfile").build(level))?;
    Ok(config)
}

/// Install the file logger. Fails if a logger is already set.
pub fn init_log(level: LevelFilter, file_path: &str) -> Result<()> {
    let _handle = log4rs::init_config(log_config(level, file_path)?)?;
    Ok(())
}

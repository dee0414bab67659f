use anyhow::Result;
use simplelog::{
    ColorChoice, ConfigBuilder, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fs::File;
use std::path::Path;

pub use simplelog::LevelFilter;

/// Terminal logger, plus a per-run log file when `log_file` is given.
/// Call once at startup, before any processing.
pub fn init(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ));
    if let Some(path) = log_file {
        loggers.push(WriteLogger::new(level, config, File::create(path)?));
    }
    simplelog::CombinedLogger::init(loggers)?;
    Ok(())
}

use crate::config::{PipelineConfig, PipelineMode};
use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, Metadata, Record};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

static CONSOLE_LOGGER: Lazy<ConsoleLogger> = Lazy::new(ConsoleLogger::new);

pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    let max_level = config.min_level.to_log_level_filter();
    CONSOLE_LOGGER.update_config(config);

    if let Err(e) = log::set_logger(&*CONSOLE_LOGGER) {
        return Err(format!("Failed to set logger: {:?}", e));
    }

    log::set_max_level(max_level);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn color(&self) -> Color {
        match self {
            LogLevel::Trace => Color::Cyan,
            LogLevel::Debug => Color::Blue,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            LogLevel::Trace => "🔍",
            LogLevel::Debug => "🐛",
            LogLevel::Info => "💡",
            LogLevel::Warn => "⚠️",
            LogLevel::Error => "❌",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn to_log_level(&self) -> Level {
        match self {
            LogLevel::Trace => Level::Trace,
            LogLevel::Debug => Level::Debug,
            LogLevel::Info => Level::Info,
            LogLevel::Warn => Level::Warn,
            LogLevel::Error => Level::Error,
        }
    }

    pub fn to_log_level_filter(&self) -> log::LevelFilter {
        self.to_log_level().to_level_filter()
    }

    pub fn from_log_level(level: Level) -> Self {
        match level {
            Level::Trace => LogLevel::Trace,
            Level::Debug => LogLevel::Debug,
            Level::Info => LogLevel::Info,
            Level::Warn => LogLevel::Warn,
            Level::Error => LogLevel::Error,
        }
    }

    /// Parses `RUST_LOG`-style names; unknown names give `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// One log line, as written in JSON mode.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub module: String,
    pub file: String,
    pub line: u32,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: String, module: String, file: String, line: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            level,
            message,
            module,
            file,
            line,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub show_colors: bool,
    pub show_emojis: bool,
    pub show_file_location: bool,
    pub show_module: bool,
    pub include_timestamp: bool,
    pub timestamp_format: String,
    pub output_json: bool,
    pub log_to_file: bool,
    pub log_file_path: String,
    pub custom_prefix: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: true,
            show_emojis: true,
            show_file_location: false,
            show_module: false,
            include_timestamp: true,
            timestamp_format: "%H:%M:%S%.3f".to_string(),
            output_json: false,
            log_to_file: false,
            log_file_path: "drawbatch.log".to_string(),
            custom_prefix: None,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.show_colors = enabled;
        self
    }

    pub fn with_file_output(mut self, path: &str) -> Self {
        self.log_to_file = true;
        self.log_file_path = path.to_string();
        self
    }

    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.output_json = enabled;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.custom_prefix = Some(prefix.into());
        self
    }

    pub fn production() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: false,
            show_emojis: false,
            output_json: true,
            log_to_file: true,
            ..Default::default()
        }
    }

    pub fn development() -> Self {
        Self {
            min_level: LogLevel::Debug,
            show_colors: true,
            show_emojis: true,
            output_json: false,
            show_file_location: true,
            show_module: true,
            ..Default::default()
        }
    }

    /// Reads `DRAWTHINGS_LOG_PROFILE` (`development` | `production`),
    /// then lets `DRAWTHINGS_LOG`, `DRAWTHINGS_LOG_JSON` and
    /// `DRAWTHINGS_LOG_FILE` adjust the profile.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("DRAWTHINGS_LOG_PROFILE")
            .map(|p| p.trim().to_ascii_lowercase())
            .as_deref()
        {
            Some("production") => Self::production(),
            Some("development") => Self::development(),
            _ => Self::new(),
        };

        if let Some(level) = lookup("DRAWTHINGS_LOG").and_then(|l| LogLevel::parse(&l)) {
            config = config.with_level(level);
        }
        if let Some(json) = lookup("DRAWTHINGS_LOG_JSON") {
            config = config.with_json_output(json.trim().eq_ignore_ascii_case("true"));
        }
        if let Some(path) = lookup("DRAWTHINGS_LOG_FILE").filter(|p| !p.trim().is_empty()) {
            config = config.with_file_output(&path);
        }
        config
    }

    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }
}

pub struct ConsoleLogger {
    config: Mutex<LoggerConfig>,
    log_file: Mutex<Option<File>>,
}

impl ConsoleLogger {
    pub fn new() -> Self {
        Self {
            config: Mutex::new(LoggerConfig::default()),
            log_file: Mutex::new(None),
        }
    }

    pub fn update_config(&self, new_config: LoggerConfig) {
        if new_config.log_to_file {
            match OpenOptions::new()
                .create(true)
                .append(true)
                .open(&new_config.log_file_path)
            {
                Ok(file) => {
                    if let Ok(mut log_file) = self.log_file.lock() {
                        *log_file = Some(file);
                    }
                }
                Err(e) => eprintln!(
                    "could not open log file {}: {}",
                    new_config.log_file_path, e
                ),
            }
        }

        if let Ok(mut config) = self.config.lock() {
            *config = new_config;
        }
    }

    fn format_line(&self, entry: &LogEntry, config: &LoggerConfig) -> String {
        let mut output = String::new();
        let colors = config.show_colors;

        if let Some(prefix) = &config.custom_prefix {
            if colors {
                output.push_str(&format!("[{}] ", prefix.bright_white().bold()));
            } else {
                output.push_str(&format!("[{}] ", prefix));
            }
        }

        if config.include_timestamp {
            let timestamp = entry.timestamp.format(&config.timestamp_format).to_string();
            if colors {
                output.push_str(&format!("{} ", timestamp.bright_black()));
            } else {
                output.push_str(&format!("{} ", timestamp));
            }
        }

        let level_str = if config.show_emojis {
            format!("{} {}", entry.level.emoji(), entry.level.as_str())
        } else {
            entry.level.as_str().to_string()
        };
        if colors {
            output.push_str(&format!("[{}] ", level_str.color(entry.level.color()).bold()));
        } else {
            output.push_str(&format!("[{}] ", level_str));
        }

        if config.show_module && !entry.module.is_empty() {
            if colors {
                output.push_str(&format!("{}::", entry.module.bright_blue()));
            } else {
                output.push_str(&format!("{}::", entry.module));
            }
        }

        output.push_str(&entry.message);

        if config.show_file_location {
            let location = format!("{}:{}", entry.file, entry.line);
            if colors {
                output.push_str(&format!(" ({})", location.bright_black()));
            } else {
                output.push_str(&format!(" ({})", location));
            }
        }

        output
    }

    fn render(&self, entry: &LogEntry, config: &LoggerConfig) -> String {
        if config.output_json {
            serde_json::to_string(entry).unwrap_or_default()
        } else {
            self.format_line(entry, config)
        }
    }

    fn write_to_file(&self, line: &str) {
        if let Ok(mut guard) = self.log_file.lock() {
            if let Some(ref mut file) = *guard {
                let _ = writeln!(file, "{}", line);
                let _ = file.flush();
            }
        }
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        match self.config.lock() {
            Ok(config) => metadata.level() <= config.min_level.to_log_level(),
            Err(_) => true,
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = LogEntry::new(
            LogLevel::from_log_level(record.level()),
            record.args().to_string(),
            record.module_path().unwrap_or("unknown").to_string(),
            record.file().unwrap_or("unknown").to_string(),
            record.line().unwrap_or(0),
        );

        if let Ok(config) = self.config.lock() {
            println!("{}", self.render(&entry, &config));

            if config.log_to_file {
                // Files never get ANSI escapes.
                let plain = LoggerConfig {
                    show_colors: false,
                    ..config.clone()
                };
                self.write_to_file(&self.render(&entry, &plain));
            }
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        if let Ok(mut guard) = self.log_file.lock() {
            if let Some(ref mut file) = *guard {
                let _ = file.flush();
            }
        }
    }
}

/// Logs how long a generation stage took when dropped.
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        log::debug!("⏱️  Starting: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::info!(
            "⏱️  {} took {:.2}s",
            self.name,
            self.elapsed().as_secs_f64()
        );
    }
}

pub fn timer(name: &str) -> Timer {
    Timer::new(name)
}

pub fn log_startup_info(app_name: &str, version: &str, front_end: &str) {
    log::info!("🚀 Starting {} v{} ({})", app_name, version, front_end);
}

pub fn log_config_info(config: &PipelineConfig) {
    log::info!("⚙️  Configuration loaded:");
    log::info!("   Image endpoint: {}", config.image_endpoint);
    log::info!("   Output folder: {}", config.output_dir.display());
    log::info!(
        "   Mode: {}",
        match config.mode {
            PipelineMode::Single => "single pass",
            PipelineMode::Chained => "generate then refine",
        }
    );
    log::info!(
        "   Stage 1: {} steps, guidance {}, model {}",
        config.generation.steps,
        config.generation.guidance_scale,
        config.generation.model.as_deref().unwrap_or("server default")
    );
    log::info!(
        "   Stage 2: model {}, denoising strength {}",
        config.refinement.model.as_deref().unwrap_or("server default"),
        config.denoising_strength
    );
    log::debug!("   Language model: {} at {}", config.language_model.model, config.language_model.endpoint);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_levels() {
        assert_eq!(LogLevel::Info.as_str(), "INFO");
        assert_eq!(LogLevel::Error.emoji(), "❌");
        assert_eq!(LogLevel::Debug.color(), Color::Blue);
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("loud"), None);
    }

    #[test]
    fn test_logger_config() {
        let config = LoggerConfig::development();
        assert_eq!(config.min_level, LogLevel::Debug);
        assert!(config.show_colors);

        let prod_config = LoggerConfig::production();
        assert!(!prod_config.show_colors);
        assert!(prod_config.output_json);
    }

    #[test]
    fn plain_line_has_level_and_message() {
        let logger = ConsoleLogger::new();
        let config = LoggerConfig::new()
            .with_colors(false)
            .with_prefix("batch");
        let entry = LogEntry::new(
            LogLevel::Warn,
            "slow render".into(),
            "drawbatch::pipeline".into(),
            "src/pipeline/stages.rs".into(),
            10,
        );
        let line = logger.format_line(&entry, &config);
        assert!(line.starts_with("[batch] "));
        assert!(line.contains("WARN"));
        assert!(line.ends_with("slow render"));
    }

    #[test]
    fn test_logger_initialization() {
        let config = LoggerConfig::development();
        assert!(init_with_config(config).is_ok());
    }

    #[test]
    fn profile_and_overrides_from_vars() {
        let vars: std::collections::HashMap<&str, &str> = [
            ("DRAWTHINGS_LOG_PROFILE", "Production"),
            ("DRAWTHINGS_LOG", "debug"),
            ("DRAWTHINGS_LOG_FILE", "/tmp/drawbatch-run.log"),
        ]
        .into_iter()
        .collect();
        let config = LoggerConfig::from_vars(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.min_level, LogLevel::Debug);
        assert!(config.output_json);
        assert!(config.log_to_file);
        assert_eq!(config.log_file_path, "/tmp/drawbatch-run.log");

        let plain = LoggerConfig::from_vars(|key| {
            (key == "DRAWTHINGS_LOG_JSON").then(|| "true".to_string())
        });
        assert!(plain.output_json);
        assert!(!plain.log_to_file);
        assert_eq!(plain.min_level, LogLevel::Info);
    }

    #[test]
    fn json_lines_reach_the_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.log");
        let logger = ConsoleLogger::new();
        logger.update_config(
            LoggerConfig::new()
                .with_json_output(true)
                .with_file_output(&path.to_string_lossy()),
        );

        log::Log::log(
            &logger,
            &Record::builder()
                .args(format_args!("item 3 refined"))
                .level(Level::Warn)
                .module_path(Some("drawbatch::pipeline"))
                .build(),
        );

        let written = std::fs::read_to_string(&path).unwrap();
        let line: serde_json::Value = serde_json::from_str(written.trim()).unwrap();
        assert_eq!(line["message"], "item 3 refined");
        assert_eq!(line["level"], "Warn");
        assert_eq!(line["module"], "drawbatch::pipeline");
    }
}

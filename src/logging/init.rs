use color_eyre::eyre::Result;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};
use super::{LogConfig, LOG_FILENAME};
use tracing::Level;
fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tagspace={level}")))
}
/// Initialize the logging system with the given configuration.
///
/// Logs go to a rolling file and to stderr, so command output on stdout
/// stays clean.
///
/// # Errors
///
/// Returns an error if the log directory can't be created or a global
/// subscriber is already installed.
pub fn init_logging(config: LogConfig) -> Result<()> {
    std::fs::create_dir_all(&config.log_dir)?;
    let level = config.log_level;
    let file_appender = RollingFileAppender::new(config.rotation, &config.log_dir, LOG_FILENAME);
    if config.json_format {
        let json_file_layer = fmt::layer()
            .json().with_writer(file_appender).with_span_events(FmtSpan::CLOSE)
            .with_current_span(true).with_target(true)
            .with_filter(env_filter(level));
        let json_stderr_layer = fmt::layer()
            .json().with_writer(std::io::stderr).with_span_events(FmtSpan::CLOSE)
            .with_current_span(true).with_target(true).with_filter(env_filter(level));
        tracing_subscriber::registry()
            .with(json_file_layer).with(json_stderr_layer).with(ErrorLayer::default()).try_init()?;
    } else {
        let file_layer = fmt::layer()
            .with_writer(file_appender).with_span_events(FmtSpan::CLOSE)
            .with_target(true).with_ansi(false)
            .with_filter(env_filter(level));
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr).with_span_events(FmtSpan::CLOSE)
            .with_ansi(true).with_filter(env_filter(level));
        tracing_subscriber::registry()
            .with(file_layer).with(stderr_layer).with(ErrorLayer::default()).try_init()?;
    }
    Ok(())
}
/// Parse rotation period from string.
pub fn parse_rotation(s: &str) -> Rotation {
    match s.to_lowercase().as_str() {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

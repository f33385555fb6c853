use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use reel_core::config::AppConfig;

const LOG_FILE_PREFIX: &str = "reel.log";

/// Install the global subscriber. `RUST_LOG` wins over the built-in filter.
///
/// The returned guard flushes the file writer and must be held until exit.
pub fn init(config: &AppConfig, verbose: bool) -> Option<WorkerGuard> {
    let default = if verbose { "reel=debug" } else { "reel=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let stderr = fmt::layer().with_writer(std::io::stderr).with_target(false);

    if !config.general.log_to_file {
        tracing_subscriber::registry().with(filter).with(stderr).init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(AppConfig::data_dir(), LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();
    Some(guard)
}

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 默认日志过滤规则
pub const DEFAULT_FILTER: &str = "recq_lib=debug,warn";

/// Initialize logging with tracing
///
/// This function sets up the tracing subscriber with the following configuration:
/// - Reads filter from RUST_LOG environment variable if available
/// - Falls back to "recq_lib=debug,warn" if RUST_LOG is not set
/// - Uses a formatted output layer
///
/// Calling it more than once is harmless: later calls keep the first subscriber.
///
/// # Example
///
/// ```no_run
/// use recq_lib::utils::logging::init_logging;
///
/// init_logging();
/// ```
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("recq logging initialized");
    }
}

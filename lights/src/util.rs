#[macro_export]
macro_rules! error_with_location {
    ($msg:expr) => {
        ::anyhow::anyhow!("{} at {}:{}", $msg, file!(), line!())
    };
    ($fmt:expr, $($arg:tt)*) => {
        ::anyhow::anyhow!("{} at {}:{}", format!($fmt, $($arg)*), file!(), line!())
    };
}

/// Logs to stderr; `RUST_LOG` overrides the default level.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

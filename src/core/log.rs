use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

/// Installs the global subscriber. `RUST_LOG` takes precedence over the
/// verbosity flag when set.
pub fn init_logging(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(log_filter(verbose, rust_log.as_deref()))
        .init();
}

fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    if let Some(filter) = rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
    {
        return filter;
    }
    let level = if verbose { "debug" } else { "info" };
    EnvFilter::new(format!("info,dipdca={level}"))
}

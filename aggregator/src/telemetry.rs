use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the global `tracing` subscriber. `RUST_LOG` takes precedence over
/// `filter`; an unparsable filter falls back to `info`.
///
/// Calling it twice is harmless: the second installation is ignored.
pub fn init_tracing(filter: &str) {
    let env_filter: EnvFilter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::init_tracing;

    #[test]
    fn init_is_idempotent() {
        init_tracing("debug");
        init_tracing("not a [filter");
        tracing::info!("tracing ready");
    }
}

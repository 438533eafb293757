use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,kestrel=debug,kestrel_input=debug,winit=info";

/// Install the global fmt subscriber, reading directives from `RUST_LOG`.
///
/// Calling this more than once is harmless; only the first subscriber wins.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    install(filter);
}

/// Install the global fmt subscriber with explicit filter directives.
pub fn init_with_filter(directives: &str) {
    install(EnvFilter::new(directives));
}

fn install(filter: EnvFilter) {
    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        tracing::trace!("global tracing subscriber already installed");
    }
}

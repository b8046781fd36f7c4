use tracing_subscriber::EnvFilter;

/// Install the global subscriber, writing to stderr so stdout stays clean for
/// chapter output.
///
/// Without `-v` flags the filter comes from `RUST_LOG`, defaulting to `warn`.
pub fn init(verbosity: u8) {
    let filter = match directive(verbosity) {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    // Only fails if a subscriber is already installed.
    _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn directive(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

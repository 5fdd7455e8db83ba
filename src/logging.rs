use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Overrides the verbosity flags with a full `EnvFilter` directive.
pub const LOG_ENV: &str = "SHOEBOX_LOG";

pub fn init(verbosity: u8) {
    let default = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

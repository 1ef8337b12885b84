mod aggregate;
mod config;
mod error;
mod models;
mod run;
mod store;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn main() -> Result<()> {
    setup_logging();

    let mut args: Vec<String> = std::env::args().collect();
    let config = config::Config::from_args(&mut args)?;
    let store = store::Store::new(config.data_file);
    run::as_cli(&args, &store)
}

/// Log to stderr so command output stays clean. `RUST_LOG` overrides the
/// default `warn` level.
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .init();
}

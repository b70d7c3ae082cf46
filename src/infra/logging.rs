use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEBUG_ENV: &str = "BRIEFLY_DEBUG";

/// Installs the global subscriber, writing to stderr so stdout stays clean for summaries.
///
/// `RUST_LOG` wins; otherwise `BRIEFLY_DEBUG` turns on debug output for this crate.
pub fn init_tracing(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if std::env::var(DEBUG_ENV).is_ok() {
            EnvFilter::new("briefly=debug")
        } else {
            EnvFilter::new(format!("briefly={default_level}"))
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()?;

    Ok(())
}

use anyhow::Result;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Initialize the logger.
///
/// `RUST_LOG` overrides the level picked from the verbosity count. Logs go
/// to stderr so that `--json` output on stdout stays parseable. Records
/// emitted through the `log` facade by the library are forwarded too.
pub fn init(verbosity: u8) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level(verbosity).into())
        .from_env_lossy();

    let stderr_log = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(stderr_log).try_init()?;

    Ok(())
}

fn default_level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

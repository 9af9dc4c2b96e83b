use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber: `RUST_LOG` filtering, `info` by default.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    install(filter)
}

/// Like [`init`], but always at `debug`.
pub fn init_verbose() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    install(EnvFilter::try_new("debug")?)
}

fn install(filter: EnvFilter) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

use anyhow::{Result, anyhow};
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

pub struct LogConfig {
    pub filter: String,
}

/// Stderr logger whose filter can be swapped once settings are loaded.
/// Stdout is left to command output.
pub struct Logger {
    reload_handle: reload::Handle<EnvFilter, Registry>,
}

impl Logger {
    /// Starts at `RUST_LOG` when set, `info` otherwise.
    pub fn new_bootstrap() -> Self {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let (filter, reload_handle) = reload::Layer::new(filter);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .init();

        Self { reload_handle }
    }

    /// `RUST_LOG` keeps precedence over the configured filter.
    pub fn reload_from_config(&self, config: &LogConfig) -> Result<()> {
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            return Ok(());
        }
        let filter = EnvFilter::try_new(&config.filter).map_err(|e| anyhow!(e))?;
        self.reload_handle.reload(filter).map_err(|e| anyhow!(e))?;
        Ok(())
    }
}

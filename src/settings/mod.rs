//! Settings come from a TOML file, `settings/dev.toml` by default, or the
//! path given with `--settings`.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;

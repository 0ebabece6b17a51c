//! Settings are layered: a TOML file first, then `TOKENGATE__*` environment
//! variables. Secrets are never read from a hard-coded default.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;

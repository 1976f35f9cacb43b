//! CLI subcommand implementations.

pub mod call;
pub mod record;
pub mod settings;
pub mod today;
pub mod util;

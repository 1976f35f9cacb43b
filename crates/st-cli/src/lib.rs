//! Screen-time CLI library.
//!
//! This crate provides the `st` command line and the JSON method channel that
//! carries usage reports across a process boundary.

pub mod channel;
mod cli;
pub mod commands;
mod config;
pub mod host;

pub use channel::{Host, Method, MethodCall, Reply, dispatch, serve};
pub use cli::{Cli, Commands};
pub use config::Config;
pub use host::NativeHost;

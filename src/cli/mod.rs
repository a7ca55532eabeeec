//! Command-line interface module.

mod args;
pub mod classify;
pub mod common;
pub mod init;
pub mod network;
pub mod resolve;
pub mod serve;

pub use args::{Cli, Commands, ResolveArgs};

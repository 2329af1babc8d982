//! Command-line interface module.

mod args;
pub mod build;
pub mod health;

pub use args::{BuildArgs, Cli, Commands, HealthArgs};

//! Handlers for the subcommands, e.g. `exedeps deps app`.
pub mod info;
pub mod tables;

pub use info::*;

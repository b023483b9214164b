//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which builds the host
//! (process runner, filesystem, downloader) once and routes CLI subcommands
//! to their implementations.

pub mod completions;
pub mod dispatcher;
pub mod display;
pub mod install;
pub mod list;
pub mod select;
pub mod uninstall;

pub use dispatcher::{Command, CommandDispatcher, CommandResult, GlobalFlags};

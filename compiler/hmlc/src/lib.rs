//! Hemlock driver: module loading and the command line front end.
//!
//! # Architecture
//!
//! ```text
//! RunConfig ──► ModuleLoader::run_entry(entry, interpreter)
//!                 ├── load: resolve → read → parse → load dependencies
//!                 └── execute: dependencies first, then own statements
//! ```
//!
//! The interpreter from `hml_eval` is shared by every module in a run, so
//! all modules see one heap and one global scope.

pub mod commands;
mod config;
mod errors;
pub mod loader;
mod resolve;
mod tracing_setup;

pub use config::{RunConfig, STDLIB_ENV};
pub use errors::LoadError;
pub use loader::{LoadState, ModuleId, ModuleLoader};
pub use resolve::{discover_stdlib, resolve_path, EXTENSION, STDLIB_PREFIX};
pub use tracing_setup::{init_tracing, LOG_TREE_ENV};

#![forbid(unsafe_code)]

pub mod charts;
pub mod cli;
pub mod config;
pub mod loader;
pub mod models;
pub mod report;
pub mod table;
pub mod utils;

pub use cli::app::Cli;

pub mod commands;
pub mod config;
pub mod error;
pub mod git;
pub mod logging;
pub mod prompt;
pub mod relationships;
pub mod state;
pub mod workflows;

pub mod cache;
pub mod commands;
pub mod config;
pub mod logging;
pub mod toshl;

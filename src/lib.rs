// ABOUTME: Library root for shipwright - deploy dispatch and deploy history.
// ABOUTME: The main binary is in main.rs.

pub mod app;
pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod event;
pub mod history;
pub mod image_set;
pub mod logs;
pub mod migrate;
pub mod output;
pub mod provision;
pub mod store;
pub mod types;

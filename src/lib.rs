// The binary in main.rs is a thin terminal front end over this library;
// integration tests and benchmarks drive the same modules directly.

pub mod app;
pub mod backend;
pub mod config;
pub mod engine;
pub mod event;
pub mod logging;
pub mod quiz;
pub mod session;
pub mod store;
pub mod ui;

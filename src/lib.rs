pub mod chat;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod diagnosis;
pub mod error;
pub mod llm;
pub mod logging;
pub mod noop;
pub mod nutrition;
pub mod orchestrator;
pub mod ports;
pub mod runtime;
pub mod scoring;
pub mod services;
pub mod session;
pub mod testing;
pub mod types;
pub mod units;

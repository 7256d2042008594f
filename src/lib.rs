pub mod codegen;
pub mod config;
pub mod engine;
pub mod error;
pub mod progress;
pub mod types;

// engine/src/lib.rs
pub mod config;
pub mod runtime;

pub use config::EngineConfig;
pub use runtime::{EngineStatus, TokenomicsEngine};

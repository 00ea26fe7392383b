// token-core/src/lib.rs

//! Shared building blocks for the tokenomics engine
//!
//! This crate provides:
//! - Fixed-point token amounts (arbitrary precision, never floating point)
//! - Basis-point and rate conversion helpers
//! - Health status shared by the monitors
//! - The engine event envelope and the observer-style event bus

pub mod events;
pub mod types;

pub use events::{
    AlertNotice, EngineEvent, EventBus, EventCategory, EventPayload, SubscriberId,
};
pub use types::*;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

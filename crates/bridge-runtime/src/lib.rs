//! # Bridge Runtime Library
//!
//! This library exposes the internal modules of the `price-bridge` binary
//! for testing. The main entry point is `main.rs`.
//!
//! ## Architectural Patterns
//!
//! - **Event-driven**: components talk only through the shared event bus
//! - **Hexagonal**: storage, HTTP and time are injected ports
//! - **Single consumer**: one stdio peer per process

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod admin;
pub mod container;
pub mod handlers;
pub mod runtime;

pub use container::{BridgeConfig, BridgeContainer, ConfigError, ContainerError};
pub use runtime::{BridgeRuntime, StopReason};

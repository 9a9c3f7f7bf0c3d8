//! Core configuration types for the simulation

pub mod config;

pub use config::{Config, ConfigError, PhysicsConfig};

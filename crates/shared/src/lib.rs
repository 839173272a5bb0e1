//! Shared types, errors, and configuration for Splitbook.
//!
//! This crate provides common types used across all other crates:
//! - Integer money in minor currency units
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, CacheConfig, EngineConfig};
pub use error::AppError;

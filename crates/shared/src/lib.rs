//! Shared types, errors, and configuration for Budgie.
//!
//! This crate provides common types used across all other crates:
//! - Exact two-decimal amounts (never binary floats)
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management
//! - Tracing subscriber setup

pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;

pub use config::{AppConfig, DatabaseConfig, LoggingConfig};
pub use error::AppError;

//! # API Shared
//!
//! Shared definitions for the HCA APIs.
//!
//! Contains:
//! - Wire models (`models` module) with OpenAPI schemas
//! - Shared services like `HealthService`
//!
//! Used by `api-rest`; the CLI prints the same shapes.

pub mod health;
pub mod models;

pub use health::HealthService;
pub use models::*;

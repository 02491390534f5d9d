//! # Dashgraft Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! Foundational pieces used by every command:
//! - `config`: layered configuration loading, merging and validation
//! - `error`: the fatal error enum and the crate `Result` alias
//! - `templating`: payload rendering and generated snippets
//!
//! ```rust
//! use crate::core::config;
//! use crate::core::error::{DashgraftError, Result};
//! use crate::core::templating;
//! ```
//!
pub mod config;
pub mod error;
pub mod templating;

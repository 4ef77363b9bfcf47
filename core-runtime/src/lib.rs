//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the songbook core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the core runtime utilities the other modules depend
//! on. It establishes the async runtime patterns, logging conventions, and
//! event broadcasting mechanisms used throughout the system.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};

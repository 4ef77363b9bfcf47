//! # Supabase Provider
//!
//! Implements the `CollectionsApi` trait against a Supabase PostgREST
//! backend.
//!
//! ## Overview
//!
//! This module provides:
//! - Row-level-security-scoped access to the songs, favourites, folders
//!   and folder_entries tables
//! - Anon key plus bearer token authentication on every request
//! - Retried reads and single-attempt mutations
//! - Wire row to domain model conversion

pub mod connector;
pub mod error;
pub mod types;

pub use connector::SupabaseCollections;
pub use error::{Result, SupabaseError};

//! Workspace facade crate.
//!
//! Re-exports the individual workspace crates behind a single
//! dependency. Host applications can depend on `songbook-workspace`
//! and reach every layer (`core_data`, `core_auth`, `core_cache`,
//! the bridges and the Supabase provider) without wiring each one
//! individually.

pub use bridge_desktop;
pub use bridge_traits;
pub use core_auth;
pub use core_cache;
pub use core_data;
pub use core_runtime;
pub use provider_supabase;

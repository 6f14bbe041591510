//! Crewdesk Core - Shared types library.
//!
//! This crate provides common types used across the Crewdesk components:
//! - `web` - Member portal and admin task board (single binary)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for emails, provider subjects, task
//!   identifiers, realms, and task statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

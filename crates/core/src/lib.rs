//! Sinertis Core - Shared types library.
//!
//! This crate provides common types used across all Sinertis components:
//! - `site` - Maintenance gate, email transport chain, contact form, admin panel
//! - `cli` - Operator tooling for toggling maintenance and sending mail
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage engines, no HTTP
//! clients. Values are parsed from and rendered to the string form they take
//! in client storage, so every engine agrees on the wire format.
//!
//! # Modules
//!
//! - [`types`] - Storage keys, auth/maintenance flags, site settings, emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

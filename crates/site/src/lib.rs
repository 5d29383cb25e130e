//! Sinertis Studio site library.
//!
//! Runtime behaviour behind the public site: the maintenance gate that blocks
//! visitors while the admin works, the cross-tab storage it listens to, the
//! email transport chain, the contact form and the admin panel.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod config;
pub mod contact;
pub mod email;
pub mod error;
pub mod maintenance;
pub mod storage;

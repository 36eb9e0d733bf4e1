//! Sentryline Core - Shared types library.
//!
//! This crate provides common types used across the Sentryline site services:
//! - `site` - Public web service (assistant, verification, auth/profile APIs)
//! - `integration-tests` - Black-box tests against the site crate
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for user ids, emails, auth providers, and
//!   risk scores

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

//! Sentryline site library.
//!
//! This crate provides the site's server functionality as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod firebase;
pub mod gemini;
pub mod google;
pub mod models;
pub mod recaptcha;
pub mod routes;
pub mod services;
pub mod state;

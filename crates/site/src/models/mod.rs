//! Domain models for the site service.

pub mod chat;
pub mod profile;

pub use chat::{ChatMessage, ChatRole, Transcript};
pub use profile::{Address, ProfileUpdate, UserProfile};

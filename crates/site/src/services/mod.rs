//! Application services.
//!
//! Services orchestrate the external-service clients; route handlers stay
//! thin and delegate here.

pub mod assistant;
pub mod profile;

pub use assistant::{Assistant, AssistantError};
pub use profile::{ProfileError, ProfileService};

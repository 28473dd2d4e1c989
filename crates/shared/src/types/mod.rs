//! Common types used across the application.

pub mod direction;
pub mod id;

pub use direction::Direction;
pub use id::*;

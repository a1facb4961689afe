//! Request handlers.

pub mod auth;
pub mod health;
pub mod swap;

pub use auth::*;
pub use health::*;
pub use swap::*;

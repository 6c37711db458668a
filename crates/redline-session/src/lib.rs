//! The editing session: document and version navigation, compare mode, and
//! the AI suggestion feed.
//!
//! Everything here is transport-agnostic. The controller is generic over a
//! [`redline_core::api::DocumentApi`] and a
//! [`redline_core::state::StateStore`]; the front end wires in the concrete
//! HTTP client and SQLite cache.

pub mod compare;
pub mod controller;
pub mod debounce;

pub use compare::{ActiveSide, CompareEngine};
pub use controller::SessionController;
pub use debounce::Debouncer;

#[cfg(test)]
mod fake;

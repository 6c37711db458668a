//! Network clients for the patent review backend.
//!
//! [`ApiClient`] speaks the JSON REST API and implements
//! [`redline_core::api::DocumentApi`]. [`SuggestionSocket`] keeps the AI
//! review WebSocket open, reconnecting after every drop.

mod http;
mod socket;

pub mod error;

pub use error::{Error, Result};
pub use http::{ApiClient, ApiConfig};
pub use socket::SuggestionSocket;

//! Core types, traits, and pure algorithms for the redline patent editor.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! network client, the SQLite state store, and the session orchestration all
//! depend on it; it depends on nothing of theirs.

pub mod api;
pub mod diff;
pub mod document;
pub mod error;
pub mod normalize;
pub mod selector;
pub mod state;
pub mod suggestion;

pub use error::{Error, Result, TransportError};

//! # Storage Module
//!
//! Persistence for the credit ledger. The domain layer only sees the traits
//! in [`traits`]; [`json`] implements them on top of a single JSON document
//! that is loaded into memory and rewritten in full on every mutation.

pub mod json;
pub mod traits;

pub use json::JsonConnection;
pub use traits::*;

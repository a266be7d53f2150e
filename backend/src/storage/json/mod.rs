//! # JSON Storage Module
//!
//! File-backed record store for the credit ledger.
//!
//! ## Features
//!
//! - One pretty-printed JSON document per store, loaded fully into memory
//! - Whole-file rewrite on every mutation, via temp file + rename
//! - Linear scans for every lookup
//! - Mutations serialized per handle; failed saves roll back the in-memory copy
//! - Maintenance: reset, clear, backup, restore, import (including the legacy
//!   layouts), export, stats
//!
//! ## File Format
//!
//! ```json
//! { "members": [], "credits": [], "payments": [], "notifications": [], "settings": [] }
//! ```

pub mod connection;
pub mod document;
pub mod legacy;
pub mod member_repository;
pub mod credit_repository;
pub mod payment_repository;
pub mod notification_repository;
pub mod setting_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::JsonConnection;
pub use document::Database;
pub use member_repository::MemberRepository;
pub use credit_repository::CreditRepository;
pub use payment_repository::PaymentRepository;
pub use notification_repository::NotificationRepository;
pub use setting_repository::SettingRepository;

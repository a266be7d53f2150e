//! # Domain Layer
//!
//! Business rules of the credit association: who may do what, how credit is
//! priced, and how payments move a credit through its lifecycle.
//!
//! ## Key Responsibilities
//!
//! - **Members**: registration, login, role flags and deactivation
//! - **Credit**: request, admin decision and settlement of credits
//! - **Payments**: recording, confirmation, monthly fees and statements
//! - **Settings**: interest rates and credit limits
//! - **Notifications**: messages recorded alongside workflow events
//!
//! Services are generic over the storage [`Connection`](crate::storage::Connection)
//! and never touch the file system directly.

pub mod commands;
pub mod credit_service;
pub mod errors;
pub mod member_service;
pub mod models;
pub mod notification_service;
pub mod password;
pub mod payment_service;
pub mod settings_service;

pub use credit_service::CreditService;
pub use errors::DomainError;
pub use member_service::MemberService;
pub use notification_service::NotificationService;
pub use payment_service::PaymentService;
pub use settings_service::SettingsService;

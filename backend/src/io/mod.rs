//! # IO Module
//!
//! Interface layer between HTTP clients and the domain services.
//!
//! ## Key Responsibilities
//!
//! - **API Endpoints**: JSON endpoints under `/api`
//! - **Data Serialization**: Converting between `shared` DTOs and domain models
//! - **Error Translation**: Mapping [`DomainError`](crate::domain::DomainError)
//!   kinds to HTTP status codes with a `{"error": ...}` body

pub mod rest;

pub use rest::*;

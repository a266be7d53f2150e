//! Conversions between the public DTOs in `shared` and the domain types.

pub mod credit_mapper;
pub mod member_mapper;
pub mod notification_mapper;
pub mod payment_mapper;
pub mod setting_mapper;

use chrono::{DateTime, Utc};

pub(crate) fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

pub(crate) fn optional_timestamp(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(timestamp)
}

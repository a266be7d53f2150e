use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use uuid::Uuid;

pub const INTEREST_RATE_MEMBERS: &str = "interest_rate_members";
pub const INTEREST_RATE_NON_MEMBERS: &str = "interest_rate_non_members";
pub const CREDIT_LIMIT_MEMBERS: &str = "credit_limit_members";
pub const CREDIT_LIMIT_NON_MEMBERS: &str = "credit_limit_non_members";

/// Seeded keys with their default values and descriptions
pub const DEFAULT_SETTINGS: [(&str, &str, &str); 4] = [
    (INTEREST_RATE_MEMBERS, "0.15", "Interest rate for members (15%)"),
    (INTEREST_RATE_NON_MEMBERS, "0.25", "Interest rate for non-members (25%)"),
    (CREDIT_LIMIT_MEMBERS, "50000", "Maximum credit amount for members"),
    (CREDIT_LIMIT_NON_MEMBERS, "20000", "Maximum credit amount for non-members"),
];

/// Largest credit limit an administrator may configure
pub const MAX_CREDIT_LIMIT: f64 = 1_000_000_000.0;

/// Administrator-editable key/value configuration row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Setting {
    pub id: String,
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Setting {
    pub fn generate_id() -> String {
        format!("setting::{}", Uuid::new_v4())
    }

    pub fn defaults(now: DateTime<Utc>) -> Vec<Setting> {
        DEFAULT_SETTINGS
            .iter()
            .map(|(key, value, description)| Setting {
                id: Self::generate_id(),
                key: key.to_string(),
                value: value.to_string(),
                description: Some(description.to_string()),
                updated_at: now,
            })
            .collect()
    }

    /// Default value for a seeded key
    pub fn default_value(key: &str) -> Option<&'static str> {
        DEFAULT_SETTINGS
            .iter()
            .find(|(k, _, _)| *k == key)
            .map(|(_, value, _)| *value)
    }

    /// Accepted values for a key: rates are fractions, limits are capped.
    pub fn allowed_range(key: &str) -> RangeInclusive<f64> {
        match key {
            INTEREST_RATE_MEMBERS | INTEREST_RATE_NON_MEMBERS => 0.0..=1.0,
            CREDIT_LIMIT_MEMBERS | CREDIT_LIMIT_NON_MEMBERS => 0.0..=MAX_CREDIT_LIMIT,
            _ => 0.0..=f64::MAX,
        }
    }

    pub fn numeric_value(&self) -> Option<f64> {
        self.value.trim().parse::<f64>().ok()
    }
}

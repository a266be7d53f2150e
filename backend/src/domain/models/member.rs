use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Consumer code of the administrator seeded into every fresh store
pub const SEEDED_ADMIN_CODE: &str = "ADMIN001";

const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A registered person. Members are deactivated, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub id: String,
    pub consumer_code: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// PHC string (argon2), or a legacy bcrypt hash awaiting reset
    pub password_hash: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    pub is_member: bool,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn generate_id() -> String {
        format!("member::{}", Uuid::new_v4())
    }

    /// `PPD` + base-36 millisecond timestamp + 5 random base-36 characters.
    pub fn generate_consumer_code(now_millis: u64) -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..5)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        format!("PPD{}{}", to_base36(now_millis), suffix)
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(CODE_ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// Partial update of a member record. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub password_hash: Option<String>,
    pub is_member: Option<bool>,
    pub is_admin: Option<bool>,
    pub is_active: Option<bool>,
}

impl MemberPatch {
    pub fn apply(self, member: &mut Member) {
        if let Some(name) = self.name {
            member.name = name;
        }
        if let Some(email) = self.email {
            member.email = Some(email);
        }
        if let Some(phone) = self.phone {
            member.phone = Some(phone);
        }
        if let Some(address) = self.address {
            member.address = Some(address);
        }
        if let Some(city) = self.city {
            member.city = Some(city);
        }
        if let Some(state) = self.state {
            member.state = Some(state);
        }
        if let Some(zip_code) = self.zip_code {
            member.zip_code = Some(zip_code);
        }
        if let Some(password_hash) = self.password_hash {
            member.password_hash = password_hash;
        }
        if let Some(is_member) = self.is_member {
            member.is_member = is_member;
        }
        if let Some(is_admin) = self.is_admin {
            member.is_admin = is_admin;
        }
        if let Some(is_active) = self.is_active {
            member.is_active = is_active;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "Z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "LOYW3V28");
    }

    #[test]
    fn test_consumer_code_shape() {
        let code = Member::generate_consumer_code(1_700_000_000_000);
        assert!(code.starts_with("PPDLOYW3V28"));
        assert_eq!(code.len(), "PPD".len() + 8 + 5);
        assert!(code.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: std::collections::HashSet<String> = (0..10_000).map(|_| Member::generate_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }
}

//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use gxi_core::{Email, Role, UserId};

/// A user record (domain type).
///
/// Identity is the normalized email. `password_hash` is `None` until a
/// password is set ("unusable password" sentinel). `parent_id` and
/// `root_company_id` form the ownership forest used for scoped visibility;
/// they are orthogonal to `role`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's normalized email address.
    pub email: Email,
    /// Argon2 password hash, or `None` when no usable password is set.
    pub password_hash: Option<String>,
    /// The user's role.
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub street_address: Option<String>,
    pub address_line_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone_number: Option<String>,
    /// Whether the account may log in. Customers start inactive and are
    /// approved by a superadmin out-of-band.
    pub is_active: bool,
    /// Direct creator in the ownership forest, if any.
    pub parent_id: Option<UserId>,
    /// Root of the company lineage this user belongs to, if any.
    pub root_company_id: Option<UserId>,
    /// When the account was created.
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// "First Last" display name, skipping missing parts.
    #[must_use]
    pub fn full_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => String::new(),
        }
    }
}

/// Full user profile as exposed over the API (never includes the hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: Email,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub street_address: Option<String>,
    pub address_line_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone_number: Option<String>,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            company_name: user.company_name.clone(),
            street_address: user.street_address.clone(),
            address_line_2: user.address_line_2.clone(),
            city: user.city.clone(),
            state: user.state.clone(),
            zip_code: user.zip_code.clone(),
            phone_number: user.phone_number.clone(),
            is_active: user.is_active,
            date_joined: user.date_joined,
        }
    }
}

/// Lightweight user row for list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub email: Email,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name(),
            phone_number: user.phone_number.clone(),
            role: user.role,
        }
    }
}

/// The identity a request presents to the authorization engine.
///
/// `role` and `is_active` are optional so the engine can reason about
/// partially-attributed identities: service-to-service callers may present
/// no activation flag, which the engine treats as active.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl CurrentUser {
    /// Build the presented identity from a stored user row.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: Some(user.role),
            is_active: Some(user.is_active),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::new(1),
            email: Email::parse("a@x.com").unwrap(),
            password_hash: None,
            role: Role::Customer,
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            company_name: None,
            street_address: None,
            address_line_2: None,
            city: None,
            state: None,
            zip_code: None,
            phone_number: None,
            is_active: false,
            parent_id: None,
            root_company_id: None,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_full_name() {
        let mut user = sample_user();
        assert_eq!(user.full_name(), "Ada Lovelace");

        user.last_name = None;
        assert_eq!(user.full_name(), "Ada");

        user.first_name = None;
        assert_eq!(user.full_name(), "");
    }

    #[test]
    fn test_profile_never_carries_hash() {
        let mut user = sample_user();
        user.password_hash = Some("$argon2id$...".to_string());
        let profile = UserProfile::from(&user);
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_current_user_from_user() {
        let user = sample_user();
        let identity = CurrentUser::from_user(&user);
        assert_eq!(identity.role, Some(Role::Customer));
        assert_eq!(identity.is_active, Some(false));
    }
}

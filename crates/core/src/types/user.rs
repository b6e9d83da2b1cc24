//! User identity record and auth request/response shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::email::Email;
use crate::types::id::UserId;
use crate::types::status::UserRole;

/// An authenticated user's identity record.
///
/// Created server-side on register; loaded into local state on login
/// or from the persisted cache at startup; mutated only via
/// profile-update, which replaces the whole record with the server's
/// response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-issued identifier.
    #[serde(rename = "_id")]
    pub id: UserId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Full display name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether this user may use the admin console.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

/// Payload returned by the login and register endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPayload {
    pub user: User,
    /// Opaque bearer token proving the identity on later requests.
    pub token: String,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Email,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

/// Body of `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Email,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

/// Body of `PUT /api/auth/profile`. Only set fields are sent; the
/// server responds with the full updated [`User`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl ProfileUpdate {
    /// True when no field is set; sending this would be a no-op.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none() && self.first_name.is_none() && self.last_name.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        serde_json::from_str(
            r#"{
                "_id": "u-1",
                "email": "jo@example.com",
                "firstName": "Jo",
                "lastName": "March",
                "role": "customer",
                "createdAt": "2026-01-01T00:00:00Z",
                "updatedAt": "2026-01-02T00:00:00Z"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_user_wire_shape() {
        let user = sample_user();
        assert_eq!(user.id, UserId::new("u-1"));
        assert_eq!(user.first_name, "Jo");
        assert_eq!(user.full_name(), "Jo March");
        assert!(!user.is_admin());

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["_id"], "u-1");
        assert_eq!(json["firstName"], "Jo");
        assert_eq!(json["role"], "customer");
    }

    #[test]
    fn test_profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            first_name: Some("Josephine".to_owned()),
            ..ProfileUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["firstName"], "Josephine");
        assert!(json.get("lastName").is_none());
        assert!(json.get("email").is_none());
    }

    #[test]
    fn test_profile_update_is_empty() {
        assert!(ProfileUpdate::default().is_empty());
    }

    #[test]
    fn test_login_request_omits_role_when_unset() {
        let req = LoginRequest {
            email: Email::parse("jo@example.com").unwrap(),
            password: "hunter22".to_owned(),
            role: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("role").is_none());
    }
}

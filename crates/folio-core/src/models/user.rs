use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::RecordId;

/// The signed-in admin, as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UserRecord")]
pub struct User {
    pub id: RecordId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Any other profile fields the backend sends
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wire shape of a user. Documents may carry `_id`, `id` or both.
#[derive(Deserialize)]
struct UserRecord {
    #[serde(default, rename = "_id")]
    object_id: Option<RecordId>,
    #[serde(default)]
    id: Option<RecordId>,
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<UserRecord> for User {
    type Error = String;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        let id = record
            .object_id
            .or(record.id)
            .ok_or_else(|| "user record has no id".to_string())?;
        Ok(Self {
            id,
            email: record.email,
            name: record.name,
            role: record.role,
            extra: record.extra,
        })
    }
}

impl User {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.email)
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

// Keep passwords out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// Successful login: the token and the user it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Registration may or may not sign the new user in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationPayload {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilePayload {
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_user_accepts_document_id_and_keeps_extra_fields() {
        let user: User = serde_json::from_value(json!({
            "_id": "64f1c2",
            "email": "admin@portfolio.com",
            "lastLogin": "2026-01-02T03:04:05Z"
        }))
        .expect("user");

        assert_eq!(user.id, RecordId::Text("64f1c2".to_string()));
        assert_eq!(user.display_name(), "admin@portfolio.com");
        assert_eq!(user.extra["lastLogin"], json!("2026-01-02T03:04:05Z"));
    }

    #[test]
    fn test_user_with_both_id_keys() {
        let user: User = serde_json::from_value(json!({
            "_id": "64f1c2",
            "id": "64f1c2",
            "email": "admin@portfolio.com"
        }))
        .expect("user");

        assert_eq!(user.id, RecordId::Text("64f1c2".to_string()));
        assert!(user.extra.is_empty());
        assert_eq!(
            serde_json::to_value(&user).expect("serialize"),
            json!({"id": "64f1c2", "email": "admin@portfolio.com"})
        );
    }

    #[test]
    fn test_user_without_id_is_rejected() {
        let result = serde_json::from_value::<User>(json!({"email": "a@b.com"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("a@b.com", "hunter2");
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("a@b.com"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_password_change_wire_names() {
        let change = PasswordChange {
            current_password: "old".to_string(),
            new_password: "new".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&change).expect("serialize"),
            json!({"currentPassword": "old", "newPassword": "new"})
        );
    }
}

//! User account model matching the frontend User interface.

use serde::{Deserialize, Serialize};

/// Role of an account holder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Staff,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Role::Student),
            "staff" => Some(Role::Staff),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// A stored account, including the credential digest.
///
/// Never serialized to the wire as-is; handlers expose [`User`] instead.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub room_number: Option<String>,
    pub green_points: Option<i64>,
    pub password_hash: String,
}

impl UserAccount {
    /// Public profile with the credential digest stripped.
    pub fn to_public(&self) -> User {
        User {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            room_number: self.room_number.clone(),
            green_points: self.green_points,
        }
    }
}

/// Public user profile as exposed by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green_points: Option<i64>,
}

/// Request body for registration. Admin accounts cannot self-register.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: RegisterRole,
    #[serde(default)]
    pub room_number: Option<String>,
}

/// Roles allowed at registration.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RegisterRole {
    Student,
    Staff,
}

impl From<RegisterRole> for Role {
    fn from(r: RegisterRole) -> Self {
        match r {
            RegisterRole::Student => Role::Student,
            RegisterRole::Staff => Role::Staff,
        }
    }
}

/// Request body for login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Session token plus the authenticated profile, returned by login/register.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub user: User,
}

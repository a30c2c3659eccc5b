use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Application role. The set is closed and seeded before any user exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Login identity. The password is only ever held as an Argon2 hash.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_utc: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, password_hash: String) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            email,
            password_hash,
            created_utc: Utc::now(),
        }
    }
}

/// Caller identity resolved from a validated bearer token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Token subject; expected to be a user id.
    pub subject: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl AuthContext {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.iter().any(|r| r == role.as_str())
    }
}

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::errors::IdentityError;
use super::password::PasswordHasher;

// ============================================================================
// Identity Value Objects
// ============================================================================

const RESET_TOKEN_LEN: usize = 32;

/// User email address, unique across all users.
///
/// Stored trimmed and lowercased so uniqueness ignores case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn new(email: impl AsRef<str>) -> Self {
        Self(email.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(&self) -> Result<(), IdentityError> {
        if self.0.is_empty() {
            return Err(IdentityError::EmptyEmail);
        }
        if !self.0.contains('@') {
            return Err(IdentityError::InvalidEmail(self.0.clone()));
        }
        Ok(())
    }
}

impl From<String> for Email {
    fn from(email: String) -> Self {
        Self::new(email)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

/// Authorization role tag such as `ROLE_USER`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Role(pub String);

impl Role {
    pub const USER: &'static str = "ROLE_USER";

    pub fn user() -> Self {
        Self(Self::USER.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Registration input
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub roles: BTreeSet<Role>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: Email,
    pub roles: BTreeSet<Role>,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub reset_token: String,
}

impl User {
    /// Validate registration input and hash the password through the given port
    pub fn register(input: NewUser, hasher: &dyn PasswordHasher) -> Result<Self, IdentityError> {
        input.email.validate()?;
        if input.first_name.trim().is_empty() {
            return Err(IdentityError::EmptyFirstName);
        }
        if input.last_name.trim().is_empty() {
            return Err(IdentityError::EmptyLastName);
        }

        let password_hash = hasher.hash(&input.password)?;

        let mut roles = input.roles;
        roles.insert(Role::user());

        Ok(Self {
            id: Uuid::now_v7(),
            email: input.email,
            roles,
            password_hash,
            first_name: input.first_name,
            last_name: input.last_name,
            created_at: input.created_at,
            last_login_at: None,
            reset_token: generate_reset_token(),
        })
    }

    /// Registration time; fixed once the user exists
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn generate_reset_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Shipping address input
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub full_name: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl Address {
    pub fn new(user_id: Uuid, input: NewAddress) -> Result<Self, IdentityError> {
        let fields = [
            ("full_name", &input.full_name),
            ("street", &input.street),
            ("city", &input.city),
            ("postal_code", &input.postal_code),
            ("country", &input.country),
        ];
        if let Some((name, _)) = fields.into_iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(IdentityError::EmptyAddressField(name));
        }

        Ok(Self {
            id: Uuid::now_v7(),
            user_id,
            full_name: input.full_name,
            street: input.street,
            city: input.city,
            postal_code: input.postal_code,
            country: input.country,
        })
    }
}

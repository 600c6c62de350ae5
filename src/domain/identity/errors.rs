// ============================================================================
// Identity Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum IdentityError {
    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("First name cannot be empty")]
    EmptyFirstName,

    #[error("Last name cannot be empty")]
    EmptyLastName,

    #[error("Address field {0} cannot be empty")]
    EmptyAddressField(&'static str),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

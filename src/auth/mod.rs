//! Credential service: password hashing and signed session tokens.

pub mod password;
pub mod token;

use thiserror::Error;

pub use password::{hash_password, verify_password};
pub use token::{Claims, IssuedToken, TokenService};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("token signing secret is not configured")]
    MissingSecret,

    #[error("token signing failed: {0}")]
    Signing(jsonwebtoken::errors::Error),

    #[error("invalid token: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),

    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

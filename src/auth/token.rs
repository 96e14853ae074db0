use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CredentialError;
use crate::database::models::{Role, User};

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Issues and verifies HS256 session tokens with a server-held secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    has_secret: bool,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expired tokens are rejected outright; no clock-skew grace.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            has_secret: !secret.trim().is_empty(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `user` that expires `ttl` after issuance.
    pub fn issue(&self, user: &User) -> Result<IssuedToken, CredentialError> {
        let now = Utc::now();
        let claims = Claims {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let token = self.sign(&claims)?;
        Ok(IssuedToken { token, claims })
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn decode(&self, token: &str) -> Result<Claims, CredentialError> {
        if !self.has_secret {
            return Err(CredentialError::MissingSecret);
        }

        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(CredentialError::InvalidToken)
    }

    fn sign(&self, claims: &Claims) -> Result<String, CredentialError> {
        if !self.has_secret {
            return Err(CredentialError::MissingSecret);
        }

        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(CredentialError::Signing)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .field("has_secret", &self.has_secret)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            password: "$2b$04$hash".to_string(),
            role,
            profile_photo: None,
            subscribers: vec![],
            subscribed_users: vec![],
            created: Utc::now(),
        }
    }

    fn service() -> TokenService {
        TokenService::new("test-secret", Duration::days(7))
    }

    #[test]
    fn issued_token_round_trips() {
        let tokens = service();
        let alice = user(Role::Admin);

        let issued = tokens.issue(&alice).unwrap();
        let claims = tokens.decode(&issued.token).unwrap();

        assert_eq!(claims, issued.claims);
        assert_eq!(claims.id, alice.id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn expiry_is_seven_days_after_issuance() {
        let issued = service().issue(&user(Role::User)).unwrap();
        assert_eq!(issued.claims.exp - issued.claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            id: Uuid::new_v4(),
            username: "bob".to_string(),
            role: Role::User,
            iat: now - 3600,
            exp: now - 10,
        };
        let token = tokens.sign(&claims).unwrap();

        assert!(matches!(tokens.decode(&token), Err(CredentialError::InvalidToken(_))));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let tokens = service();
        let issued = tokens.issue(&user(Role::User)).unwrap();

        let mut parts: Vec<String> = issued.token.split('.').map(str::to_string).collect();
        let mut signature = parts[2].clone().into_bytes();
        signature[0] = if signature[0] == b'A' { b'B' } else { b'A' };
        parts[2] = String::from_utf8(signature).unwrap();
        let tampered = parts.join(".");

        assert!(matches!(tokens.decode(&tampered), Err(CredentialError::InvalidToken(_))));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let issued = TokenService::new("other-secret", Duration::days(7))
            .issue(&user(Role::Admin))
            .unwrap();

        assert!(matches!(service().decode(&issued.token), Err(CredentialError::InvalidToken(_))));
    }

    #[test]
    fn missing_secret_is_a_configuration_error() {
        let tokens = TokenService::new("", Duration::days(7));
        assert!(matches!(tokens.issue(&user(Role::User)), Err(CredentialError::MissingSecret)));
    }
}

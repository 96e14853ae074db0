use super::CredentialError;

/// Hash a password with a fresh salt at the given work factor.
///
/// bcrypt is deliberately slow, so the work runs on the blocking pool
/// instead of stalling the async worker that accepted the request.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, CredentialError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hashed)
}

/// Compare a candidate against a stored hash using bcrypt's own comparison.
pub async fn verify_password(candidate: &str, hash: &str) -> Result<bool, CredentialError> {
    let candidate = candidate.to_owned();
    let hash = hash.to_owned();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(candidate, &hash)).await??;
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hash = hash_password("correct horse", 4).await.unwrap();
        assert_ne!(hash, "correct horse");
        assert!(hash.starts_with("$2"));
        assert!(verify_password("correct horse", &hash).await.unwrap());
        assert!(!verify_password("battery staple", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn same_password_gets_distinct_salts() {
        let a = hash_password("pw123456", 4).await.unwrap();
        let b = hash_password("pw123456", 4).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        let result = verify_password("anything", "not-a-bcrypt-hash").await;
        assert!(matches!(result, Err(CredentialError::Hashing(_))));
    }
}

//! Admin credentials and session tokens
//!
//! Passwords are stored as bcrypt hashes. Sessions are stateless HS256
//! JWTs carrying the admin id and email; there is no refresh or
//! revocation, a token is valid until it expires.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::AdminUser;

/// Minimum accepted password length (characters)
pub const MIN_PASSWORD_LEN: usize = 6;

/// Minimum signing secret length (bytes)
pub const MIN_SECRET_LEN: usize = 16;

/// bcrypt work factor used when none is configured
pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("Invalid token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("Signing secret must be at least {MIN_SECRET_LEN} bytes")]
    WeakSecret,
    #[error("System clock is before the Unix epoch")]
    Clock,
}

/// Hash a password with the given bcrypt cost
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Check a password against a stored hash
///
/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is unreadable");
            false
        }
    }
}

/// Trim and lowercase
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Loose shape check: `local@domain.tld`, no whitespace
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

/// JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Admin id
    pub sub: String,
    pub email: String,
    pub iat: u64,
    pub exp: u64,
}

/// Issues and verifies session tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn unix_now() -> Result<u64, AuthError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| AuthError::Clock)
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, AuthError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::WeakSecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `user`, valid for the configured TTL
    pub fn issue(&self, user: &AdminUser) -> Result<String, AuthError> {
        self.issue_at(user, unix_now()?)
    }

    fn issue_at(&self, user: &AdminUser, now: u64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            iat: now,
            exp: now + self.ttl.as_secs(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Check signature and expiry
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn user() -> AdminUser {
        AdminUser {
            id: "user-1".into(),
            email: "admin@insectelim.fr".into(),
            password_hash: String::new(),
            created_at: "2026-10-16T00:00:00.000000Z".into(),
            last_login: None,
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("admin123", 4).unwrap();
        assert_ne!(hash, "admin123");
        assert!(verify_password("admin123", &hash));
        assert!(!verify_password("admin124", &hash));
    }

    #[test]
    fn test_verify_garbage_hash() {
        assert!(!verify_password("x", "not-a-bcrypt-hash"));
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("a@b.fr"));
        assert!(is_valid_email("jean.dupont+devis@insectelim.co.uk"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at.fr"));
        assert!(!is_valid_email("@b.fr"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@.fr"));
        assert!(!is_valid_email("a@b."));
        assert!(!is_valid_email("a@@b.fr"));
        assert!(!is_valid_email("a b@c.fr"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Admin@InsectElim.FR "), "admin@insectelim.fr");
    }

    #[test]
    fn test_weak_secret_rejected() {
        assert!(matches!(
            TokenIssuer::new(b"short", Duration::from_secs(60)),
            Err(AuthError::WeakSecret)
        ));
    }

    #[test]
    fn test_issue_then_verify() {
        let issuer = TokenIssuer::new(SECRET, Duration::from_secs(3600)).unwrap();
        let token = issuer.issue(&user()).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "admin@insectelim.fr");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.exp - claims.iat, issuer.ttl().as_secs());
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = TokenIssuer::new(SECRET, Duration::from_secs(60)).unwrap();
        let token = issuer.issue_at(&user(), unix_now().unwrap() - 3600).unwrap();
        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let a = TokenIssuer::new(SECRET, Duration::from_secs(60)).unwrap();
        let b = TokenIssuer::new(b"ffffffffffffffffffffffffffffffff", Duration::from_secs(60)).unwrap();
        let token = a.issue(&user()).unwrap();
        assert!(b.verify(&token).is_err());
        assert!(a.verify("not.a.jwt").is_err());
    }
}

//! Password hashing and signed session tokens.
//!
//! Sessions are HS256 JWTs carried in the `token` cookie. Passwords are stored
//! as argon2 PHC strings.

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{ContactBookError, ContactBookResult};
use crate::user::{User, UserInfo};

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "token";
pub const SESSION_TTL_DAYS: i64 = 7;

const JWT_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

pub fn hash_password(password: &str) -> ContactBookResult<String> {
    let salt_bytes: [u8; 16] = rand::random();
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| ContactBookError::PasswordHash(e.to_string()))?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ContactBookError::PasswordHash(e.to_string()))?;

    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// A random secret suitable for signing sessions.
pub fn generate_secret() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn user(&self) -> UserInfo {
        UserInfo {
            id: self.id.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        TokenSigner {
            secret: secret.as_ref().to_vec(),
            ttl: Duration::days(SESSION_TTL_DAYS),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user: &User, now: DateTime<Utc>) -> ContactBookResult<String> {
        let claims = SessionClaims {
            id: user.id.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let header = URL_SAFE_NO_PAD.encode(JWT_HEADER);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let signing_input = format!("{}.{}", header, payload);
        let signature = URL_SAFE_NO_PAD.encode(
            self.mac(signing_input.as_bytes())?
                .finalize()
                .into_bytes(),
        );

        Ok(format!("{}.{}", signing_input, signature))
    }

    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> ContactBookResult<SessionClaims> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ContactBookError::InvalidToken);
        };

        let header_json = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|_| ContactBookError::InvalidToken)?;
        let header_value: serde_json::Value =
            serde_json::from_slice(&header_json).map_err(|_| ContactBookError::InvalidToken)?;
        if header_value.get("alg").and_then(|a| a.as_str()) != Some("HS256") {
            return Err(ContactBookError::InvalidToken);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| ContactBookError::InvalidToken)?;
        self.mac(format!("{}.{}", header, payload).as_bytes())?
            .verify_slice(&signature)
            .map_err(|_| ContactBookError::InvalidToken)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| ContactBookError::InvalidToken)?;
        let claims: SessionClaims =
            serde_json::from_slice(&payload).map_err(|_| ContactBookError::InvalidToken)?;

        if claims.exp <= now.timestamp() {
            return Err(ContactBookError::InvalidToken);
        }

        Ok(claims)
    }

    fn mac(&self, data: &[u8]) -> ContactBookResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| ContactBookError::Config(format!("invalid session secret: {e}")))?;
        mac.update(data);
        Ok(mac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "user-1".into(),
            email: "ann@example.com".into(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("correct horse", "not a hash"));
    }

    #[test]
    fn test_token_roundtrip() {
        let signer = TokenSigner::new("secret");
        let now = Utc::now();
        let token = signer.issue(&user(), now).unwrap();

        let claims = signer.verify(&token, now).unwrap();
        assert_eq!(claims.id, "user-1");
        assert_eq!(claims.email, "ann@example.com");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_token_rejected_with_other_secret() {
        let now = Utc::now();
        let token = TokenSigner::new("secret").issue(&user(), now).unwrap();
        assert!(TokenSigner::new("other").verify(&token, now).is_err());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let signer = TokenSigner::new("secret");
        let now = Utc::now();
        let token = signer.issue(&user(), now).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let forged_claims = SessionClaims {
            id: "admin".into(),
            email: "ann@example.com".into(),
            iat: now.timestamp(),
            exp: now.timestamp() + 1000,
        };
        let forged = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap());
        let tampered = format!("{}.{}.{}", parts[0], forged, parts[2]);

        assert!(signer.verify(&tampered, now).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let signer = TokenSigner::new("secret");
        let issued = Utc::now() - Duration::days(8);
        let token = signer.issue(&user(), issued).unwrap();
        assert!(signer.verify(&token, Utc::now()).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let signer = TokenSigner::new("secret");
        for token in ["", "a.b", "a.b.c.d", "!!!.???.***"] {
            assert!(signer.verify(token, Utc::now()).is_err());
        }
    }
}

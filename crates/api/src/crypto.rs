//! Password hashing and session tokens. No database access.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::ServiceError;

const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// PBKDF2-SHA256 with a fresh random salt. Returns `(hash_hex, salt_hex)`.
pub fn hash_password(password: &str) -> Result<(String, String), ServiceError> {
    let mut salt = [0u8; SALT_LEN];
    getrandom::getrandom(&mut salt)
        .map_err(|e| ServiceError::Internal(format!("RNG failure: {e}")))?;

    let mut hash = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut hash);

    Ok((hex::encode(hash), hex::encode(salt)))
}

pub fn verify_password(password: &str, hash_hex: &str, salt_hex: &str) -> bool {
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(hash_hex) else {
        return false;
    };

    let mut hash = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut hash);

    constant_time_eq(&hash, &expected)
}

// ── Session tokens (HS256 JWT) ──────────────────────────────────────────────

const JWT_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Lifetime of an issued session token.
pub const JWT_EXPIRY_SECS: u64 = 24 * 3600;

#[derive(Serialize, Deserialize)]
struct Claims {
    sub: String,
    username: String,
    iat: u64,
    exp: u64,
}

pub fn sign_jwt(
    user_id: &str,
    username: &str,
    secret: &str,
    now_unix: u64,
) -> Result<String, ServiceError> {
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        iat: now_unix,
        exp: now_unix + JWT_EXPIRY_SECS,
    };
    let payload = serde_json::to_vec(&claims)
        .map_err(|e| ServiceError::Internal(format!("encode claims: {e}")))?;

    let mut token = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(JWT_HEADER),
        URL_SAFE_NO_PAD.encode(payload)
    );
    let signature = mac(secret, &token)?;
    token.push('.');
    token.push_str(&URL_SAFE_NO_PAD.encode(signature));
    Ok(token)
}

/// Checks signature and expiry; yields the subject's user id.
pub fn verify_jwt(token: &str, secret: &str, now_unix: u64) -> Result<String, ServiceError> {
    let unauthorized = |msg: &str| ServiceError::Unauthorized(msg.to_string());

    let (signed, sig_b64) = token
        .rsplit_once('.')
        .ok_or_else(|| unauthorized("invalid JWT format"))?;
    let payload_b64 = match signed.split_once('.') {
        Some((_, payload)) if !payload.contains('.') => payload,
        _ => return Err(unauthorized("invalid JWT format")),
    };

    let signature = URL_SAFE_NO_PAD
        .decode(sig_b64)
        .map_err(|_| unauthorized("invalid JWT signature encoding"))?;
    if !constant_time_eq(&mac(secret, signed)?, &signature) {
        return Err(unauthorized("invalid JWT signature"));
    }

    let claims: Claims = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .ok_or_else(|| unauthorized("invalid JWT payload"))?;
    if now_unix > claims.exp {
        return Err(unauthorized("JWT expired"));
    }
    if claims.sub.is_empty() {
        return Err(unauthorized("missing sub claim"));
    }
    Ok(claims.sub)
}

fn mac(secret: &str, data: &str) -> Result<Vec<u8>, ServiceError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|e| ServiceError::Internal(format!("hmac key: {e}")))?;
    mac.update(data.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// Admin API credential and the short-lived signed token derived from it.
//
// A token is a compact `header.payload.signature` string: both JSON parts
// are URL-safe base64 without padding, the signature is HMAC-SHA256 over
// `"<header>.<payload>"` keyed by the hex-decoded secret. Tokens are minted
// right before each request and never cached.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

use crate::error::ConfigError;

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of a token in seconds.
pub const TOKEN_TTL_SECS: u64 = 300;

/// Audience claim accepted by the admin API.
pub const ADMIN_AUDIENCE: &str = "/admin/";

/// Key id plus raw secret bytes, parsed once from `"<id>:<hex secret>"`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    key_id: String,
    secret: Vec<u8>,
}

impl Credential {
    /// Parse an admin API key of the form `id:secret`, where the secret is
    /// hexadecimal text. Odd-length or non-hex secrets are rejected here so
    /// the failure surfaces before any network activity.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ConfigError::MissingCredential);
        }
        let (key_id, secret_hex) = raw.split_once(':').ok_or_else(|| {
            ConfigError::MalformedCredential {
                reason: "expected '<id>:<secret>'".into(),
            }
        })?;
        if key_id.is_empty() {
            return Err(ConfigError::MalformedCredential {
                reason: "key id is empty".into(),
            });
        }
        if secret_hex.is_empty() {
            return Err(ConfigError::MalformedCredential {
                reason: "secret is empty".into(),
            });
        }
        let secret = hex::decode(secret_hex)?;
        Ok(Credential {
            key_id: key_id.to_string(),
            secret,
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Mint a token valid from `now_secs` for `TOKEN_TTL_SECS`.
    pub fn sign(&self, now_secs: u64) -> SignedToken {
        sign(self, now_secs)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("key_id", &self.key_id)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// A signed, time-bounded admin token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    header: String,
    payload: String,
    signature: String,
    pub issued_at: u64,
    pub expires_at: u64,
}

impl SignedToken {
    /// The compact `header.payload.signature` form sent on the wire.
    pub fn compact(&self) -> String {
        format!("{}.{}.{}", self.header, self.payload, self.signature)
    }
}

impl fmt::Display for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compact())
    }
}

/// Derive a token for `credential` issued at `now_secs`.
pub fn sign(credential: &Credential, now_secs: u64) -> SignedToken {
    let expires_at = now_secs.saturating_add(TOKEN_TTL_SECS);

    let header = json!({ "alg": "HS256", "typ": "JWT", "kid": credential.key_id });
    let payload = json!({ "iat": now_secs, "exp": expires_at, "aud": ADMIN_AUDIENCE });

    let header = URL_SAFE_NO_PAD.encode(header.to_string());
    let payload = URL_SAFE_NO_PAD.encode(payload.to_string());

    // HMAC accepts keys of any length, including empty.
    let mut mac = HmacSha256::new_from_slice(&credential.secret)
        .unwrap_or_else(|_| unreachable!("HMAC accepts any key length"));
    mac.update(header.as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    SignedToken {
        header,
        payload,
        signature,
        issued_at: now_secs,
        expires_at,
    }
}

/// Seconds since the Unix epoch, used as the token's issued-at.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

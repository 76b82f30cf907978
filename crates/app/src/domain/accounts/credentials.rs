//! Session tokens and generated credentials.
//!
//! Raw secrets are only ever returned to the caller once; storage keeps a
//! SHA-256 digest.

use std::fmt;

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use zeroize::Zeroize;

/// Session token prefix.
pub const SESSION_TOKEN_PREFIX: &str = "st";

/// Number of random bytes behind every secret.
pub const SECRET_BYTES: usize = 32;

pub struct Secret {
    bytes: [u8; SECRET_BYTES],
}

impl Secret {
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0_u8; SECRET_BYTES];

        OsRng.fill_bytes(&mut bytes);

        Self { bytes }
    }

    #[must_use]
    pub const fn from_bytes(bytes: [u8; SECRET_BYTES]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        encode_hex(&self.bytes)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(**redacted**)")
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// A freshly minted session token and the digest to persist.
#[derive(Clone)]
pub struct IssuedSession {
    pub session_uuid: Uuid,
    pub token: String,
    pub token_hash: String,
}

impl fmt::Debug for IssuedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedSession")
            .field("session_uuid", &self.session_uuid)
            .field("token", &"**redacted**")
            .finish_non_exhaustive()
    }
}

/// Mint `st_{session}.{secret}`.
#[must_use]
pub fn issue_session(session_uuid: Uuid, secret: &Secret) -> IssuedSession {
    let token = format!(
        "{SESSION_TOKEN_PREFIX}_{}.{}",
        session_uuid.simple(),
        secret.to_hex()
    );
    let token_hash = hash_secret(&token);

    IssuedSession {
        session_uuid,
        token,
        token_hash,
    }
}

/// Digest of a random credential that is never shown to anyone.
#[must_use]
pub fn generated_credential_hash() -> String {
    let mut raw = Secret::generate().to_hex();
    let digest = hash_secret(&raw);

    raw.zeroize();

    digest
}

#[must_use]
pub fn hash_secret(value: &str) -> String {
    format!("{:x}", Sha256::digest(value.as_bytes()))
}

fn encode_hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    let mut encoded = String::with_capacity(bytes.len() * 2);

    for byte in bytes {
        encoded.push(char::from(HEX[usize::from(byte >> 4)]));
        encoded.push(char::from(HEX[usize::from(byte & 0x0f)]));
    }

    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_token_embeds_session_and_secret() {
        let secret = Secret::from_bytes([0xAB; SECRET_BYTES]);

        let issued = issue_session(Uuid::nil(), &secret);

        assert_eq!(
            issued.token,
            format!("st_{}.{}", Uuid::nil().simple(), "ab".repeat(SECRET_BYTES))
        );
        assert_eq!(issued.token_hash, hash_secret(&issued.token));
        assert_ne!(issued.token_hash, issued.token);
    }

    #[test]
    fn generated_credentials_differ() {
        assert_ne!(generated_credential_hash(), generated_credential_hash());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let issued = issue_session(Uuid::nil(), &Secret::generate());

        assert!(!format!("{issued:?}").contains(&issued.token));
    }
}

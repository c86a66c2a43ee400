//! One-way password hashing.
//!
//! Current format is `sha256$<salt>$<digest>` where the digest is
//! `SHA-256(salt || password)` and both parts are unpadded base64.
//! Older data files may still hold unsalted SHA-256 hex digests or even
//! plaintext; both verify and are reported by [`needs_upgrade`].

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use rand::Rng;
use sha2::{Digest, Sha256};

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;

/// Hashes `password` with a fresh random salt.
pub fn hash(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill(&mut salt);
    encode(&salt, password)
}

/// Checks `password` against a stored value in any supported format.
pub fn verify(password: &str, stored: &str) -> bool {
    match StoredHash::parse(stored) {
        StoredHash::Salted { salt, digest } => {
            let Ok(salt) = STANDARD_NO_PAD.decode(salt) else {
                return false;
            };
            let expected = salted_digest(&salt, password);
            constant_time_eq(expected.as_bytes(), digest.as_bytes())
        }
        StoredHash::LegacyHex(hex) => {
            let expected = format!("{:x}", Sha256::digest(password.as_bytes()));
            constant_time_eq(expected.as_bytes(), hex.to_ascii_lowercase().as_bytes())
        }
        StoredHash::Plaintext(plain) => constant_time_eq(plain.as_bytes(), password.as_bytes()),
    }
}

/// True if the stored value predates the salted format.
pub fn needs_upgrade(stored: &str) -> bool {
    !matches!(StoredHash::parse(stored), StoredHash::Salted { .. })
}

enum StoredHash<'a> {
    Salted { salt: &'a str, digest: &'a str },
    LegacyHex(&'a str),
    Plaintext(&'a str),
}

impl<'a> StoredHash<'a> {
    fn parse(stored: &'a str) -> Self {
        let mut parts = stored.splitn(3, '$');
        if let (Some(SCHEME), Some(salt), Some(digest)) = (parts.next(), parts.next(), parts.next())
        {
            return StoredHash::Salted { salt, digest };
        }
        if stored.len() == 64 && stored.chars().all(|c| c.is_ascii_hexdigit()) {
            return StoredHash::LegacyHex(stored);
        }
        StoredHash::Plaintext(stored)
    }
}

fn encode(salt: &[u8], password: &str) -> String {
    format!(
        "{}${}${}",
        SCHEME,
        STANDARD_NO_PAD.encode(salt),
        salted_digest(salt, password)
    )
}

fn salted_digest(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    STANDARD_NO_PAD.encode(hasher.finalize())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

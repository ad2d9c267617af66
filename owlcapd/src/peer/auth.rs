//! Sealed, timestamped tokens for node-to-node requests and the CSRF
//! cookie. Both are the same construction - an authenticated-encryption
//! blob over `{date, pid, userId, path?}` - with different windows: peers
//! get two minutes, the cookie gets forty. Do not collapse them.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use dryoc::classic::crypto_secretbox::{crypto_secretbox_easy, crypto_secretbox_open_easy};
use dryoc::constants::{CRYPTO_SECRETBOX_MACBYTES, CRYPTO_SECRETBOX_NONCEBYTES};
use owlcap_utils::unix_time::unix_now_ms;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Peer requests carry their token here.
pub const PEER_AUTH_HEADER: &str = "x-moloch-auth";
/// Mutating browser requests echo the CSRF cookie here.
pub const COOKIE_HEADER: &str = "x-moloch-cookie";
/// The CSRF cookie name.
pub const COOKIE_NAME: &str = "OWLCAP-COOKIE";

/// Peer tokens are dead after two minutes.
pub const PEER_SKEW_MS: u64 = 120_000;
/// The CSRF cookie lives forty minutes.
pub const COOKIE_SKEW_MS: u64 = 2_400_000;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token is not valid base64")]
    Encoding,
    #[error("Token failed to open")]
    Sealed,
    #[error("Token payload is malformed")]
    Payload,
    #[error("Token timestamp outside the allowed window")]
    Expired,
    #[error("Token path does not match the request")]
    PathMismatch,
    #[error("Clock not ready")]
    Clock,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Milliseconds since epoch at signing time.
    pub date: u64,
    pub pid: u32,
    #[serde(rename = "userId")]
    pub user_id: String,
    /// The request path the token was minted for. Absent on cookies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

fn derive_key(secret: &str) -> [u8; 32] {
    let digest = Sha256::digest(secret.as_bytes());
    let mut key = [0u8; 32];
    key.copy_from_slice(&digest);
    key
}

fn seal(secret: &str, payload: &TokenPayload) -> Result<String, TokenError> {
    let key = derive_key(secret);
    let message = serde_json::to_vec(payload).map_err(|_| TokenError::Payload)?;
    let mut nonce = [0u8; CRYPTO_SECRETBOX_NONCEBYTES];
    dryoc::rng::copy_randombytes(&mut nonce);
    let mut ciphertext = vec![0u8; message.len() + CRYPTO_SECRETBOX_MACBYTES];
    crypto_secretbox_easy(&mut ciphertext, &message, &nonce, &key)
        .map_err(|_| TokenError::Sealed)?;
    let mut out = Vec::with_capacity(nonce.len() + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(BASE64_STANDARD.encode(out))
}

fn open(secret: &str, token: &str) -> Result<TokenPayload, TokenError> {
    let raw = BASE64_STANDARD
        .decode(token)
        .map_err(|_| TokenError::Encoding)?;
    if raw.len() < CRYPTO_SECRETBOX_NONCEBYTES + CRYPTO_SECRETBOX_MACBYTES {
        return Err(TokenError::Encoding);
    }
    let key = derive_key(secret);
    let (nonce_bytes, ciphertext) = raw.split_at(CRYPTO_SECRETBOX_NONCEBYTES);
    let mut nonce = [0u8; CRYPTO_SECRETBOX_NONCEBYTES];
    nonce.copy_from_slice(nonce_bytes);
    let mut message = vec![0u8; ciphertext.len() - CRYPTO_SECRETBOX_MACBYTES];
    crypto_secretbox_open_easy(&mut message, ciphertext, &nonce, &key)
        .map_err(|_| TokenError::Sealed)?;
    serde_json::from_slice(&message).map_err(|_| TokenError::Payload)
}

/// Mints a peer token bound to the request path about to be sent.
pub fn sign_peer(secret: &str, user_id: &str, path: &str) -> Result<String, TokenError> {
    let date = unix_now_ms().map_err(|_| TokenError::Clock)?;
    sign_peer_at(secret, user_id, path, date)
}

pub(crate) fn sign_peer_at(
    secret: &str,
    user_id: &str,
    path: &str,
    date: u64,
) -> Result<String, TokenError> {
    seal(
        secret,
        &TokenPayload {
            date,
            pid: std::process::id(),
            user_id: user_id.to_string(),
            path: Some(path.to_string()),
        },
    )
}

/// Accepts a peer token only if its path equals the request path and its
/// timestamp is within the two-minute window, either direction.
pub fn verify_peer(secret: &str, token: &str, path: &str) -> Result<TokenPayload, TokenError> {
    let payload = open(secret, token)?;
    match &payload.path {
        Some(token_path) if token_path == path => {}
        _ => return Err(TokenError::PathMismatch),
    }
    let now = unix_now_ms().map_err(|_| TokenError::Clock)?;
    if now.abs_diff(payload.date) > PEER_SKEW_MS {
        return Err(TokenError::Expired);
    }
    Ok(payload)
}

/// Mints the CSRF cookie for a user.
pub fn sign_cookie(secret: &str, user_id: &str) -> Result<String, TokenError> {
    let date = unix_now_ms().map_err(|_| TokenError::Clock)?;
    seal(
        secret,
        &TokenPayload {
            date,
            pid: std::process::id(),
            user_id: user_id.to_string(),
            path: None,
        },
    )
}

/// Accepts the CSRF header only for the same user inside the forty-minute
/// window.
pub fn verify_cookie(secret: &str, token: &str, user_id: &str) -> Result<(), TokenError> {
    let payload = open(secret, token)?;
    if payload.user_id != user_id {
        return Err(TokenError::PathMismatch);
    }
    let now = unix_now_ms().map_err(|_| TokenError::Clock)?;
    if now.abs_diff(payload.date) > COOKIE_SKEW_MS {
        return Err(TokenError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    const SECRET: &str = "fleet-secret";

    #[test]
    fn peer_round_trip() {
        let token = sign_peer(SECRET, "alice", "/n2/hunt/h1/remote/s1").unwrap();
        let payload = verify_peer(SECRET, &token, "/n2/hunt/h1/remote/s1").unwrap();
        assert_eq!(payload.user_id, "alice");
    }

    #[test]
    fn path_mismatch_is_rejected() {
        let token = sign_peer(SECRET, "alice", "/n2/hunt/h1/remote/s1").unwrap();
        assert!(matches!(
            verify_peer(SECRET, &token, "/n2/delete/pcap/s1"),
            Err(TokenError::PathMismatch)
        ));
    }

    #[test]
    fn replayed_old_token_is_rejected() {
        let old = unix_now_ms().unwrap() - PEER_SKEW_MS - 1_000;
        let token = sign_peer_at(SECRET, "alice", "/p", old).unwrap();
        assert!(matches!(
            verify_peer(SECRET, &token, "/p"),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn wrong_secret_fails_to_open() {
        let token = sign_peer(SECRET, "alice", "/p").unwrap();
        assert!(matches!(
            verify_peer("other-secret", &token, "/p"),
            Err(TokenError::Sealed)
        ));
    }

    #[test]
    fn cookie_binds_the_user() {
        let cookie = sign_cookie(SECRET, "alice").unwrap();
        assert!(verify_cookie(SECRET, &cookie, "alice").is_ok());
        assert!(verify_cookie(SECRET, &cookie, "mallory").is_err());
    }

    #[test]
    fn cookie_outlives_the_peer_window() {
        // A timestamp stale for a peer token is still fine for the cookie.
        let stale = unix_now_ms().unwrap() - PEER_SKEW_MS - 60_000;
        let token = sign_peer_at(SECRET, "alice", "/p", stale).unwrap();
        assert!(verify_peer(SECRET, &token, "/p").is_err());
        let payload = open(SECRET, &token).unwrap();
        assert!(COOKIE_SKEW_MS > unix_now_ms().unwrap() - payload.date);
    }
}

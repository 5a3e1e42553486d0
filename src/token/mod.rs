//! Signed verification tokens.
//!
//! Two claim sets drive the human-verification handshake: a `verify` token
//! embedded in the verification-page link, and a `success` token the page
//! hands back for the user to paste into the chat. Both are HS256-signed and
//! time-bounded; decoding tolerates a configured clock skew. Tokens are
//! stateless: nothing records issuance or redemption.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::now_ts;

/// Decode failures, split so callers can word the user message per case.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("token invalid")]
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Verify,
    Success,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub user_id: u64,
    #[serde(default)]
    pub verified: bool,
    /// Absolute expiry, unix seconds.
    pub exp: u64,
}

pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
    leeway_secs: u64,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl_secs: u64, leeway_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
            leeway_secs,
        }
    }

    /// Issue a `verify` token for the CAPTCHA page link. Returns the token
    /// and its absolute expiry.
    pub fn issue_verify(&self, user_id: u64) -> anyhow::Result<(String, u64)> {
        let exp = now_ts() + self.ttl_secs;
        let claims = TokenClaims {
            kind: TokenKind::Verify,
            user_id,
            verified: false,
            exp,
        };
        Ok((encode(&Header::default(), &claims, &self.encoding)?, exp))
    }

    /// Issue a `success` token. `exp` is inherited from the verify token that
    /// started the handshake, so passing the CAPTCHA does not extend the
    /// window.
    pub fn issue_success(&self, user_id: u64, exp: u64) -> anyhow::Result<String> {
        let claims = TokenClaims {
            kind: TokenKind::Success,
            user_id,
            verified: true,
            exp,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Decode and validate a token of either kind.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;
        decode::<TokenClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(leeway: u64) -> TokenCodec {
        TokenCodec::new("test-secret", 600, leeway)
    }

    #[test]
    fn verify_token_roundtrip() {
        let codec = codec(0);
        let issued_at = now_ts();
        let (token, exp) = codec.issue_verify(42).unwrap();
        let claims = codec.decode(&token).unwrap();
        assert_eq!(claims.kind, TokenKind::Verify);
        assert_eq!(claims.user_id, 42);
        assert!(!claims.verified);
        assert!(exp >= issued_at && exp <= issued_at + 601);
    }

    #[test]
    fn success_token_carries_verified_flag_and_expiry() {
        let codec = codec(0);
        let exp = now_ts() + 300;
        let token = codec.issue_success(7, exp).unwrap();
        let claims = codec.decode(&token).unwrap();
        assert_eq!(claims.kind, TokenKind::Success);
        assert!(claims.verified);
        assert_eq!(claims.exp, exp);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let codec = codec(0);
        let token = codec.issue_success(7, now_ts() - 120).unwrap();
        assert_eq!(codec.decode(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn leeway_tolerates_recent_expiry() {
        let codec = codec(300);
        let token = codec.issue_success(7, now_ts() - 60).unwrap();
        assert!(codec.decode(&token).is_ok());
    }

    #[test]
    fn foreign_signature_is_invalid() {
        let ours = codec(0);
        let theirs = TokenCodec::new("other-secret", 600, 0);
        let (token, _) = theirs.issue_verify(42).unwrap();
        assert_eq!(ours.decode(&token).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn garbage_is_invalid() {
        assert_eq!(
            codec(0).decode("not-a-token").unwrap_err(),
            TokenError::Invalid
        );
    }
}

//! Signed session tokens
//!
//! Tokens are short-lived HMAC-signed JWTs carrying only `iat` and `exp`.
//! Nothing is stored server-side: a token is valid iff its signature verifies
//! against the process secret and the current time is before `exp`.

use std::fmt;
use std::time::Duration;

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
    errors::ErrorKind, get_current_timestamp,
};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::auth_error::{AuthError, AuthResult};

/// Default token lifetime (1 hour)
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Length of a generated secret in bytes
pub const GENERATED_SECRET_LEN: usize = 32;

/// Algorithm used when signing new tokens
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// HMAC key shared by token issuance and validation
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionSecret(Vec<u8>);

impl SessionSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Draw a fresh secret from the OS random number generator.
    ///
    /// Tokens signed with a generated secret do not survive a restart.
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; GENERATED_SECRET_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionSecret(<redacted>)")
    }
}

/// Registered claims carried by a session token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Issued-at, unix seconds
    pub iat: u64,
    /// Expiry, unix seconds
    pub exp: u64,
}

/// Issues and validates session tokens against a single secret
#[derive(Debug, Clone)]
pub struct SessionTokenService {
    secret: SessionSecret,
    ttl: Duration,
}

impl SessionTokenService {
    pub fn new(secret: SessionSecret) -> Self {
        Self {
            secret,
            ttl: DEFAULT_TOKEN_TTL,
        }
    }

    /// Override the token lifetime.
    pub fn with_expiry(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token valid from now until now + ttl.
    pub fn issue_token(&self) -> AuthResult<String> {
        self.issue_token_at(get_current_timestamp())
    }

    /// Sign a token with an explicit issue time (unix seconds).
    pub fn issue_token_at(&self, issued_at: u64) -> AuthResult<String> {
        let claims = SessionClaims {
            iat: issued_at,
            exp: issued_at.saturating_add(self.ttl.as_secs()),
        };

        encode(
            &Header::new(SIGNING_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenIssue(e.to_string()))
    }

    /// Verify the token's algorithm, signature and expiry.
    ///
    /// Only HMAC algorithms are accepted; a token whose header names any
    /// other algorithm is rejected before its signature is looked at.
    pub fn validate_token(&self, token: &str) -> AuthResult<SessionClaims> {
        let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        if !is_hmac(header.alg) {
            return Err(AuthError::UnexpectedAlgorithm(format!("{:?}", header.alg)));
        }

        let mut validation = Validation::new(header.alg);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidAlgorithm => {
                AuthError::UnexpectedAlgorithm(format!("{:?}", header.alg))
            }
            _ => AuthError::InvalidToken(e.to_string()),
        })?;

        // jsonwebtoken accepts exp == now; a token is only valid strictly before exp
        if data.claims.exp <= get_current_timestamp() {
            return Err(AuthError::TokenExpired);
        }

        Ok(data.claims)
    }
}

fn is_hmac(alg: Algorithm) -> bool {
    matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

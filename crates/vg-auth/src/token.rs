use chrono::{DateTime, Duration, Utc};
use vg_crypto::{CryptoError, SigningSecret, TokenClaims, TokenSigner};
use vg_types::{Identity, UserId};

use crate::error::{AuthError, AuthResult};

/// Lifetime of an issued token.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::hours(24);

/// A freshly issued token and its expiry.
#[derive(Clone, Debug)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies bearer tokens.
///
/// Verification is a pure function of signature and expiry. It trusts the
/// embedded identity and does not re-check the credential store, and there
/// is no revocation: a token stays valid until it expires.
#[derive(Clone, Debug)]
pub struct TokenService {
    signer: TokenSigner,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &SigningSecret) -> Self {
        Self::with_ttl(secret, DEFAULT_TOKEN_TTL)
    }

    pub fn with_ttl(secret: &SigningSecret, ttl: Duration) -> Self {
        Self {
            signer: TokenSigner::new(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `identity` valid from now for the configured TTL.
    pub fn issue(&self, identity: &Identity) -> AuthResult<IssuedToken> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> AuthResult<IssuedToken> {
        let expires_at = now + self.ttl;
        let claims = TokenClaims {
            sub: identity.username.clone(),
            user_id: identity.user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = self.signer.sign(&claims)?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Verify a token and return the identity it was issued to.
    pub fn verify(&self, token: &str) -> AuthResult<Identity> {
        let claims = self.signer.verify(token).map_err(|e| match e {
            CryptoError::Expired => AuthError::TokenExpired,
            other => AuthError::InvalidToken(other.to_string()),
        })?;
        let user_id = UserId::parse(&claims.user_id)
            .map_err(|_| AuthError::InvalidToken("invalid user_id in token".into()))?;
        if claims.sub.is_empty() {
            return Err(AuthError::InvalidToken("invalid username in token".into()));
        }
        Ok(Identity::new(user_id, claims.sub))
    }
}

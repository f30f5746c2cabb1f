//! Access token signing and verification.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::models::{AccessTokenClaims, AuthContext};
use crate::errors::LeagueResult;

/// Signs and verifies HS256 access tokens carrying an [`AuthContext`]
#[derive(Clone)]
pub struct TokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_duration: Duration,
}

impl TokenVerifier {
    /// Create a verifier from the shared JWT secret
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            access_token_duration: Duration::hours(72),
        }
    }

    /// Override the token lifetime
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.access_token_duration = duration;
        self
    }

    /// Issue a token for a caller
    pub fn issue(&self, ctx: &AuthContext) -> LeagueResult<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: ctx.user_id,
            role: ctx.role,
            team_id: ctx.team_id,
            iat: now.timestamp(),
            exp: (now + self.access_token_duration).timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Verify a token and recover the caller
    pub fn verify(&self, token: &str) -> LeagueResult<AuthContext> {
        let data = decode::<AccessTokenClaims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims.into())
    }
}

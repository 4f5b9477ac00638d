use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use regiongate_core::{AppError, AppResult, UserId};
use serde::{Deserialize, Serialize};


#[derive(Debug, Serialize, Deserialize)]
struct AccessTokenClaims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies HS256 bearer tokens whose subject is a user id.
#[derive(Clone)]
pub struct AccessTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AccessTokenCodec {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn issue(&self, user_id: UserId, ttl: Duration, now: DateTime<Utc>) -> AppResult<String> {
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::Validation("ttl-minutes is too large".to_owned()))?;
        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|error| AppError::Internal(format!("failed to sign access token: {error}")))
    }

    pub fn verify(&self, token: &str) -> AppResult<UserId> {
        let data =
            jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
                .map_err(|error| AppError::Unauthorized(format!("invalid access token: {error}")))?;

        UserId::parse(data.claims.sub.as_str()).map_err(|_| {
            AppError::Unauthorized("access token subject is not a user id".to_owned())
        })
    }
}

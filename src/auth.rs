use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    headers::{authorization::Bearer, Authorization},
    http::request::Parts,
    Extension, TypedHeader,
};
use jsonwebtoken::{
    errors::Result as JwtResult, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// HS256 keys derived from the base64 `JWT_SECRET`.
#[derive(Clone)]
pub struct JwtKeys(Arc<Keys>);

impl JwtKeys {
    pub fn from_base64_secret(secret: &str) -> JwtResult<Self> {
        Ok(Self(Arc::new(Keys {
            encoding: EncodingKey::from_base64_secret(secret)?,
            decoding: DecodingKey::from_base64_secret(secret)?,
        })))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub exp: u64,
}

pub fn generate_jwt(keys: &JwtKeys, user_id: &str, exp: Duration) -> JwtResult<String> {
    jsonwebtoken::encode(
        &Header::default(),
        &Claims {
            user_id: user_id.to_string(),
            exp: jsonwebtoken::get_current_timestamp() + exp.as_secs(),
        },
        &keys.0.encoding,
    )
}

pub fn validate_jwt(keys: &JwtKeys, token: &str) -> JwtResult<TokenData<Claims>> {
    jsonwebtoken::decode::<Claims>(token, &keys.0.decoding, &Validation::default())
}

/// The caller identified by `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::unauthorized("missing or malformed bearer token"))?;

        let Extension(keys) = Extension::<JwtKeys>::from_request_parts(parts, state)
            .await
            .map_err(|e| anyhow::anyhow!("jwt keys are not installed: {e}"))?;

        let claims = validate_jwt(&keys, bearer.token())
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected bearer token");
                AppError::unauthorized("invalid or expired token")
            })?
            .claims;

        Ok(AuthUser {
            user_id: claims.user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // base64 of "a secret only the tests know"
    const SECRET: &str = "YSBzZWNyZXQgb25seSB0aGUgdGVzdHMga25vdw==";

    #[test]
    fn token_round_trips_user_id() {
        let keys = JwtKeys::from_base64_secret(SECRET).unwrap();
        let token = generate_jwt(&keys, "alice", Duration::from_secs(60)).unwrap();

        let claims = validate_jwt(&keys, &token).unwrap().claims;
        assert_eq!(claims.user_id, "alice");
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = JwtKeys::from_base64_secret(SECRET).unwrap();
        let token = jsonwebtoken::encode(
            &Header::default(),
            &Claims {
                user_id: "alice".to_string(),
                exp: jsonwebtoken::get_current_timestamp() - 3600,
            },
            &keys.0.encoding,
        )
        .unwrap();

        assert!(validate_jwt(&keys, &token).is_err());
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let keys = JwtKeys::from_base64_secret(SECRET).unwrap();
        let other = JwtKeys::from_base64_secret("b3RoZXIgc2VjcmV0").unwrap();
        let token = generate_jwt(&other, "mallory", Duration::from_secs(60)).unwrap();

        assert!(validate_jwt(&keys, &token).is_err());
    }

    #[test]
    fn secret_must_be_base64() {
        assert!(JwtKeys::from_base64_secret("not base64!").is_err());
    }
}

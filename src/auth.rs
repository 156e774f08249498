//! Bearer token authentication.
//!
//! Tokens are issued by the external authentication service and signed with
//! the shared `JWT_SECRET`. Route handlers receive the caller's [Claims] by
//! listing them as an extractor.

use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    user::{User, UserID},
};

/// The contents of a JSON Web Token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub user_id: UserID,
    /// The username of the user the token was issued to.
    pub username: String,
    /// The time the token was issued, in seconds since the Unix epoch.
    pub iat: u64,
    /// The expiry time of the token, in seconds since the Unix epoch.
    pub exp: u64,
}

/// The state needed to verify bearer tokens.
#[derive(Clone)]
pub struct AuthState {
    /// The key for verifying token signatures.
    pub decoding_key: DecodingKey,
}

impl AuthState {
    /// Create the auth state from the shared token secret.
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl<S> FromRequestParts<S> for Claims
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|rejection| {
                if rejection.is_missing() {
                    Error::MissingToken
                } else {
                    Error::InvalidToken
                }
            })?;

        let auth_state = AuthState::from_ref(state);

        decode_jwt(bearer.token(), &auth_state.decoding_key)
    }
}

/// Create a signed token for `user` that expires after `duration`.
///
/// # Errors
/// Returns an [Error::TokenCreation] if the token could not be encoded.
pub fn encode_jwt(
    user: &User,
    encoding_key: &EncodingKey,
    duration: Duration,
) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        user_id: user.id,
        username: user.username.clone(),
        iat: now.unix_timestamp() as u64,
        exp: (now + duration).unix_timestamp() as u64,
    };

    encode(&Header::default(), &claims, encoding_key)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

fn decode_jwt(token: &str, decoding_key: &DecodingKey) -> Result<Claims, Error> {
    decode::<Claims>(token, decoding_key, &Validation::default())
        .map(|token_data| token_data.claims)
        .map_err(|error| {
            tracing::debug!("rejected bearer token: {error}");
            Error::InvalidToken
        })
}

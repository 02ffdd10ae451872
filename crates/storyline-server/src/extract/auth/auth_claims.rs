use jiff::Timestamp;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind, Result};

/// Claims of an HS256 session token.
///
/// The subject is the account id. It becomes the author of created comments
/// and is compared against `created_by` for ownership checks.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AuthClaims {
    #[serde(rename = "iss")]
    issued_by: String,
    #[serde(rename = "aud")]
    audience: String,

    #[serde(rename = "sub")]
    pub account_id: Uuid,

    #[serde(rename = "iat", with = "jiff::fmt::serde::timestamp::second::required")]
    pub issued_at: Timestamp,
    #[serde(rename = "exp", with = "jiff::fmt::serde::timestamp::second::required")]
    pub expires_at: Timestamp,
}

impl AuthClaims {
    const JWT_AUDIENCE: &str = "storyline:server";
    const JWT_ISSUER: &str = "storyline";
    const REQUIRED_CLAIMS: [&str; 5] = ["iss", "aud", "sub", "iat", "exp"];

    pub fn new(account_id: Uuid, issued_at: Timestamp, expires_at: Timestamp) -> Self {
        Self {
            issued_by: Self::JWT_ISSUER.to_owned(),
            audience: Self::JWT_AUDIENCE.to_owned(),
            account_id,
            issued_at,
            expires_at,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Timestamp::now()
    }

    /// Returns whether `account_id` is the caller.
    #[inline]
    #[must_use]
    pub fn is(&self, account_id: Uuid) -> bool {
        self.account_id == account_id
    }

    /// Verifies `token` and returns its claims.
    pub fn from_token(token: &str, decoding_key: &DecodingKey) -> Result<Self> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = true;
        validation.set_audience(&[Self::JWT_AUDIENCE]);
        validation.set_issuer(&[Self::JWT_ISSUER]);
        validation.set_required_spec_claims(&Self::REQUIRED_CLAIMS);

        let claims = decode::<Self>(token, decoding_key, &validation)?.claims;

        // `exp` is checked with leeway above.
        if claims.is_expired() {
            tracing::debug!(
                target: TRACING_TARGET_AUTHENTICATION,
                account_id = %claims.account_id,
                expired_at = %claims.expires_at,
                "session token expired"
            );
            return Err(ErrorKind::Unauthorized
                .with_message("Your session has expired.")
                .with_resource("authentication"));
        }

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            account_id = %claims.account_id,
            expires_at = %claims.expires_at,
            "session token verified"
        );

        Ok(claims)
    }

    /// Signs the claims into a token.
    pub fn into_token(self, encoding_key: &EncodingKey) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), &self, encoding_key).map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %err,
                account_id = %self.account_id,
                "failed to sign session token"
            );
            ErrorKind::InternalServerError.with_context(err.to_string())
        })
    }
}

impl From<JwtError> for Error<'static> {
    fn from(error: JwtError) -> Self {
        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            error = %error,
            "session token rejected"
        );

        let error = match error.kind() {
            JwtErrorKind::ExpiredSignature => {
                ErrorKind::Unauthorized.with_message("Your session has expired.")
            }
            JwtErrorKind::InvalidSignature => {
                ErrorKind::Unauthorized.with_message("Session token signature is invalid.")
            }
            JwtErrorKind::InvalidAudience | JwtErrorKind::InvalidIssuer => ErrorKind::Unauthorized
                .with_message("Session token was not issued for this service."),
            JwtErrorKind::MissingRequiredClaim(claim) => ErrorKind::MalformedAuthToken
                .with_message(format!("Session token is missing the `{claim}` claim.")),
            JwtErrorKind::InvalidToken
            | JwtErrorKind::InvalidAlgorithm
            | JwtErrorKind::Base64(_)
            | JwtErrorKind::Json(_) => ErrorKind::MalformedAuthToken.into_error(),
            _ => ErrorKind::Unauthorized.into_error(),
        };

        error.with_resource("authentication")
    }
}

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use axum_extra::typed_header::TypedHeaderRejectionReason;
use derive_more::Deref;

use super::AuthClaims;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::SessionKeys;

/// Verified session of the caller.
///
/// Extracting it rejects with `401` when the bearer token is missing,
/// malformed, expired or signed with another key. The result is cached in the
/// request extensions.
#[derive(Debug, Clone, Deref, PartialEq, Eq)]
pub struct AuthState(pub AuthClaims);

impl AuthState {
    fn from_header(
        header: TypedHeader<Authorization<Bearer>>,
        session_keys: &SessionKeys,
    ) -> Result<Self> {
        AuthClaims::from_token(header.token(), session_keys.decoding_key()).map(Self)
    }
}

impl<S> FromRequestParts<S> for AuthState
where
    S: Sync + Send,
    SessionKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_state) = parts.extensions.get::<Self>() {
            return Ok(auth_state.clone());
        }

        type AuthBearerHeader = TypedHeader<Authorization<Bearer>>;
        let header = AuthBearerHeader::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                let kind = match rejection.reason() {
                    TypedHeaderRejectionReason::Missing => ErrorKind::MissingAuthToken,
                    _ => ErrorKind::MalformedAuthToken,
                };
                kind.with_resource("authentication")
            })?;

        let session_keys = SessionKeys::from_ref(state);
        let auth_state = Self::from_header(header, &session_keys)?;

        parts.extensions.insert(auth_state.clone());
        Ok(auth_state)
    }
}

impl aide::OperationInput for AuthState {}

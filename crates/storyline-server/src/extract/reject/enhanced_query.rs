use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequestParts, Query as AxumQuery};
use axum::http::request::Parts;
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;

use super::sanitize_error_message;
use crate::TRACING_TARGET_EXTRACT;
use crate::handler::{Error, ErrorKind};

/// [`axum::extract::Query`] rejecting with [`Error`].
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Query<T>(pub T);

impl<T> Query<T> {
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AxumQuery::<T>::from_request_parts(parts, state).await {
            Ok(AxumQuery(query)) => Ok(Query(query)),
            Err(rejection) => Err(rejection.into()),
        }
    }
}

impl From<QueryRejection> for Error<'static> {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(
            target: TRACING_TARGET_EXTRACT,
            error = %rejection,
            "query string rejected"
        );

        let QueryRejection::FailedToDeserializeQueryString(err) = rejection else {
            return ErrorKind::BadRequest.with_message("Query string could not be parsed.");
        };

        let message = err.to_string();
        let error = match extract_field_name(&message) {
            Some(field) if message.contains("duplicate field") => {
                ErrorKind::BadRequest.with_message(format!("Query parameter '{field}' is repeated."))
            }
            Some(field) => {
                ErrorKind::BadRequest.with_message(format!("Query parameter '{field}' is invalid."))
            }
            None => ErrorKind::BadRequest.with_message("Query string could not be parsed."),
        };

        error.with_context(sanitize_error_message(&message, 200))
    }
}

/// Pulls the backtick-quoted field name out of a serde error message.
fn extract_field_name(message: &str) -> Option<&str> {
    let start = message.find('`')? + 1;
    let end = message[start..].find('`')?;
    Some(&message[start..start + end])
}

impl<T> aide::OperationInput for Query<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        AxumQuery::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        AxumQuery::<T>::inferred_early_responses(ctx, operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_name_is_taken_from_backticks() {
        assert_eq!(
            extract_field_name("first: invalid digit found in string at `first`"),
            Some("first")
        );
        assert_eq!(extract_field_name("duplicate field `after`"), Some("after"));
        assert_eq!(extract_field_name("no field here"), None);
    }
}

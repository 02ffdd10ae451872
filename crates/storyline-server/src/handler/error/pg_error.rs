//! Conversions of database and pagination errors into HTTP errors.

use storyline_postgres::PgError;
use storyline_postgres::error::PageError;
use storyline_postgres::types::CommentConstraints;

use crate::TRACING_TARGET_POSTGRES;
use crate::handler::{Error, ErrorKind};

impl From<CommentConstraints> for Error<'static> {
    fn from(constraint: CommentConstraints) -> Self {
        let error = match constraint {
            CommentConstraints::AbstractContentLength => ErrorKind::BadRequest
                .with_message("Comment text must be between 1 and 10000 characters long."),
            CommentConstraints::UpdatedAfterCreated => {
                ErrorKind::InternalServerError.into_error()
            }
        };

        error.with_resource("comment")
    }
}

impl From<PgError> for Error<'static> {
    fn from(error: PgError) -> Self {
        match error {
            PgError::Config(config_error) => {
                tracing::error!(
                    target: TRACING_TARGET_POSTGRES,
                    error = %config_error,
                    "database configuration error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Timeout(timeout) => {
                tracing::error!(
                    target: TRACING_TARGET_POSTGRES,
                    timeout = ?timeout,
                    "database pool timeout"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Connection(connection_error) => {
                tracing::error!(
                    target: TRACING_TARGET_POSTGRES,
                    error = %connection_error,
                    "database connection error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Migration(migration_error) => {
                tracing::error!(
                    target: TRACING_TARGET_POSTGRES,
                    error = %migration_error,
                    "database migration error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Query(ref query_error) => {
                if let Some(constraint_name) = error.constraint()
                    && let Some(constraint) = CommentConstraints::new(constraint_name)
                {
                    tracing::error!(
                        target: TRACING_TARGET_POSTGRES,
                        constraint = constraint_name,
                        category = ?constraint.categorize(),
                        error = %query_error,
                        "query error (constraint violation)"
                    );
                    return constraint.into();
                }

                tracing::error!(
                    target: TRACING_TARGET_POSTGRES,
                    error = %query_error,
                    "query error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Unexpected(unexpected_error) => {
                tracing::error!(
                    target: TRACING_TARGET_POSTGRES,
                    error = %unexpected_error,
                    "unexpected database error"
                );
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}

impl From<PageError<PgError>> for Error<'static> {
    fn from(error: PageError<PgError>) -> Self {
        match error {
            PageError::InvalidCursor(cursor_error) => {
                tracing::debug!(
                    target: TRACING_TARGET_POSTGRES,
                    error = %cursor_error,
                    "rejected pagination cursor"
                );
                ErrorKind::BadRequest
                    .with_message("Pagination cursor is invalid.")
                    .with_context(cursor_error.to_string())
                    .with_resource("pagination")
            }
            PageError::InvalidArguments(reason) => ErrorKind::BadRequest
                .with_message(reason)
                .with_resource("pagination"),
            PageError::Store(store_error) => store_error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use storyline_postgres::error::{CursorError, DieselError, TimeoutType};

    use super::*;

    #[test]
    fn invalid_cursor_is_bad_request() {
        let error = Error::from(PageError::<PgError>::InvalidCursor(CursorError::Malformed));
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.resource(), Some("pagination"));
    }

    #[test]
    fn conflicting_arguments_are_bad_request() {
        let error = Error::from(PageError::<PgError>::InvalidArguments(
            "`first` and `last` cannot be combined",
        ));
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert!(error.message().is_some_and(|m| m.contains("`first`")));
    }

    #[test]
    fn store_errors_keep_their_kind() {
        let error = Error::from(PageError::Store(PgError::Query(DieselError::NotFound)));
        assert_eq!(error.kind(), ErrorKind::InternalServerError);

        let error = Error::from(PageError::Store(PgError::Timeout(TimeoutType::Wait)));
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
    }

    #[test]
    fn store_failures_hide_detail() {
        let error = Error::from(PgError::Config("postgres_url cannot be empty".into()));
        assert!(error.message().is_none());
        assert!(error.context().is_none());
    }

    #[test]
    fn length_constraint_is_bad_request() {
        let error = Error::from(CommentConstraints::AbstractContentLength);
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.resource(), Some("comment"));
    }
}

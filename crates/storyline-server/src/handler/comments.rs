//! Story comment handlers.
//!
//! Reads are public. Creating requires a session, and updating or deleting
//! additionally requires being the comment's author.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use storyline_postgres::query::CommentRepository;
use storyline_postgres::{PgClient, PgConn, PgError, model};
use uuid::Uuid;

use crate::extract::{AuthState, Json, Path, ValidateJson, ValidateQuery};
use crate::handler::request::{
    CommentPathParams, CreateComment, ListComments, StoryPathParams, UpdateComment,
};
use crate::handler::response::{Comment, CommentsConnection, ErrorResponse};
use crate::handler::{Error, ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for comment operations.
const TRACING_TARGET: &str = "storyline_server::handler::comments";

/// Creates a new comment on a story.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_claims.account_id,
        story_id = %path_params.story_id,
    )
)]
async fn post_comment(
    State(pg_client): State<PgClient>,
    AuthState(auth_claims): AuthState,
    Path(path_params): Path<StoryPathParams>,
    ValidateJson(request): ValidateJson<CreateComment>,
) -> Result<(StatusCode, Json<Comment>)> {
    tracing::debug!(target: TRACING_TARGET, "Creating comment");

    let mut conn = pg_client.get_connection().await?;
    let comment = conn
        .create_comment(request.into_model(auth_claims.account_id, path_params.story_id))
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        comment_id = %comment.id,
        "Comment created",
    );

    Ok((StatusCode::CREATED, Json(Comment::from_model(comment))))
}

fn post_comment_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Create comment")
        .description("Creates a new comment on a story, authored by the caller.")
        .response::<201, Json<Comment>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
}

/// Lists the comments of one story.
#[tracing::instrument(skip_all, fields(story_id = %path_params.story_id))]
async fn list_story_comments(
    State(pg_client): State<PgClient>,
    Path(path_params): Path<StoryPathParams>,
    ValidateQuery(request): ValidateQuery<ListComments>,
) -> Result<(StatusCode, Json<CommentsConnection>)> {
    tracing::debug!(target: TRACING_TARGET, "Listing story comments");

    let page_request = request.into_page_request(Some(path_params.story_id))?;
    // Argument errors answer 400 even when the database is unreachable.
    page_request.resolve::<PgError>()?;

    let mut conn = pg_client.get_connection().await?;
    let page = conn.cursor_list_comments(&page_request).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        comment_count = page.len(),
        has_next = page.has_next,
        has_prev = page.has_prev,
        "Story comments listed",
    );

    Ok((StatusCode::OK, Json(CommentsConnection::from_page(page))))
}

fn list_story_comments_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List story comments")
        .description(
            "Returns one page of a story's comments in creation order. Page forward with \
             `first` and `after`, or backward with `last` and `before`.",
        )
        .response::<200, Json<CommentsConnection>>()
        .response::<400, Json<ErrorResponse>>()
}

/// Lists comments across stories, optionally restricted to given ids.
#[tracing::instrument(skip_all)]
async fn list_comments(
    State(pg_client): State<PgClient>,
    ValidateQuery(request): ValidateQuery<ListComments>,
) -> Result<(StatusCode, Json<CommentsConnection>)> {
    tracing::debug!(target: TRACING_TARGET, "Listing comments");

    let page_request = request.into_page_request(None)?;
    // Argument errors answer 400 even when the database is unreachable.
    page_request.resolve::<PgError>()?;

    let mut conn = pg_client.get_connection().await?;
    let page = conn.cursor_list_comments(&page_request).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        id_filter = page_request.ids.len(),
        comment_count = page.len(),
        "Comments listed",
    );

    Ok((StatusCode::OK, Json(CommentsConnection::from_page(page))))
}

fn list_comments_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List comments")
        .description(
            "Returns one page of comments in creation order. `ids` takes a comma-separated \
             list of comment ids to restrict the listing to.",
        )
        .response::<200, Json<CommentsConnection>>()
        .response::<400, Json<ErrorResponse>>()
}

/// Returns a comment by ID.
#[tracing::instrument(skip_all, fields(comment_id = %path_params.comment_id))]
async fn get_comment(
    State(pg_client): State<PgClient>,
    Path(path_params): Path<CommentPathParams>,
) -> Result<(StatusCode, Json<Comment>)> {
    tracing::debug!(target: TRACING_TARGET, "Reading comment");

    let mut conn = pg_client.get_connection().await?;
    let comment = find_comment(&mut conn, path_params.comment_id).await?;

    Ok((StatusCode::OK, Json(Comment::from_model(comment))))
}

fn get_comment_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get comment")
        .description("Returns a comment by ID.")
        .response::<200, Json<Comment>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Updates a comment by ID.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_claims.account_id,
        comment_id = %path_params.comment_id,
    )
)]
async fn update_comment(
    State(pg_client): State<PgClient>,
    AuthState(auth_claims): AuthState,
    Path(path_params): Path<CommentPathParams>,
    ValidateJson(request): ValidateJson<UpdateComment>,
) -> Result<(StatusCode, Json<Comment>)> {
    tracing::debug!(target: TRACING_TARGET, "Updating comment");

    let mut conn = pg_client.get_connection().await?;

    let existing_comment = find_comment(&mut conn, path_params.comment_id).await?;
    if !existing_comment.is_created_by(auth_claims.account_id) {
        return Err(ErrorKind::Forbidden
            .with_message("You can only update your own comments.")
            .with_resource("comment"));
    }

    // None if the comment was deleted after the ownership check.
    let comment = conn
        .update_comment(path_params.comment_id, request.into_model())
        .await?;
    let comment = found(comment)?;

    tracing::info!(target: TRACING_TARGET, "Comment updated");

    Ok((StatusCode::OK, Json(Comment::from_model(comment))))
}

fn update_comment_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Update comment")
        .description("Updates a comment by ID. Only the author may update a comment.")
        .response::<200, Json<Comment>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Deletes a comment by ID.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_claims.account_id,
        comment_id = %path_params.comment_id,
    )
)]
async fn delete_comment(
    State(pg_client): State<PgClient>,
    AuthState(auth_claims): AuthState,
    Path(path_params): Path<CommentPathParams>,
) -> Result<StatusCode> {
    tracing::debug!(target: TRACING_TARGET, "Deleting comment");

    let mut conn = pg_client.get_connection().await?;

    let existing_comment = find_comment(&mut conn, path_params.comment_id).await?;
    if !existing_comment.is_created_by(auth_claims.account_id) {
        return Err(ErrorKind::Forbidden
            .with_message("You can only delete your own comments.")
            .with_resource("comment"));
    }

    // False if the comment was deleted after the ownership check.
    removed(conn.delete_comment(path_params.comment_id).await?)?;

    tracing::info!(target: TRACING_TARGET, "Comment deleted");

    Ok(StatusCode::NO_CONTENT)
}

fn delete_comment_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Delete comment")
        .description("Permanently deletes a comment by ID. Only the author may delete a comment.")
        .response_with::<204, (), _>(|res| res.description("Comment deleted."))
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Finds a comment by ID or returns NotFound error.
async fn find_comment(conn: &mut PgConn, comment_id: Uuid) -> Result<model::Comment> {
    found(conn.find_comment_by_id(comment_id).await?)
}

/// Turns a missing row into a comment NotFound error.
fn found(comment: Option<model::Comment>) -> Result<model::Comment> {
    comment.ok_or_else(comment_not_found)
}

/// Turns a delete that removed no row into a comment NotFound error.
fn removed(deleted: bool) -> Result<()> {
    if deleted {
        Ok(())
    } else {
        Err(comment_not_found())
    }
}

fn comment_not_found() -> Error<'static> {
    ErrorKind::NotFound
        .with_message("Comment not found.")
        .with_resource("comment")
}

/// Returns a [`Router`] with all comment-related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/stories/{storyId}/comments",
            post_with(post_comment, post_comment_docs)
                .get_with(list_story_comments, list_story_comments_docs),
        )
        .api_route("/comments", get_with(list_comments, list_comments_docs))
        .api_route(
            "/comments/{commentId}",
            get_with(get_comment, get_comment_docs)
                .patch_with(update_comment, update_comment_docs)
                .delete_with(delete_comment, delete_comment_docs),
        )
        .with_path_items(|item| item.tag("Comments"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use jiff::Timestamp;

    use super::*;

    fn comment() -> model::Comment {
        let now = Timestamp::now();
        model::Comment {
            id: Uuid::now_v7(),
            story_id: Uuid::now_v7(),
            created_by: Uuid::now_v7(),
            abstract_content: "Great opening".to_owned(),
            content_json: serde_json::json!({"type": "doc"}),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn vanished_update_is_not_found() {
        let error = found(None).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.resource(), Some("comment"));

        let comment = comment();
        assert_eq!(found(Some(comment.clone())).unwrap(), comment);
    }

    #[test]
    fn delete_without_removed_row_is_not_found() {
        let error = removed(false).unwrap_err();
        assert_eq!(error.kind().status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error.resource(), Some("comment"));
        assert!(removed(true).is_ok());
    }
}

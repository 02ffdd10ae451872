//! Comment repository for story comment operations.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{Comment, NewComment, UpdateComment};
use crate::types::{Page, PageError, PageRequest, RangeQuery, RangeStore, SortOrder, paginate};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for comment database operations.
pub trait CommentRepository {
    /// Creates a new comment.
    fn create_comment(
        &mut self,
        new_comment: NewComment,
    ) -> impl Future<Output = PgResult<Comment>> + Send;

    /// Finds a comment by its unique identifier.
    fn find_comment_by_id(
        &mut self,
        comment_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Comment>>> + Send;

    /// Updates a comment and refreshes its `updated_at`.
    ///
    /// Returns `None` if the comment does not exist.
    fn update_comment(
        &mut self,
        comment_id: Uuid,
        changes: UpdateComment,
    ) -> impl Future<Output = PgResult<Option<Comment>>> + Send;

    /// Permanently deletes a comment, returning whether a row was removed.
    fn delete_comment(&mut self, comment_id: Uuid) -> impl Future<Output = PgResult<bool>> + Send;

    /// Lists comments with bidirectional cursor pagination.
    fn cursor_list_comments(
        &mut self,
        request: &PageRequest,
    ) -> impl Future<Output = Result<Page<Comment>, PageError<PgError>>> + Send;
}

impl CommentRepository for PgConnection {
    async fn create_comment(&mut self, new_comment: NewComment) -> PgResult<Comment> {
        use schema::comments;

        let comment = diesel::insert_into(comments::table)
            .values(&new_comment)
            .returning(Comment::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            comment_id = %comment.id,
            story_id = %comment.story_id,
            "Comment created"
        );

        Ok(comment)
    }

    async fn find_comment_by_id(&mut self, comment_id: Uuid) -> PgResult<Option<Comment>> {
        use schema::comments::{self, dsl};

        let comment = comments::table
            .filter(dsl::id.eq(comment_id))
            .select(Comment::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(comment)
    }

    async fn update_comment(
        &mut self,
        comment_id: Uuid,
        changes: UpdateComment,
    ) -> PgResult<Option<Comment>> {
        use diesel::dsl::now;
        use schema::comments::{self, dsl};

        let comment = diesel::update(comments::table.filter(dsl::id.eq(comment_id)))
            .set((&changes, dsl::updated_at.eq(now)))
            .returning(Comment::as_returning())
            .get_result(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(comment)
    }

    async fn delete_comment(&mut self, comment_id: Uuid) -> PgResult<bool> {
        use schema::comments::{self, dsl};

        let deleted = diesel::delete(comments::table.filter(dsl::id.eq(comment_id)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(deleted > 0)
    }

    async fn cursor_list_comments(
        &mut self,
        request: &PageRequest,
    ) -> Result<Page<Comment>, PageError<PgError>> {
        paginate(self, request).await
    }
}

impl RangeStore<Comment> for PgConnection {
    type Error = PgError;

    async fn range_query(&mut self, query: &RangeQuery) -> PgResult<Vec<Comment>> {
        use schema::comments::{self, dsl};

        let mut select = comments::table
            .select(Comment::as_select())
            .into_boxed();

        if !query.filter.ids.is_empty() {
            select = select.filter(dsl::id.eq_any(query.filter.ids.clone()));
        }

        if let Some(story_id) = query.filter.story_id {
            select = select.filter(dsl::story_id.eq(story_id));
        }

        if let Some(boundary) = query.boundary {
            let boundary_time = || jiff_diesel::Timestamp::from(boundary.timestamp);

            select = match query.order {
                SortOrder::Ascending => select.filter(
                    dsl::created_at.gt(boundary_time()).or(dsl::created_at
                        .eq(boundary_time())
                        .and(dsl::id.ge(boundary.id))),
                ),
                SortOrder::Descending => select.filter(
                    dsl::created_at.lt(boundary_time()).or(dsl::created_at
                        .eq(boundary_time())
                        .and(dsl::id.le(boundary.id))),
                ),
            };
        }

        select = match query.order {
            SortOrder::Ascending => select.order((dsl::created_at.asc(), dsl::id.asc())),
            SortOrder::Descending => select.order((dsl::created_at.desc(), dsl::id.desc())),
        };

        let comments = select
            .limit(query.limit)
            .load(self)
            .await
            .map_err(PgError::from)?;

        tracing::trace!(
            target: TRACING_TARGET_QUERY,
            order = ?query.order,
            limit = query.limit,
            rows = comments.len(),
            "Comment range read"
        );

        Ok(comments)
    }
}

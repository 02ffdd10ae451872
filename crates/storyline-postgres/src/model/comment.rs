//! Comment model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::comments;
use crate::types::{Cursor, HasCursor, RangeRecord};

/// Comment model representing a remark attached to a story.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Comment {
    /// Unique comment identifier.
    pub id: Uuid,
    /// Reference to the story the comment belongs to.
    pub story_id: Uuid,
    /// Reference to the account that authored this comment.
    pub created_by: Uuid,
    /// Plain-text summary of the comment.
    pub abstract_content: String,
    /// Rich content document.
    pub content_json: serde_json::Value,
    /// Timestamp when the comment was created.
    pub created_at: Timestamp,
    /// Timestamp when the comment was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new comment.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewComment {
    /// Comment ID, time-ordered.
    pub id: Uuid,
    /// Story ID.
    pub story_id: Uuid,
    /// Author account ID.
    pub created_by: Uuid,
    /// Plain-text summary.
    pub abstract_content: String,
    /// Rich content document.
    pub content_json: serde_json::Value,
}

/// Data for updating a comment.
///
/// `updated_at` is refreshed by the repository on every update.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateComment {
    /// Plain-text summary.
    pub abstract_content: Option<String>,
    /// Rich content document.
    pub content_json: Option<serde_json::Value>,
}

impl Comment {
    /// Returns whether the given account authored this comment.
    #[inline]
    pub fn is_created_by(&self, account_id: Uuid) -> bool {
        self.created_by == account_id
    }

    /// Returns whether this comment has been edited since it was created.
    pub fn is_edited(&self) -> bool {
        jiff::Timestamp::from(self.updated_at) > jiff::Timestamp::from(self.created_at)
    }
}

impl NewComment {
    /// Creates a new comment on a story with a fresh UUIDv7 id.
    pub fn new(
        story_id: Uuid,
        created_by: Uuid,
        abstract_content: String,
        content_json: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            story_id,
            created_by,
            abstract_content,
            content_json,
        }
    }
}

impl UpdateComment {
    /// Returns whether the update changes no field.
    pub fn is_empty(&self) -> bool {
        self.abstract_content.is_none() && self.content_json.is_none()
    }
}

impl HasCursor for Comment {
    fn cursor(&self) -> Cursor {
        Cursor::new(self.created_at.into(), self.id)
    }
}

impl RangeRecord for Comment {
    fn story_id(&self) -> Uuid {
        self.story_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(created_at: jiff::Timestamp, updated_at: jiff::Timestamp) -> Comment {
        Comment {
            id: Uuid::now_v7(),
            story_id: Uuid::now_v7(),
            created_by: Uuid::now_v7(),
            abstract_content: "Looks good".into(),
            content_json: serde_json::json!({}),
            created_at: created_at.into(),
            updated_at: updated_at.into(),
        }
    }

    #[test]
    fn cursor_uses_creation_time() {
        let created_at = jiff::Timestamp::from_second(1_000).unwrap();
        let updated_at = jiff::Timestamp::from_second(2_000).unwrap();
        let comment = comment(created_at, updated_at);

        let cursor = comment.cursor();
        assert_eq!(cursor.timestamp, created_at);
        assert_eq!(cursor.id, comment.id);
        assert!(comment.is_edited());
    }

    #[test]
    fn new_comment_ids_are_time_ordered() {
        let story_id = Uuid::now_v7();
        let author = Uuid::now_v7();
        let first = NewComment::new(story_id, author, "a".into(), serde_json::json!({}));
        let second = NewComment::new(story_id, author, "b".into(), serde_json::json!({}));

        assert_eq!(first.id.get_version_num(), 7);
        assert!(first.id < second.id);
    }

    #[test]
    fn empty_update() {
        assert!(UpdateComment::default().is_empty());
        let update = UpdateComment {
            abstract_content: Some("edited".into()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}

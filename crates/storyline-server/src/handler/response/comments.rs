//! Comment response types.

use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use storyline_postgres::model;
use storyline_postgres::types::{HasCursor, Page};
use uuid::Uuid;

/// Represents a story comment.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// ID of the comment.
    pub comment_id: Uuid,
    /// ID of the story this comment belongs to.
    pub story_id: Uuid,
    /// ID of the account that created the comment.
    pub created_by: Uuid,
    /// Plain-text rendition of the comment.
    pub abstract_content: String,
    /// Rich-text document of the comment.
    pub content_json: serde_json::Value,
    /// Whether the comment changed after it was created.
    pub is_edited: bool,
    /// Timestamp when the comment was created.
    pub created_at: Timestamp,
    /// Timestamp when the comment was last updated.
    pub updated_at: Timestamp,
}

impl Comment {
    /// Creates a Comment response from a database model.
    pub fn from_model(comment: model::Comment) -> Self {
        Self {
            is_edited: comment.is_edited(),
            comment_id: comment.id,
            story_id: comment.story_id,
            created_by: comment.created_by,
            abstract_content: comment.abstract_content,
            content_json: comment.content_json,
            created_at: comment.created_at.into(),
            updated_at: comment.updated_at.into(),
        }
    }
}

/// One comment of a listing together with its position.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentEdge {
    pub node: Comment,
    /// Opaque cursor of this comment, usable as `after` or `before`.
    pub cursor: String,
}

/// Adjacency flags and boundary cursors of a listing page.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

/// A page of comments in ascending creation order.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentsConnection {
    pub edges: Vec<CommentEdge>,
    pub page_info: PageInfo,
}

impl CommentsConnection {
    /// Creates a connection from a page of database models.
    pub fn from_page(page: Page<model::Comment>) -> Self {
        let page_info = PageInfo {
            has_next_page: page.has_next,
            has_previous_page: page.has_prev,
            start_cursor: page.start_cursor.map(|cursor| cursor.encode()),
            end_cursor: page.end_cursor.map(|cursor| cursor.encode()),
        };

        let edges = page
            .records
            .into_iter()
            .map(|comment| CommentEdge {
                cursor: comment.cursor().encode(),
                node: Comment::from_model(comment),
            })
            .collect();

        Self { edges, page_info }
    }
}

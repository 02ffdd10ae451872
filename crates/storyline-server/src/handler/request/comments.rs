//! Comment request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use storyline_postgres::model;
use storyline_postgres::types::PageRequest;
use uuid::Uuid;
use validator::Validate;

use crate::handler::{ErrorKind, Result};

/// Request payload for creating a new comment.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    /// Plain-text rendition of the comment.
    #[validate(length(min = 1, max = 10000))]
    pub abstract_content: String,
    /// Rich-text document of the comment.
    pub content_json: serde_json::Value,
}

impl CreateComment {
    /// Converts to database model.
    pub fn into_model(self, account_id: Uuid, story_id: Uuid) -> model::NewComment {
        model::NewComment::new(story_id, account_id, self.abstract_content, self.content_json)
    }
}

/// Request payload to update a comment. Absent fields are left unchanged.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComment {
    /// Updated plain-text rendition.
    #[validate(length(min = 1, max = 10000))]
    pub abstract_content: Option<String>,
    /// Updated rich-text document.
    pub content_json: Option<serde_json::Value>,
}

impl UpdateComment {
    /// Converts to database model.
    pub fn into_model(self) -> model::UpdateComment {
        model::UpdateComment {
            abstract_content: self.abstract_content,
            content_json: self.content_json,
        }
    }
}

/// Connection-style listing arguments.
///
/// `first` with `after` pages forward, `last` with `before` pages backward.
#[must_use]
#[derive(Debug, Default, Clone, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListComments {
    /// Comma-separated comment ids to restrict the listing to.
    pub ids: Option<String>,
    /// Number of comments after the `after` cursor.
    #[validate(range(min = 1, max = 100))]
    pub first: Option<i64>,
    /// Cursor the forward page starts after.
    pub after: Option<String>,
    /// Number of comments before the `before` cursor.
    #[validate(range(min = 1, max = 100))]
    pub last: Option<i64>,
    /// Cursor the backward page ends before.
    pub before: Option<String>,
}

impl ListComments {
    /// Builds the page request, optionally scoped to one story.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::BadRequest`] if `ids` holds anything but UUIDs.
    pub fn into_page_request(self, story_id: Option<Uuid>) -> Result<PageRequest> {
        let ids = match self.ids.as_deref() {
            Some(ids) => parse_ids(ids)?,
            None => Vec::new(),
        };

        Ok(PageRequest {
            ids,
            story_id,
            after: self.after,
            before: self.before,
            first: self.first,
            last: self.last,
        })
    }
}

/// Parses a comma-separated id list. Blank entries are skipped.
fn parse_ids(ids: &str) -> Result<Vec<Uuid>> {
    ids.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            Uuid::parse_str(id).map_err(|_| {
                ErrorKind::BadRequest
                    .with_message(format!("'{id}' is not a valid comment id."))
                    .with_resource("comment")
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_split_and_trimmed() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let request = ListComments {
            ids: Some(format!("{a}, {b},")),
            first: Some(5),
            ..ListComments::default()
        };

        let page_request = request.into_page_request(None).unwrap();
        assert_eq!(page_request.ids, vec![a, b]);
        assert_eq!(page_request.first, Some(5));
        assert_eq!(page_request.story_id, None);
    }

    #[test]
    fn missing_ids_mean_no_filter() {
        let story_id = Uuid::now_v7();
        let page_request = ListComments::default()
            .into_page_request(Some(story_id))
            .unwrap();

        assert!(page_request.ids.is_empty());
        assert_eq!(page_request.story_id, Some(story_id));
    }

    #[test]
    fn invalid_ids_are_bad_request() {
        let request = ListComments {
            ids: Some("not-a-uuid".to_owned()),
            ..ListComments::default()
        };

        let error = request.into_page_request(None).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn page_sizes_are_bounded() {
        let too_large = ListComments {
            first: Some(101),
            ..ListComments::default()
        };
        assert!(too_large.validate().is_err());

        let zero = ListComments {
            last: Some(0),
            ..ListComments::default()
        };
        assert!(zero.validate().is_err());

        let fine = ListComments {
            last: Some(100),
            ..ListComments::default()
        };
        assert!(fine.validate().is_ok());
    }

    #[test]
    fn empty_abstract_content_is_invalid() {
        let request = CreateComment {
            abstract_content: String::new(),
            content_json: serde_json::json!({"type": "doc"}),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn update_fields_are_optional() {
        let request: UpdateComment =
            serde_json::from_str(r#"{"contentJson": {"type": "doc"}}"#).unwrap();
        assert!(request.validate().is_ok());

        let model = request.into_model();
        assert!(model.abstract_content.is_none());
        assert!(!model.is_empty());
    }
}

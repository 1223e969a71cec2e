//! Author model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::Book;

/// Author as stored and returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Books written by this author, loaded on single-author reads only
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub books: Option<Vec<Book>>,
}

/// Author body for create and full update
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorInput {
    pub id: Option<i64>,
    #[validate(required(message = "must not be null"))]
    pub first_name: Option<String>,
    #[validate(required(message = "must not be null"))]
    pub last_name: Option<String>,
}

/// Author body for partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorPatch {
    pub id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl AuthorInput {
    /// Convert into an author carrying `id` (0 for a new one); `None` when a required field is missing
    pub fn into_author(self) -> Option<Author> {
        Some(Author {
            id: self.id.unwrap_or_default(),
            first_name: self.first_name?,
            last_name: self.last_name?,
            books: None,
        })
    }
}

impl AuthorPatch {
    pub fn apply_to(self, author: &mut Author) {
        if let Some(first_name) = self.first_name {
            author.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            author.last_name = last_name;
        }
    }
}

//! Book model and related types.
//!
//! Books own both many-to-many links: the authors and categories of a book are
//! written through the book, never through the author or category.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{author::Author, category::Category};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub isbn: String,
    pub image_path: Option<String>,
    pub publisher: Option<String>,
    pub date_of_publication: Option<NaiveDate>,
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<Author>>,
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
}

/// Reference to a related entity by id (other fields are ignored)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
pub struct EntityRef {
    pub id: i64,
}

/// Book body for create and full update
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    pub id: Option<i64>,
    #[validate(required(message = "must not be null"))]
    pub title: Option<String>,
    #[validate(required(message = "must not be null"))]
    pub isbn: Option<String>,
    pub image_path: Option<String>,
    pub publisher: Option<String>,
    pub date_of_publication: Option<NaiveDate>,
    #[serde(default)]
    pub authors: Vec<EntityRef>,
    #[serde(default)]
    pub categories: Vec<EntityRef>,
}

impl BookInput {
    pub fn author_ids(&self) -> Vec<i64> {
        unique_ids(&self.authors)
    }

    pub fn category_ids(&self) -> Vec<i64> {
        unique_ids(&self.categories)
    }

    /// Scalar fields as a book carrying `id` (0 for a new one); `None` when a required field is missing
    pub fn into_book(self) -> Option<Book> {
        Some(Book {
            id: self.id.unwrap_or_default(),
            title: self.title?,
            isbn: self.isbn?,
            image_path: self.image_path,
            publisher: self.publisher,
            date_of_publication: self.date_of_publication,
            authors: None,
            categories: None,
        })
    }
}

fn unique_ids(refs: &[EntityRef]) -> Vec<i64> {
    refs.iter()
        .map(|r| r.id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Book body for partial update. Links are not changed by a partial update.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub image_path: Option<String>,
    pub publisher: Option<String>,
    pub date_of_publication: Option<NaiveDate>,
}

impl BookPatch {
    pub fn apply_to(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(isbn) = self.isbn {
            book.isbn = isbn;
        }
        if self.image_path.is_some() {
            book.image_path = self.image_path;
        }
        if self.publisher.is_some() {
            book.publisher = self.publisher;
        }
        if self.date_of_publication.is_some() {
            book.date_of_publication = self.date_of_publication;
        }
    }
}

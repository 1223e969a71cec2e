//! Category model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::Book;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// Books in this category, loaded on single-category reads only
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub books: Option<Vec<Book>>,
}

/// Category body for create and full update
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CategoryInput {
    pub id: Option<i64>,
    #[validate(required(message = "must not be null"))]
    pub name: Option<String>,
}

/// Category body for partial update
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CategoryPatch {
    pub id: Option<i64>,
    pub name: Option<String>,
}

impl CategoryInput {
    pub fn into_category(self) -> Option<Category> {
        Some(Category {
            id: self.id.unwrap_or_default(),
            name: self.name?,
            books: None,
        })
    }
}

impl CategoryPatch {
    pub fn apply_to(self, category: &mut Category) {
        if let Some(name) = self.name {
            category.name = name;
        }
    }
}

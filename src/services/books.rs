//! Book management service

use validator::Validate;

use crate::{
    criteria::{BookCriteria, Criteria},
    error::{AppError, AppResult},
    models::book::{Book, BookInput, BookPatch},
    pagination::{Page, Pageable},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a book, or fully replace it (links included) when the input carries an id
    pub async fn save(&self, input: BookInput) -> AppResult<Book> {
        tracing::debug!("Request to save Book : {:?}", input);
        input.validate()?;
        let is_new = input.id.is_none();
        let author_ids = input.author_ids();
        let category_ids = input.category_ids();
        let book = input
            .into_book()
            .ok_or_else(|| AppError::Validation("Book is missing a required field".to_string()))?;

        if is_new {
            self.repository.books.create(&book, &author_ids, &category_ids).await
        } else {
            self.repository.books.update(&book, &author_ids, &category_ids).await
        }
    }

    /// Overwrite the fields present in `patch`; authors and categories are kept
    pub async fn partial_update(&self, id: i64, patch: BookPatch) -> AppResult<Option<Book>> {
        tracing::debug!("Request to partially update Book : {:?}", patch);
        let Some(mut existing) = self.repository.books.get_by_id(id).await? else {
            return Ok(None);
        };
        patch.apply_to(&mut existing);
        self.repository.books.update_fields(&existing).await.map(Some)
    }

    pub async fn find_all(&self, pageable: &Pageable, eager: bool) -> AppResult<Page<Book>> {
        tracing::debug!("Request to get all Books");
        self.find_by_criteria(&BookCriteria::default(), pageable, eager).await
    }

    pub async fn find_one(&self, id: i64) -> AppResult<Option<Book>> {
        tracing::debug!("Request to get Book : {}", id);
        self.repository.books.get_by_id(id).await
    }

    pub async fn find_one_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        tracing::debug!("Request to get Book by isbn : {}", isbn);
        self.repository.books.get_by_isbn(isbn).await
    }

    pub async fn exists(&self, id: i64) -> AppResult<bool> {
        self.repository.books.exists(id).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        tracing::debug!("Request to delete Book : {}", id);
        self.repository.books.delete(id).await
    }

    pub async fn find_by_criteria(
        &self,
        criteria: &BookCriteria,
        pageable: &Pageable,
        eager: bool,
    ) -> AppResult<Page<Book>> {
        tracing::debug!("find by criteria : {:?}, page: {:?}", criteria, pageable);
        self.repository
            .books
            .find_page(&criteria.specification(), pageable, eager)
            .await
    }

    pub async fn count_by_criteria(&self, criteria: &BookCriteria) -> AppResult<i64> {
        tracing::debug!("count by criteria : {:?}", criteria);
        self.repository.books.count(&criteria.specification()).await
    }
}

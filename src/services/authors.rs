//! Author management service

use validator::Validate;

use crate::{
    criteria::{AuthorCriteria, Criteria},
    error::{AppError, AppResult},
    models::author::{Author, AuthorInput, AuthorPatch},
    pagination::{Page, Pageable},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create an author, or fully replace it when the input carries an id
    pub async fn save(&self, input: AuthorInput) -> AppResult<Author> {
        tracing::debug!("Request to save Author : {:?}", input);
        input.validate()?;
        let is_new = input.id.is_none();
        let author = input
            .into_author()
            .ok_or_else(|| AppError::Validation("Author is missing a required field".to_string()))?;

        if is_new {
            self.repository.authors.create(&author).await
        } else {
            self.repository.authors.update(&author).await
        }
    }

    /// Overwrite the fields present in `patch`; `None` if the author does not exist
    pub async fn partial_update(&self, id: i64, patch: AuthorPatch) -> AppResult<Option<Author>> {
        tracing::debug!("Request to partially update Author : {:?}", patch);
        let Some(mut existing) = self.repository.authors.get_by_id(id).await? else {
            return Ok(None);
        };
        patch.apply_to(&mut existing);
        self.repository.authors.update(&existing).await.map(Some)
    }

    pub async fn find_all(&self, pageable: &Pageable) -> AppResult<Page<Author>> {
        tracing::debug!("Request to get all Authors");
        self.find_by_criteria(&AuthorCriteria::default(), pageable).await
    }

    /// Get one author with the books they wrote
    pub async fn find_one(&self, id: i64) -> AppResult<Option<Author>> {
        tracing::debug!("Request to get Author : {}", id);
        let Some(mut author) = self.repository.authors.get_by_id(id).await? else {
            return Ok(None);
        };
        author.books = Some(self.repository.books.by_author(id).await?);
        Ok(Some(author))
    }

    pub async fn exists(&self, id: i64) -> AppResult<bool> {
        self.repository.authors.exists(id).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        tracing::debug!("Request to delete Author : {}", id);
        self.repository.authors.delete(id).await
    }

    pub async fn find_by_criteria(
        &self,
        criteria: &AuthorCriteria,
        pageable: &Pageable,
    ) -> AppResult<Page<Author>> {
        tracing::debug!("find by criteria : {:?}, page: {:?}", criteria, pageable);
        self.repository
            .authors
            .find_page(&criteria.specification(), pageable)
            .await
    }

    pub async fn count_by_criteria(&self, criteria: &AuthorCriteria) -> AppResult<i64> {
        tracing::debug!("count by criteria : {:?}", criteria);
        self.repository.authors.count(&criteria.specification()).await
    }
}

//! Category management service

use validator::Validate;

use crate::{
    criteria::{CategoryCriteria, Criteria},
    error::{AppError, AppResult},
    models::category::{Category, CategoryInput, CategoryPatch},
    pagination::{Page, Pageable},
    repository::Repository,
};

#[derive(Clone)]
pub struct CategoriesService {
    repository: Repository,
}

impl CategoriesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn save(&self, input: CategoryInput) -> AppResult<Category> {
        tracing::debug!("Request to save Category : {:?}", input);
        input.validate()?;
        let is_new = input.id.is_none();
        let category = input
            .into_category()
            .ok_or_else(|| AppError::Validation("Category is missing a required field".to_string()))?;

        if is_new {
            self.repository.categories.create(&category).await
        } else {
            self.repository.categories.update(&category).await
        }
    }

    pub async fn partial_update(&self, id: i64, patch: CategoryPatch) -> AppResult<Option<Category>> {
        tracing::debug!("Request to partially update Category : {:?}", patch);
        let Some(mut existing) = self.repository.categories.get_by_id(id).await? else {
            return Ok(None);
        };
        patch.apply_to(&mut existing);
        self.repository.categories.update(&existing).await.map(Some)
    }

    pub async fn find_all(&self, pageable: &Pageable) -> AppResult<Page<Category>> {
        tracing::debug!("Request to get all Categories");
        self.find_by_criteria(&CategoryCriteria::default(), pageable).await
    }

    /// Get one category with its books
    pub async fn find_one(&self, id: i64) -> AppResult<Option<Category>> {
        tracing::debug!("Request to get Category : {}", id);
        let Some(mut category) = self.repository.categories.get_by_id(id).await? else {
            return Ok(None);
        };
        category.books = Some(self.repository.books.by_category(id).await?);
        Ok(Some(category))
    }

    pub async fn exists(&self, id: i64) -> AppResult<bool> {
        self.repository.categories.exists(id).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        tracing::debug!("Request to delete Category : {}", id);
        self.repository.categories.delete(id).await
    }

    pub async fn find_by_criteria(
        &self,
        criteria: &CategoryCriteria,
        pageable: &Pageable,
    ) -> AppResult<Page<Category>> {
        tracing::debug!("find by criteria : {:?}, page: {:?}", criteria, pageable);
        self.repository
            .categories
            .find_page(&criteria.specification(), pageable)
            .await
    }

    pub async fn count_by_criteria(&self, criteria: &CategoryCriteria) -> AppResult<i64> {
        tracing::debug!("count by criteria : {:?}", criteria);
        self.repository.categories.count(&criteria.specification()).await
    }
}

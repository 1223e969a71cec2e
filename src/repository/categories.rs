//! Categories repository

use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    filter::Specification,
    models::category::Category,
    pagination::{Page, Pageable},
};

use super::{order_by, push_page, SortColumn};

const SORTABLE: &[SortColumn] = &[("id", "c.id"), ("name", "c.name")];

#[derive(Clone)]
pub struct CategoriesRepository {
    pool: Pool<Postgres>,
}

impl CategoriesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn find_page(&self, spec: &Specification, pageable: &Pageable) -> AppResult<Page<Category>> {
        let order = order_by(pageable, SORTABLE, "c.id")?;
        let total = self.count(spec).await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT c.id, c.name FROM categories c");
        spec.push_where(&mut qb);
        push_page(&mut qb, &order, pageable);

        let categories = qb.build_query_as::<Category>().fetch_all(&self.pool).await?;
        Ok(Page::new(categories, pageable, total))
    }

    pub async fn count(&self, spec: &Specification) -> AppResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM categories c");
        spec.push_where(&mut qb);
        let total = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(total)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    pub async fn exists(&self, id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn create(&self, category: &Category) -> AppResult<Category> {
        let created = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&category.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    pub async fn update(&self, category: &Category) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(&category.name)
        .bind(category.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", category.id)))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }
        Ok(())
    }
}

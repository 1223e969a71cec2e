//! Authors repository

use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    filter::Specification,
    models::author::Author,
    pagination::{Page, Pageable},
};

use super::{order_by, push_page, SortColumn};

const SORTABLE: &[SortColumn] = &[
    ("id", "a.id"),
    ("firstName", "a.first_name"),
    ("lastName", "a.last_name"),
];

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Authors matching `spec`, one page at a time
    pub async fn find_page(&self, spec: &Specification, pageable: &Pageable) -> AppResult<Page<Author>> {
        let order = order_by(pageable, SORTABLE, "a.id")?;
        let total = self.count(spec).await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT a.id, a.first_name, a.last_name FROM authors a");
        spec.push_where(&mut qb);
        push_page(&mut qb, &order, pageable);

        let authors = qb.build_query_as::<Author>().fetch_all(&self.pool).await?;
        Ok(Page::new(authors, pageable, total))
    }

    pub async fn count(&self, spec: &Specification) -> AppResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM authors a");
        spec.push_where(&mut qb);
        let total = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(total)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<Author>> {
        let author = sqlx::query_as::<_, Author>(
            "SELECT id, first_name, last_name FROM authors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(author)
    }

    pub async fn exists(&self, id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn create(&self, author: &Author) -> AppResult<Author> {
        let created = sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (first_name, last_name)
            VALUES ($1, $2)
            RETURNING id, first_name, last_name
            "#,
        )
        .bind(&author.first_name)
        .bind(&author.last_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    pub async fn update(&self, author: &Author) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors SET first_name = $1, last_name = $2
            WHERE id = $3
            RETURNING id, first_name, last_name
            "#,
        )
        .bind(&author.first_name)
        .bind(&author.last_name)
        .bind(author.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author {} not found", author.id)))
    }

    /// Delete an author; its book links go with it
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }
        Ok(())
    }
}

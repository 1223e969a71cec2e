//! Repository layer for database operations

pub mod authors;
pub mod books;
pub mod categories;

use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    pagination::Pageable,
};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub authors: authors::AuthorsRepository,
    pub books: books::BooksRepository,
    pub categories: categories::CategoriesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: authors::AuthorsRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            categories: categories::CategoriesRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Sortable JSON property and the column it maps to
pub(crate) type SortColumn = (&'static str, &'static str);

/// Build the ORDER BY clause for `pageable`.
///
/// Properties are resolved through `columns`, so only known column names reach
/// the SQL text. `id_column` is appended as a tiebreaker to keep pages stable.
pub(crate) fn order_by(
    pageable: &Pageable,
    columns: &[SortColumn],
    id_column: &'static str,
) -> AppResult<String> {
    let mut terms = Vec::with_capacity(pageable.sort.len() + 1);
    let mut has_id = false;

    for order in &pageable.sort {
        let column = columns
            .iter()
            .find(|(property, _)| *property == order.property)
            .map(|(_, column)| *column)
            .ok_or_else(|| {
                AppError::Validation(format!("Unknown sort property '{}'", order.property))
            })?;
        has_id |= column == id_column;
        terms.push(format!("{} {}", column, order.direction.as_sql()));
    }
    if !has_id {
        terms.push(format!("{} ASC", id_column));
    }

    Ok(format!(" ORDER BY {}", terms.join(", ")))
}

/// Push a prepared ORDER BY clause followed by LIMIT/OFFSET
pub(crate) fn push_page(qb: &mut QueryBuilder<'_, Postgres>, order: &str, pageable: &Pageable) {
    qb.push(order)
        .push(" LIMIT ")
        .push_bind(pageable.size)
        .push(" OFFSET ")
        .push_bind(pageable.offset());
}

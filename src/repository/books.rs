//! Books repository, including the book/author and book/category links

use std::collections::HashMap;

use sqlx::{Pool, Postgres, QueryBuilder, Row, Transaction};

use crate::{
    error::{AppError, AppResult},
    filter::Specification,
    models::{author::Author, book::Book, category::Category},
    pagination::{Page, Pageable},
};

use super::{order_by, push_page, SortColumn};

const SORTABLE: &[SortColumn] = &[
    ("id", "b.id"),
    ("title", "b.title"),
    ("isbn", "b.isbn"),
    ("imagePath", "b.image_path"),
    ("publisher", "b.publisher"),
    ("dateOfPublication", "b.date_of_publication"),
];

const BOOK_COLUMNS: &str = "b.id, b.title, b.isbn, b.image_path, b.publisher, b.date_of_publication";

/// Link tables owned by books
#[derive(Debug, Clone, Copy)]
enum Link {
    Authors,
    Categories,
}

impl Link {
    fn table(self) -> &'static str {
        match self {
            Link::Authors => "book_authors",
            Link::Categories => "book_categories",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Link::Authors => "author_id",
            Link::Categories => "category_id",
        }
    }
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Books matching `spec`. With `eager`, authors and categories are loaded too.
    pub async fn find_page(
        &self,
        spec: &Specification,
        pageable: &Pageable,
        eager: bool,
    ) -> AppResult<Page<Book>> {
        let order = order_by(pageable, SORTABLE, "b.id")?;
        let total = self.count(spec).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM books b", BOOK_COLUMNS));
        spec.push_where(&mut qb);
        push_page(&mut qb, &order, pageable);

        let mut books = qb.build_query_as::<Book>().fetch_all(&self.pool).await?;
        if eager {
            self.load_links(&mut books).await?;
        }
        Ok(Page::new(books, pageable, total))
    }

    pub async fn count(&self, spec: &Specification) -> AppResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM books b");
        spec.push_where(&mut qb);
        let total = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(total)
    }

    /// Get a book with its authors and categories
    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books b WHERE b.id = $1",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        self.with_links(book).await
    }

    /// Get a book by ISBN with its authors and categories
    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books b WHERE b.isbn = $1",
            BOOK_COLUMNS
        ))
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;
        self.with_links(book).await
    }

    pub async fn exists(&self, id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Books linked to an author, without their own links
    pub async fn by_author(&self, author_id: i64) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            r#"
            SELECT {} FROM books b
            JOIN book_authors ba ON ba.book_id = b.id
            WHERE ba.author_id = $1
            ORDER BY b.id
            "#,
            BOOK_COLUMNS
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Books linked to a category, without their own links
    pub async fn by_category(&self, category_id: i64) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            r#"
            SELECT {} FROM books b
            JOIN book_categories bc ON bc.book_id = b.id
            WHERE bc.category_id = $1
            ORDER BY b.id
            "#,
            BOOK_COLUMNS
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    async fn with_links(&self, book: Option<Book>) -> AppResult<Option<Book>> {
        match book {
            Some(book) => {
                let mut books = vec![book];
                self.load_links(&mut books).await?;
                Ok(books.pop())
            }
            None => Ok(None),
        }
    }

    /// Fill `authors` and `categories` of every book with two queries
    async fn load_links(&self, books: &mut [Book]) -> AppResult<()> {
        if books.is_empty() {
            return Ok(());
        }
        let ids: Vec<i64> = books.iter().map(|b| b.id).collect();

        let rows = sqlx::query(
            r#"
            SELECT ba.book_id, a.id, a.first_name, a.last_name
            FROM book_authors ba
            JOIN authors a ON a.id = ba.author_id
            WHERE ba.book_id = ANY($1)
            ORDER BY a.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut authors: HashMap<i64, Vec<Author>> = HashMap::new();
        for r in rows {
            authors.entry(r.get("book_id")).or_default().push(Author {
                id: r.get("id"),
                first_name: r.get("first_name"),
                last_name: r.get("last_name"),
                books: None,
            });
        }

        let rows = sqlx::query(
            r#"
            SELECT bc.book_id, c.id, c.name
            FROM book_categories bc
            JOIN categories c ON c.id = bc.category_id
            WHERE bc.book_id = ANY($1)
            ORDER BY c.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut categories: HashMap<i64, Vec<Category>> = HashMap::new();
        for r in rows {
            categories.entry(r.get("book_id")).or_default().push(Category {
                id: r.get("id"),
                name: r.get("name"),
                books: None,
            });
        }

        for book in books.iter_mut() {
            book.authors = Some(authors.remove(&book.id).unwrap_or_default());
            book.categories = Some(categories.remove(&book.id).unwrap_or_default());
        }
        Ok(())
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Insert a book and its links in one transaction
    pub async fn create(&self, book: &Book, author_ids: &[i64], category_ids: &[i64]) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO books (title, isbn, image_path, publisher, date_of_publication)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(&book.isbn)
        .bind(&book.image_path)
        .bind(&book.publisher)
        .bind(book.date_of_publication)
        .fetch_one(&mut *tx)
        .await?;

        replace_links(&mut tx, id, Link::Authors, author_ids).await?;
        replace_links(&mut tx, id, Link::Categories, category_ids).await?;
        tx.commit().await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Book {} vanished after insert", id)))
    }

    /// Replace every field and both link sets of an existing book
    pub async fn update(&self, book: &Book, author_ids: &[i64], category_ids: &[i64]) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        update_fields(&mut tx, book).await?;
        replace_links(&mut tx, book.id, Link::Authors, author_ids).await?;
        replace_links(&mut tx, book.id, Link::Categories, category_ids).await?;
        tx.commit().await?;

        self.get_by_id(book.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", book.id)))
    }

    /// Update the scalar fields only, leaving links untouched
    pub async fn update_fields(&self, book: &Book) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;
        update_fields(&mut tx, book).await?;
        tx.commit().await?;

        self.get_by_id(book.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", book.id)))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }
}

async fn update_fields(tx: &mut Transaction<'_, Postgres>, book: &Book) -> AppResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE books SET
            title = $1,
            isbn = $2,
            image_path = $3,
            publisher = $4,
            date_of_publication = $5
        WHERE id = $6
        "#,
    )
    .bind(&book.title)
    .bind(&book.isbn)
    .bind(&book.image_path)
    .bind(&book.publisher)
    .bind(book.date_of_publication)
    .bind(book.id)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Book {} not found", book.id)));
    }
    Ok(())
}

/// Replace the link set of `book_id`. Unknown ids fail on the foreign key.
async fn replace_links(
    tx: &mut Transaction<'_, Postgres>,
    book_id: i64,
    link: Link,
    ids: &[i64],
) -> AppResult<()> {
    sqlx::query(&format!("DELETE FROM {} WHERE book_id = $1", link.table()))
        .bind(book_id)
        .execute(&mut **tx)
        .await?;

    if ids.is_empty() {
        return Ok(());
    }

    sqlx::query(&format!(
        "INSERT INTO {} (book_id, {}) SELECT $1, UNNEST($2::bigint[])",
        link.table(),
        link.column()
    ))
    .bind(book_id)
    .bind(ids)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, NewBook, UpdateBook},
};

const DUPLICATE_ISBN: &str = "Book with this ISBN already exists";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Search books, newest first
    pub async fn search(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let filters = query.filters();
        let sql = search_sql(&filters);

        let mut builder = sqlx::query_as::<_, Book>(&sql);
        for (_, pattern) in &filters {
            builder = builder.bind(pattern);
        }

        let books = builder.fetch_all(&self.pool).await?;
        Ok(books)
    }

    /// Create a new book
    pub async fn create(&self, book: &NewBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, isbn, category, total_copies, available_copies)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.category)
        .bind(book.total_copies)
        .bind(book.available_copies)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from(e).on_unique_violation(DUPLICATE_ISBN))
    }

    /// Insert or leave untouched a book keyed on ISBN; returns the stored row
    pub async fn upsert_by_isbn(&self, book: &NewBook) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, isbn, category, total_copies, available_copies)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (isbn) DO UPDATE SET isbn = EXCLUDED.isbn
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.category)
        .bind(book.total_copies)
        .bind(book.available_copies)
        .fetch_one(&self.pool)
        .await?;

        Ok(book)
    }

    /// Partially update a book.
    ///
    /// The row is locked while the incoming fields are merged and the copy
    /// counts re-checked, so a concurrent borrow cannot slip in between.
    pub async fn update(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

        let merged = update.merge_into(&existing)?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = $2, author = $3, isbn = $4, category = $5,
                total_copies = $6, available_copies = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&merged.title)
        .bind(&merged.author)
        .bind(&merged.isbn)
        .bind(&merged.category)
        .bind(merged.total_copies)
        .bind(merged.available_copies)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from(e).on_unique_violation(DUPLICATE_ISBN))?;

        tx.commit().await?;
        Ok(book)
    }

    /// Hard delete a book
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::from(e).on_foreign_key_violation(
                    "Book has transaction history and cannot be deleted",
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Book not found".to_string()));
        }
        Ok(())
    }

    /// Count all books
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Build the catalog search statement; one `ILIKE $n` per filter, ANDed
fn search_sql(filters: &[(&'static str, String)]) -> String {
    let conditions: Vec<String> = filters
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{} ILIKE ${}", column, i + 1))
        .collect();

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    format!(
        "SELECT * FROM books{} ORDER BY created_at DESC, id DESC",
        where_clause
    )
}

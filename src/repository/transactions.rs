//! Transactions repository: borrow, reserve and return bookkeeping

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        transaction::{Transaction, TransactionStatus, TransactionWithBook},
    },
};

#[derive(Clone)]
pub struct TransactionsRepository {
    pool: Pool<Postgres>,
}

impl TransactionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Borrow a copy: decrement `available_copies` and record a borrowed
    /// transaction in one commit
    pub async fn borrow(&self, user_id: i32, book_id: i32) -> AppResult<(Transaction, Book)> {
        let mut tx = self.pool.begin().await?;

        ensure_user_exists(&mut tx, user_id).await?;
        let book = lock_book(&mut tx, book_id).await?;
        book.ensure_can_borrow()?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET available_copies = available_copies - 1, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        let transaction = insert(&mut tx, user_id, book_id, TransactionStatus::Borrowed).await?;

        tx.commit().await?;
        Ok((transaction, book))
    }

    /// Reserve a book whose copies are all out
    pub async fn reserve(&self, user_id: i32, book_id: i32) -> AppResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        ensure_user_exists(&mut tx, user_id).await?;
        let book = lock_book(&mut tx, book_id).await?;
        book.ensure_can_reserve()?;

        let transaction = insert(&mut tx, user_id, book_id, TransactionStatus::Reserved).await?;

        tx.commit().await?;
        Ok(transaction)
    }

    /// Close the most recent open transaction of (user, book) and put the
    /// copy back on the shelf in one commit
    pub async fn return_book(&self, user_id: i32, book_id: i32) -> AppResult<(Transaction, Book)> {
        let mut tx = self.pool.begin().await?;

        let book = lock_book(&mut tx, book_id).await?;

        let open = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT * FROM transactions
            WHERE user_id = $1 AND book_id = $2 AND status IN ('borrowed', 'reserved')
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("No active transaction found for this book and user".to_string())
        })?;

        book.ensure_can_return()?;

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(open.id)
        .bind(TransactionStatus::Returned)
        .fetch_one(&mut *tx)
        .await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET available_copies = available_copies + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((transaction, book))
    }

    /// Active (borrowed or reserved) transactions of a user with their books, newest first
    pub async fn get_active_for_user(&self, user_id: i32) -> AppResult<Vec<TransactionWithBook>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.user_id, t.book_id, t.status, t.created_at, t.updated_at,
                   b.title, b.author, b.isbn, b.category, b.total_copies, b.available_copies,
                   b.created_at AS book_created_at, b.updated_at AS book_updated_at
            FROM transactions t
            JOIN books b ON b.id = t.book_id
            WHERE t.user_id = $1 AND t.status IN ('borrowed', 'reserved')
            ORDER BY t.created_at DESC, t.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let result = rows
            .into_iter()
            .map(|row| TransactionWithBook {
                transaction: Transaction {
                    id: row.get("id"),
                    user_id: row.get("user_id"),
                    book_id: row.get("book_id"),
                    status: row.get("status"),
                    created_at: row.get("created_at"),
                    updated_at: row.get("updated_at"),
                },
                book: Book {
                    id: row.get("book_id"),
                    title: row.get("title"),
                    author: row.get("author"),
                    isbn: row.get("isbn"),
                    category: row.get("category"),
                    total_copies: row.get("total_copies"),
                    available_copies: row.get("available_copies"),
                    created_at: row.get("book_created_at"),
                    updated_at: row.get("book_updated_at"),
                },
            })
            .collect();

        Ok(result)
    }

    /// Count transactions currently in the given status
    pub async fn count_by_status(&self, status: TransactionStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count distinct users with a transaction created since `since`
    pub async fn count_distinct_users_since(&self, since: DateTime<Utc>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT user_id) FROM transactions WHERE created_at >= $1",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

async fn ensure_user_exists(conn: &mut PgConnection, user_id: i32) -> AppResult<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

    if !exists {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    Ok(())
}

/// Fetch a book and hold its row lock until the surrounding transaction ends
async fn lock_book(conn: &mut PgConnection, book_id: i32) -> AppResult<Book> {
    sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
        .bind(book_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
}

async fn insert(
    conn: &mut PgConnection,
    user_id: i32,
    book_id: i32,
    status: TransactionStatus,
) -> AppResult<Transaction> {
    let transaction = sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (user_id, book_id, status)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(book_id)
    .bind(status)
    .fetch_one(&mut *conn)
    .await?;

    Ok(transaction)
}

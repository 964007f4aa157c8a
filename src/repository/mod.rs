//! Repository layer for database operations

pub mod books;
pub mod transactions;
pub mod users;

use sqlx::{Pool, Postgres};

/// Per-table repositories sharing one connection pool
#[derive(Clone)]
pub struct Repository {
    pub users: users::UsersRepository,
    pub books: books::BooksRepository,
    pub transactions: transactions::TransactionsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            transactions: transactions::TransactionsRepository::new(pool),
        }
    }
}

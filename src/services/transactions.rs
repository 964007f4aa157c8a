//! Borrow, reserve and return service

use crate::{
    error::{AppError, AppResult, FieldError},
    models::{
        book::Book,
        transaction::{Transaction, TransactionRequest, TransactionWithBook},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct TransactionsService {
    repository: Repository,
}

impl TransactionsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow an available copy
    pub async fn borrow(&self, request: &TransactionRequest) -> AppResult<(Transaction, Book)> {
        let (user_id, book_id) = request.ids()?;
        let (transaction, book) = self.repository.transactions.borrow(user_id, book_id).await?;
        tracing::info!(
            transaction_id = transaction.id,
            user_id,
            book_id,
            available_copies = book.available_copies,
            "Book borrowed"
        );
        Ok((transaction, book))
    }

    /// Reserve a book that has no copy left
    pub async fn reserve(&self, request: &TransactionRequest) -> AppResult<Transaction> {
        let (user_id, book_id) = request.ids()?;
        let transaction = self.repository.transactions.reserve(user_id, book_id).await?;
        tracing::info!(transaction_id = transaction.id, user_id, book_id, "Book reserved");
        Ok(transaction)
    }

    /// Close the latest open transaction for the pair
    pub async fn return_book(&self, request: &TransactionRequest) -> AppResult<(Transaction, Book)> {
        let (user_id, book_id) = request.ids()?;
        let (transaction, book) = self
            .repository
            .transactions
            .return_book(user_id, book_id)
            .await?;
        tracing::info!(
            transaction_id = transaction.id,
            user_id,
            book_id,
            available_copies = book.available_copies,
            "Book returned"
        );
        Ok((transaction, book))
    }

    /// Active transactions of a user
    pub async fn get_user_books(&self, user_id: i32) -> AppResult<Vec<TransactionWithBook>> {
        if user_id < 1 {
            return Err(AppError::InvalidFields(vec![FieldError {
                field: "userId".to_string(),
                message: "Valid userId is required".to_string(),
            }]));
        }
        self.repository.transactions.get_active_for_user(user_id).await
    }
}

//! Catalog service for managing books

use validator::Validate;

use crate::{
    error::AppResult,
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search books
    pub async fn search_books(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        self.repository.books.search(query).await
    }

    /// Add a book to the catalog
    pub async fn add_book(&self, request: CreateBook) -> AppResult<Book> {
        let new_book = request.into_new_book()?;
        let book = self.repository.books.create(&new_book).await?;
        tracing::info!(book_id = book.id, isbn = %book.isbn, "Book added");
        Ok(book)
    }

    /// Partially update a book
    pub async fn update_book(&self, id: i32, update: UpdateBook) -> AppResult<Book> {
        update.validate()?;
        self.repository.books.update(id, &update).await
    }

    /// Remove a book from the catalog
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }
}

//! Books service

use crate::{
    error::{AppError, AppResult},
    models::{Book, NewBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

fn not_found() -> AppError {
    AppError::NotFound("Book not found".to_string())
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Book>> {
        self.repository.list_books().await
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<Book> {
        self.repository.get_book(id).await?.ok_or_else(not_found)
    }

    /// Create a book. Duplicate ISBNs are allowed.
    pub async fn create(&self, data: &NewBook) -> AppResult<Book> {
        let book = self.repository.create_book(data).await?;
        tracing::info!(book_id = %book.id, isbn = %book.isbn, shelf_id = %book.shelf_id, "Created book");
        Ok(book)
    }

    pub async fn update_notes(&self, id: &str, notes: &str) -> AppResult<Book> {
        self.repository
            .update_book_notes(id, notes)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn move_to_shelf(&self, id: &str, shelf_id: &str) -> AppResult<Book> {
        let book = self
            .repository
            .update_book_shelf(id, shelf_id)
            .await?
            .ok_or_else(not_found)?;
        tracing::debug!(book_id = %id, shelf_id = %shelf_id, "Moved book");
        Ok(book)
    }

    pub async fn update_read_status(&self, id: &str, is_read: bool) -> AppResult<Book> {
        self.repository
            .update_book_read_status(id, is_read)
            .await?
            .ok_or_else(not_found)
    }

    /// Delete a book. Absence is not an error.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.repository.delete_book(id).await
    }
}

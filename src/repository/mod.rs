//! Repository layer for shelf and book persistence

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{Book, NewBook, NewShelf, Shelf},
};

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

/// Persistence contract for the two-table catalogue.
///
/// Updates are single-field patches and return `None` when the book does not
/// exist. Deletes never report absence. Deleting a shelf removes its books
/// atomically with the shelf.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn list_shelves(&self) -> AppResult<Vec<Shelf>>;
    async fn get_shelf(&self, id: &str) -> AppResult<Option<Shelf>>;
    async fn create_shelf(&self, data: &NewShelf) -> AppResult<Shelf>;
    async fn delete_shelf(&self, id: &str) -> AppResult<()>;

    async fn list_books(&self) -> AppResult<Vec<Book>>;
    async fn list_books_by_shelf(&self, shelf_id: &str) -> AppResult<Vec<Book>>;
    async fn get_book(&self, id: &str) -> AppResult<Option<Book>>;
    async fn create_book(&self, data: &NewBook) -> AppResult<Book>;
    async fn update_book_notes(&self, id: &str, notes: &str) -> AppResult<Option<Book>>;
    async fn update_book_shelf(&self, id: &str, shelf_id: &str) -> AppResult<Option<Book>>;
    async fn update_book_read_status(&self, id: &str, is_read: bool) -> AppResult<Option<Book>>;
    async fn delete_book(&self, id: &str) -> AppResult<()>;

    /// Remove every book, then every shelf, as one unit
    async fn clear_all(&self) -> AppResult<()>;

    /// Cheap round trip used by the readiness probe
    async fn ping(&self) -> AppResult<()>;
}

/// Shared handle to whichever backend the server was started with
pub type Repository = Arc<dyn Storage>;

/// Message used when a book points at a shelf that does not exist
pub(crate) const MISSING_SHELF: &str = "shelfId does not reference an existing shelf";

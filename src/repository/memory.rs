//! In-process storage backend
//!
//! Both tables live behind one lock, so a shelf delete and its cascade are
//! applied under the same write guard and readers never see a half-cascaded state.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Storage, MISSING_SHELF};
use crate::{
    error::{AppError, AppResult},
    models::{Book, NewBook, NewShelf, Shelf},
};

#[derive(Default)]
struct Tables {
    shelves: Vec<Shelf>,
    books: Vec<Book>,
}

impl Tables {
    fn has_shelf(&self, id: &str) -> bool {
        self.shelves.iter().any(|s| s.id == id)
    }

    fn book_mut(&mut self, id: &str) -> Option<&mut Book> {
        self.books.iter_mut().find(|b| b.id == id)
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryRepository {
    async fn list_shelves(&self) -> AppResult<Vec<Shelf>> {
        Ok(self.tables.read().await.shelves.clone())
    }

    async fn get_shelf(&self, id: &str) -> AppResult<Option<Shelf>> {
        let tables = self.tables.read().await;
        Ok(tables.shelves.iter().find(|s| s.id == id).cloned())
    }

    async fn create_shelf(&self, data: &NewShelf) -> AppResult<Shelf> {
        let shelf = Shelf {
            id: Uuid::new_v4().to_string(),
            name: data.name.clone(),
            created_at: Utc::now(),
        };
        self.tables.write().await.shelves.push(shelf.clone());
        Ok(shelf)
    }

    async fn delete_shelf(&self, id: &str) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables.shelves.retain(|s| s.id != id);
        tables.books.retain(|b| b.shelf_id != id);
        Ok(())
    }

    async fn list_books(&self) -> AppResult<Vec<Book>> {
        Ok(self.tables.read().await.books.clone())
    }

    async fn list_books_by_shelf(&self, shelf_id: &str) -> AppResult<Vec<Book>> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .iter()
            .filter(|b| b.shelf_id == shelf_id)
            .cloned()
            .collect())
    }

    async fn get_book(&self, id: &str) -> AppResult<Option<Book>> {
        let tables = self.tables.read().await;
        Ok(tables.books.iter().find(|b| b.id == id).cloned())
    }

    async fn create_book(&self, data: &NewBook) -> AppResult<Book> {
        let mut tables = self.tables.write().await;
        if !tables.has_shelf(&data.shelf_id) {
            return Err(AppError::Validation(MISSING_SHELF.to_string()));
        }
        let book = Book {
            id: Uuid::new_v4().to_string(),
            isbn: data.isbn.clone(),
            title: data.title.clone(),
            authors: data.authors.clone(),
            cover: data.cover.clone(),
            page_count: data.page_count,
            published_year: data.published_year.clone(),
            shelf_id: data.shelf_id.clone(),
            is_read: data.is_read,
            notes: data.notes.clone(),
            added_at: Utc::now(),
        };
        tables.books.push(book.clone());
        Ok(book)
    }

    async fn update_book_notes(&self, id: &str, notes: &str) -> AppResult<Option<Book>> {
        let mut tables = self.tables.write().await;
        Ok(tables.book_mut(id).map(|book| {
            book.notes = notes.to_string();
            book.clone()
        }))
    }

    async fn update_book_shelf(&self, id: &str, shelf_id: &str) -> AppResult<Option<Book>> {
        let mut tables = self.tables.write().await;
        if tables.book_mut(id).is_none() {
            return Ok(None);
        }
        if !tables.has_shelf(shelf_id) {
            return Err(AppError::Validation(MISSING_SHELF.to_string()));
        }
        Ok(tables.book_mut(id).map(|book| {
            book.shelf_id = shelf_id.to_string();
            book.clone()
        }))
    }

    async fn update_book_read_status(&self, id: &str, is_read: bool) -> AppResult<Option<Book>> {
        let mut tables = self.tables.write().await;
        Ok(tables.book_mut(id).map(|book| {
            book.is_read = is_read;
            book.clone()
        }))
    }

    async fn delete_book(&self, id: &str) -> AppResult<()> {
        self.tables.write().await.books.retain(|b| b.id != id);
        Ok(())
    }

    async fn clear_all(&self) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables.books.clear();
        tables.shelves.clear();
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

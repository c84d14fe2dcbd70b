//! Shelves service

use crate::{
    error::{AppError, AppResult},
    models::{Book, NewShelf, Shelf},
    repository::Repository,
};

#[derive(Clone)]
pub struct ShelvesService {
    repository: Repository,
}

impl ShelvesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Shelf>> {
        self.repository.list_shelves().await
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<Shelf> {
        self.repository
            .get_shelf(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Shelf not found".to_string()))
    }

    pub async fn create(&self, data: &NewShelf) -> AppResult<Shelf> {
        let shelf = self.repository.create_shelf(data).await?;
        tracing::info!(shelf_id = %shelf.id, "Created shelf");
        Ok(shelf)
    }

    /// Delete a shelf and, through the cascade, every book on it.
    /// Absence is not an error.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.repository.delete_shelf(id).await?;
        tracing::info!(shelf_id = %id, "Deleted shelf");
        Ok(())
    }

    /// Books on a shelf; 404 when the shelf itself is unknown
    pub async fn books(&self, id: &str) -> AppResult<Vec<Book>> {
        self.get_by_id(id).await?;
        self.repository.list_books_by_shelf(id).await
    }
}

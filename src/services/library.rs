//! Collection-wide operations

use crate::{error::AppResult, repository::Repository};

#[derive(Clone)]
pub struct LibraryService {
    repository: Repository,
}

impl LibraryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Remove every book and shelf
    pub async fn clear(&self) -> AppResult<()> {
        self.repository.clear_all().await?;
        tracing::warn!("Library cleared");
        Ok(())
    }

    /// Check that the storage backend answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}

//! Business logic services

pub mod books;
pub mod library;
pub mod shelves;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub shelves: shelves::ShelvesService,
    pub books: books::BooksService,
    pub library: library::LibraryService,
}

impl Services {
    /// Create all services over the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            shelves: shelves::ShelvesService::new(repository.clone()),
            books: books::BooksService::new(repository.clone()),
            library: library::LibraryService::new(repository),
        }
    }
}

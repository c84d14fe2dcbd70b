//! Data models for Home Library

pub mod book;
pub mod shelf;

// Re-export commonly used types
pub use book::{Book, NewBook, UpdateNotes, UpdateReadStatus, UpdateShelf};
pub use shelf::{NewShelf, Shelf};

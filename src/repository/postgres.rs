//! PostgreSQL storage backend

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::{Storage, MISSING_SHELF};
use crate::{
    error::{AppError, AppResult},
    models::{Book, NewBook, NewShelf, Shelf},
};

const BOOK_COLUMNS: &str = "id, isbn, title, authors, cover, page_count, published_year, \
                            shelf_id, is_read, notes, added_at";

#[derive(Clone)]
pub struct PgRepository {
    pub pool: Pool<Postgres>,
}

impl PgRepository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Foreign key violations on `books.shelf_id` are a client mistake, not a server fault
fn map_shelf_reference(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            return AppError::Validation(MISSING_SHELF.to_string());
        }
    }
    AppError::Database(err)
}

#[async_trait]
impl Storage for PgRepository {
    async fn list_shelves(&self) -> AppResult<Vec<Shelf>> {
        let rows = sqlx::query_as::<_, Shelf>(
            "SELECT id, name, created_at FROM shelves ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_shelf(&self, id: &str) -> AppResult<Option<Shelf>> {
        let row = sqlx::query_as::<_, Shelf>("SELECT id, name, created_at FROM shelves WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_shelf(&self, data: &NewShelf) -> AppResult<Shelf> {
        let row = sqlx::query_as::<_, Shelf>(
            "INSERT INTO shelves (id, name) VALUES ($1, $2) RETURNING id, name, created_at",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&data.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_shelf(&self, id: &str) -> AppResult<()> {
        // books go with it through ON DELETE CASCADE
        sqlx::query("DELETE FROM shelves WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_books(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books ORDER BY added_at, id",
            BOOK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_books_by_shelf(&self, shelf_id: &str) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE shelf_id = $1 ORDER BY added_at, id",
            BOOK_COLUMNS
        ))
        .bind(shelf_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_book(&self, id: &str) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, Book>(&format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_book(&self, data: &NewBook) -> AppResult<Book> {
        let query = format!(
            r#"
            INSERT INTO books (id, isbn, title, authors, cover, page_count, published_year, shelf_id, is_read, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(Uuid::new_v4().to_string())
            .bind(&data.isbn)
            .bind(&data.title)
            .bind(&data.authors)
            .bind(&data.cover)
            .bind(data.page_count)
            .bind(&data.published_year)
            .bind(&data.shelf_id)
            .bind(data.is_read)
            .bind(&data.notes)
            .fetch_one(&self.pool)
            .await
            .map_err(map_shelf_reference)
    }

    async fn update_book_notes(&self, id: &str, notes: &str) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, Book>(&format!(
            "UPDATE books SET notes = $2 WHERE id = $1 RETURNING {}",
            BOOK_COLUMNS
        ))
        .bind(id)
        .bind(notes)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_book_shelf(&self, id: &str, shelf_id: &str) -> AppResult<Option<Book>> {
        sqlx::query_as::<_, Book>(&format!(
            "UPDATE books SET shelf_id = $2 WHERE id = $1 RETURNING {}",
            BOOK_COLUMNS
        ))
        .bind(id)
        .bind(shelf_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_shelf_reference)
    }

    async fn update_book_read_status(&self, id: &str, is_read: bool) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, Book>(&format!(
            "UPDATE books SET is_read = $2 WHERE id = $1 RETURNING {}",
            BOOK_COLUMNS
        ))
        .bind(id)
        .bind(is_read)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_book(&self, id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear_all(&self) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM books").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM shelves").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    async fn connect() -> PgRepository {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("Failed to connect to database");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");
        PgRepository::new(pool)
    }

    #[tokio::test]
    #[ignore] // Run with: DATABASE_URL=... cargo test -- --ignored
    async fn test_delete_shelf_cascades_to_books() {
        let repo = connect().await;
        let shelf = repo
            .create_shelf(&NewShelf { name: "Cascade".to_string() })
            .await
            .unwrap();
        let book = repo
            .create_book(&NewBook {
                isbn: "9780143127741".to_string(),
                title: "Test Book".to_string(),
                authors: vec!["Someone".to_string()],
                cover: "https://example.com/c.jpg".to_string(),
                page_count: Some(320),
                published_year: Some("2014".to_string()),
                shelf_id: shelf.id.clone(),
                is_read: false,
                notes: String::new(),
            })
            .await
            .unwrap();

        repo.delete_shelf(&shelf.id).await.unwrap();

        assert!(repo.get_book(&book.id).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore]
    async fn test_unknown_shelf_is_validation_error() {
        let repo = connect().await;
        let err = repo
            .create_book(&NewBook {
                isbn: "1".to_string(),
                title: "Orphan".to_string(),
                authors: vec![],
                cover: String::new(),
                page_count: None,
                published_year: None,
                shelf_id: Uuid::new_v4().to_string(),
                is_read: false,
                notes: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}

//! Client-side catalog store.
//!
//! One [`CatalogStore`] is created at the root of a client session and cloned
//! into every view that needs the catalogue. It holds the whole collection in
//! memory and mediates every create, update and delete through the API
//! Gateway: each mutation performs exactly one request and, only once the
//! server has confirmed it, patches the snapshot and notifies subscribers.
//!
//! The snapshot is an `Arc<Snapshot>` published through a `watch` channel, so
//! every change is an atomic swap of the whole value.
//!
//! Mutations and the initial load are ordered by a read/write gate: a load
//! holds it exclusively, so a mutation issued while shelves and books are
//! being fetched waits and lands on top of the loaded snapshot.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::{watch, Mutex as AsyncMutex, RwLock};
use tokio_stream::wrappers::WatchStream;

use super::{
    api::{CatalogApi, ClientError},
    wire::{normalize_book, normalize_shelf},
};
use crate::models::{Book, NewBook, Shelf};

/// Everything a view renders from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub books: Vec<Book>,
    pub shelves: Vec<Shelf>,
    pub is_loading: bool,
    /// Why the last initial load failed; cleared when a new load starts
    pub load_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    Loading,
    Ready,
}

type Pending = Shared<BoxFuture<'static, Result<(), ClientError>>>;

struct Inner {
    api: Arc<dyn CatalogApi>,
    snapshot: watch::Sender<Arc<Snapshot>>,
    load_state: Mutex<LoadState>,
    /// Serializes initial loads so concurrent first subscribers share one fetch
    load_lock: AsyncMutex<()>,
    /// Shared by mutations, exclusive during a load
    gate: RwLock<()>,
    /// Id-keyed mutations currently on the wire, tagged with a ticket
    in_flight: Mutex<HashMap<String, (u64, Pending)>>,
    next_ticket: AtomicU64,
}

/// Shared handle to the session's catalogue
#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<Inner>,
}

impl CatalogStore {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::default()));
        Self {
            inner: Arc::new(Inner {
                api,
                snapshot,
                load_state: Mutex::new(LoadState::Uninitialized),
                load_lock: AsyncMutex::new(()),
                gate: RwLock::new(()),
                in_flight: Mutex::new(HashMap::new()),
                next_ticket: AtomicU64::new(0),
            }),
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.snapshot.borrow().clone()
    }

    pub fn load_state(&self) -> LoadState {
        *self.inner.load_state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_load_state(&self, state: LoadState) {
        *self.inner.load_state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Register a view. The first subscription triggers the initial load;
    /// dropping the receiver never resets the store.
    pub async fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        let receiver = self.inner.snapshot.subscribe();
        self.ensure_loaded().await;
        receiver
    }

    /// Stream of snapshots, starting with the current one
    pub fn changes(&self) -> WatchStream<Arc<Snapshot>> {
        WatchStream::new(self.inner.snapshot.subscribe())
    }

    /// Fetch shelves and books in parallel unless already loaded.
    /// A failed load leaves the store retryable.
    pub async fn ensure_loaded(&self) {
        let _guard = self.inner.load_lock.lock().await;
        if self.load_state() != LoadState::Uninitialized {
            return;
        }
        let _exclusive = self.inner.gate.write().await;

        self.set_load_state(LoadState::Loading);
        self.modify(|snapshot| {
            snapshot.is_loading = true;
            snapshot.load_error = None;
        });

        let (shelves, books) = tokio::join!(self.inner.api.list_shelves(), self.inner.api.list_books());
        let loaded = shelves
            .and_then(|records| records.iter().map(normalize_shelf).collect::<Result<Vec<_>, _>>())
            .and_then(|shelves| {
                books
                    .and_then(|records| records.iter().map(normalize_book).collect::<Result<Vec<_>, _>>())
                    .map(|books| (shelves, books))
            });

        match loaded {
            Ok((shelves, books)) => {
                tracing::info!(shelves = shelves.len(), books = books.len(), "Library loaded");
                self.inner.snapshot.send_replace(Arc::new(Snapshot {
                    books,
                    shelves,
                    is_loading: false,
                    load_error: None,
                }));
                self.set_load_state(LoadState::Ready);
            }
            Err(e) => {
                tracing::error!("Failed to load library: {}", e);
                self.modify(|snapshot| {
                    snapshot.is_loading = false;
                    snapshot.load_error = Some(e.to_string());
                });
                self.set_load_state(LoadState::Uninitialized);
            }
        }
    }

    /// Drop the loaded state and fetch everything again
    pub async fn reload(&self) {
        {
            let _guard = self.inner.load_lock.lock().await;
            self.set_load_state(LoadState::Uninitialized);
        }
        self.ensure_loaded().await;
    }

    fn modify(&self, change: impl FnOnce(&mut Snapshot)) {
        self.inner
            .snapshot
            .send_modify(|current| change(Arc::make_mut(current)));
    }

    fn patch_book(&self, id: &str, patch: impl FnOnce(&mut Book)) {
        self.modify(|snapshot| {
            if let Some(book) = snapshot.books.iter_mut().find(|b| b.id == id) {
                patch(book);
            }
        });
    }

    /// Run `operation` unless an identical one is already on the wire, in
    /// which case wait for that one's result instead.
    ///
    /// The operation runs as its own task, so it completes and applies its
    /// confirmed result even if every caller stops waiting, and it removes
    /// its own `in_flight` entry when done.
    async fn coalesce(
        &self,
        key: String,
        operation: BoxFuture<'static, Result<(), ClientError>>,
    ) -> Result<(), ClientError> {
        let pending = {
            let mut in_flight = self.inner.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            match in_flight.get(&key) {
                Some((_, existing)) => {
                    tracing::debug!(%key, "Joining in-flight request");
                    existing.clone()
                }
                None => {
                    let ticket = self.inner.next_ticket.fetch_add(1, Ordering::Relaxed);
                    let store = self.clone();
                    let task_key = key.clone();
                    let handle = tokio::spawn(async move {
                        let result = operation.await;
                        store.settle(&task_key, ticket);
                        result
                    });
                    let pending = async move {
                        handle
                            .await
                            .unwrap_or_else(|e| Err(ClientError::Aborted(e.to_string())))
                    }
                    .boxed()
                    .shared();
                    in_flight.insert(key.clone(), (ticket, pending.clone()));
                    pending
                }
            }
        };

        let result = pending.await;
        if let Err(e) = &result {
            tracing::warn!(%key, error = %e, "Catalog mutation failed");
        }
        result
    }

    /// Drop the `in_flight` entry for `key` if it still belongs to `ticket`
    fn settle(&self, key: &str, ticket: u64) {
        let mut in_flight = self.inner.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if in_flight.get(key).is_some_and(|(current, _)| *current == ticket) {
            in_flight.remove(key);
        }
    }

    pub async fn add_book(&self, data: &NewBook) -> Result<Book, ClientError> {
        let _gate = self.inner.gate.read().await;
        let record = self.inner.api.create_book(data).await.map_err(|e| {
            tracing::warn!(isbn = %data.isbn, error = %e, "Failed to add book");
            e
        })?;
        let book = normalize_book(&record)?;
        self.modify(|snapshot| snapshot.books.push(book.clone()));
        Ok(book)
    }

    pub async fn remove_book(&self, id: &str) -> Result<(), ClientError> {
        let store = self.clone();
        let id = id.to_string();
        let key = format!("remove_book:{}", id);
        self.coalesce(
            key,
            async move {
                let _gate = store.inner.gate.read().await;
                store.inner.api.delete_book(&id).await?;
                store.modify(|snapshot| snapshot.books.retain(|b| b.id != id));
                Ok(())
            }
            .boxed(),
        )
        .await
    }

    pub async fn update_book_notes(&self, id: &str, notes: &str) -> Result<(), ClientError> {
        let store = self.clone();
        let (id, notes) = (id.to_string(), notes.to_string());
        let key = format!("notes:{}:{}", id, notes);
        self.coalesce(
            key,
            async move {
                let _gate = store.inner.gate.read().await;
                let record = store.inner.api.update_book_notes(&id, &notes).await?;
                let confirmed = normalize_book(&record)?;
                store.patch_book(&id, |book| book.notes = confirmed.notes);
                Ok(())
            }
            .boxed(),
        )
        .await
    }

    pub async fn update_book_read_status(&self, id: &str, is_read: bool) -> Result<(), ClientError> {
        let store = self.clone();
        let id = id.to_string();
        let key = format!("read_status:{}:{}", id, is_read);
        self.coalesce(
            key,
            async move {
                let _gate = store.inner.gate.read().await;
                let record = store.inner.api.update_book_read_status(&id, is_read).await?;
                let confirmed = normalize_book(&record)?;
                store.patch_book(&id, |book| book.is_read = confirmed.is_read);
                Ok(())
            }
            .boxed(),
        )
        .await
    }

    pub async fn update_book_shelf(&self, id: &str, shelf_id: &str) -> Result<(), ClientError> {
        let store = self.clone();
        let (id, shelf_id) = (id.to_string(), shelf_id.to_string());
        let key = format!("shelf:{}:{}", id, shelf_id);
        self.coalesce(
            key,
            async move {
                let _gate = store.inner.gate.read().await;
                let record = store.inner.api.update_book_shelf(&id, &shelf_id).await?;
                let confirmed = normalize_book(&record)?;
                store.patch_book(&id, |book| book.shelf_id = confirmed.shelf_id);
                Ok(())
            }
            .boxed(),
        )
        .await
    }

    pub async fn add_shelf(&self, name: &str) -> Result<Shelf, ClientError> {
        let _gate = self.inner.gate.read().await;
        let record = self.inner.api.create_shelf(name).await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to add shelf");
            e
        })?;
        let shelf = normalize_shelf(&record)?;
        self.modify(|snapshot| snapshot.shelves.push(shelf.clone()));
        Ok(shelf)
    }

    /// Delete a shelf. Its books are dropped locally to mirror the server
    /// cascade without a second fetch.
    pub async fn remove_shelf(&self, id: &str) -> Result<(), ClientError> {
        let store = self.clone();
        let id = id.to_string();
        let key = format!("remove_shelf:{}", id);
        self.coalesce(
            key,
            async move {
                let _gate = store.inner.gate.read().await;
                store.inner.api.delete_shelf(&id).await?;
                store.modify(|snapshot| {
                    snapshot.shelves.retain(|s| s.id != id);
                    snapshot.books.retain(|b| b.shelf_id != id);
                });
                Ok(())
            }
            .boxed(),
        )
        .await
    }

    pub async fn clear_all(&self) -> Result<(), ClientError> {
        let store = self.clone();
        self.coalesce(
            "clear_all".to_string(),
            async move {
                let _gate = store.inner.gate.read().await;
                store.inner.api.clear_library().await?;
                store.modify(|snapshot| {
                    snapshot.books.clear();
                    snapshot.shelves.clear();
                });
                Ok(())
            }
            .boxed(),
        )
        .await
    }

    pub fn book(&self, id: &str) -> Option<Book> {
        self.snapshot().books.iter().find(|b| b.id == id).cloned()
    }

    pub fn books_on_shelf(&self, shelf_id: &str) -> Vec<Book> {
        self.snapshot()
            .books
            .iter()
            .filter(|b| b.shelf_id == shelf_id)
            .cloned()
            .collect()
    }

    /// Exact string match against every book's ISBN, no normalization
    pub fn has_isbn(&self, isbn: &str) -> bool {
        self.snapshot().books.iter().any(|b| b.isbn == isbn)
    }
}
